/*!
writeback CLI - inspect and edit persisted namespace blobs.

Operates on a file-backed storage directory: each storage key is one file,
and the namespace blob is the JSON object stored under the namespace key.
*/

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tabled::{Table, Tabled};
use tracing::info;
use writeback_core::{namespace, LocalFileStorage, StorageAdapter, DEFAULT_NAMESPACE};

#[derive(Parser)]
#[command(name = "writeback")]
#[command(about = "CLI for writeback persisted store state")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Storage directory holding the persisted keys
    #[arg(short, long, global = true, env = "WRITEBACK_DIR")]
    dir: Option<PathBuf>,

    /// Namespace key the shared blob is stored under
    #[arg(short, long, global = true, default_value = DEFAULT_NAMESPACE)]
    name: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all store keys in the namespace blob
    List,
    /// Show one store's persisted snapshot
    Show {
        /// Store key inside the namespace blob
        store_key: String,
    },
    /// Remove one store's entry, preserving its siblings
    Delete {
        /// Store key inside the namespace blob
        store_key: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Tabled)]
struct StoreRow {
    #[tabled(rename = "Store Key")]
    key: String,
    #[tabled(rename = "Fields")]
    fields: usize,
    #[tabled(rename = "Bytes")]
    bytes: usize,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let dir = cli
        .dir
        .context("missing storage directory: pass --dir or set WRITEBACK_DIR")?;
    let storage = LocalFileStorage::with_base_dir(&dir);

    match cli.command {
        Commands::List => list_stores(&storage, &cli.name)?,
        Commands::Show { store_key } => show_store(&storage, &cli.name, &store_key)?,
        Commands::Delete { store_key, force } => {
            delete_store(&storage, &cli.name, &store_key, force)?
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn list_stores(storage: &LocalFileStorage, name: &str) -> anyhow::Result<()> {
    let blob = namespace::read(storage, name)
        .with_context(|| format!("failed to read namespace '{name}'"))?;

    if blob.is_empty() {
        println!("No persisted stores under namespace '{name}'.");
        return Ok(());
    }

    let rows: Vec<StoreRow> = blob
        .iter()
        .map(|(key, snapshot)| StoreRow {
            key: key.clone(),
            fields: match snapshot {
                Value::Object(map) => map.len(),
                _ => 0,
            },
            bytes: snapshot.to_string().len(),
        })
        .collect();

    println!("{}", Table::new(rows));
    Ok(())
}

fn show_store(storage: &LocalFileStorage, name: &str, store_key: &str) -> anyhow::Result<()> {
    let blob = namespace::read(storage, name)
        .with_context(|| format!("failed to read namespace '{name}'"))?;

    match blob.get(store_key) {
        Some(snapshot) => {
            println!("{}", serde_json::to_string_pretty(snapshot)?);
            Ok(())
        }
        None => bail!("no persisted snapshot for store key '{store_key}' in namespace '{name}'"),
    }
}

fn delete_store(
    storage: &LocalFileStorage,
    name: &str,
    store_key: &str,
    force: bool,
) -> anyhow::Result<()> {
    let mut blob = namespace::read(storage, name)
        .with_context(|| format!("failed to read namespace '{name}'"))?;

    if blob.remove(store_key).is_none() {
        bail!("no persisted snapshot for store key '{store_key}' in namespace '{name}'");
    }

    if !force {
        print!("Delete snapshot for '{store_key}'? [y/N]: ");
        use std::io::{self, BufRead, Write};
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        if !matches!(line.trim(), "y" | "Y" | "yes") {
            println!("Aborted.");
            return Ok(());
        }
    }

    // Same read-modify-write as the write-through path: siblings survive.
    let raw = serde_json::to_string(&blob)?;
    storage.set(name, &raw)?;

    info!(store_key, namespace = name, "snapshot deleted");
    println!("Deleted '{store_key}' from namespace '{name}'.");
    Ok(())
}
