/*!
Observability infrastructure for the writeback system.

Hydration and write-through events are emitted as `tracing` events at debug
level. This module only wires up a reasonable default subscriber; embedders
that already install their own subscriber should skip it.
*/

use tracing::subscriber::set_global_default;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::{Result, WritebackError};

/// Initialize the global tracing subscriber
///
/// Builds a console subscriber filtered by `RUST_LOG` (falling back to
/// `writeback=info`) and installs it as the global default.
///
/// # Errors
/// Fails if a global subscriber is already installed.
pub fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("writeback_core=info"));

    let subscriber = Registry::default()
        .with(filter)
        .with(tracing_subscriber::fmt::layer());

    set_global_default(subscriber).map_err(|e| {
        WritebackError::storage(format!("Failed to set global tracing subscriber: {e}"))
    })?;

    tracing::debug!("writeback tracing initialized");
    Ok(())
}
