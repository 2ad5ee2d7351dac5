/*!
# writeback core engine

Write-through persistence for reactive, mutation-observable stores.

A store declares whether (and how) it should be persisted; this crate hydrates
its in-memory state from a synchronous key-value storage backend at attachment
time and writes the current, optionally path-filtered state back on every
committed mutation.

## Architecture

- Storage is a port: any synchronous string key-value backend implementing
  [`storage::StorageAdapter`] works. An in-memory backend and a local
  filesystem backend ship with the crate.
- By default every persisted store shares one namespace blob — a single JSON
  object under one storage key, mapping store keys to per-store snapshots.
  Writes are read-modify-write so sibling stores are never clobbered. A
  standalone-key layout stores each snapshot under its own key instead.
- Configuration merges three layers: the plugin's defaults, an optional global
  configuration supplied at attachment time, and each store's own declared
  option.

## Usage

```rust
use serde_json::json;
use writeback_core::store::{State, Store};
use writeback_core::{PersistMode, PersistOptions, PersistPlugin};

let mut plugin = PersistPlugin::new();

let mut initial = State::new();
initial.insert("count".to_string(), json!(0));
initial.insert("name".to_string(), json!("张三"));
let store = Store::new("counter", initial);

// Persist only `count`, under the store's own id.
let declared = PersistMode::Custom(PersistOptions {
    paths: Some(vec!["count".to_string()]),
    ..PersistOptions::default()
});
plugin.attach(&store, &declared, None)?;

store.set("count", json!(1))?; // snapshot written through immediately
# Ok::<(), writeback_core::WritebackError>(())
```

## Concurrency

Everything is synchronous and single-threaded by design: resolution,
hydration, projection, and writes run to completion in the caller's thread.
Two independent execution contexts sharing one physical backend are not
coordinated; the shared-blob read-modify-write can lose a racing sibling
update. That is an accepted, documented limitation.
*/

pub mod config;
pub mod error;
pub mod namespace;
pub mod observability;
pub mod plugin;
pub mod project;
pub mod storage;
pub mod store;

pub use config::{
    ConfigResolver, EffectiveOptions, GlobalConfig, Layout, PersistMode, PersistOptions,
    DEFAULT_NAMESPACE,
};
pub use error::{Result, WritebackError};
pub use plugin::PersistPlugin;
pub use project::project;
pub use storage::{default_storage, LocalFileStorage, MemoryStorage, StorageAdapter, StorageHandle};
pub use store::{State, Store};
