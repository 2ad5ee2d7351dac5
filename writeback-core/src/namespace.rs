/*!
Namespace blob codec.

In the shared-namespace layout every persisted store lives inside one JSON
object stored under a single well-known key: top-level keys are store keys,
values are per-store state snapshots. Writing one store's snapshot is a
read-modify-write of that blob so sibling stores are preserved.

The read-modify-write is not transactional. Two independent execution contexts
sharing one physical backend can interleave, and the second writer wins,
silently dropping the first writer's update. That is an accepted limitation;
the codec adds no cross-context locking.

The standalone-key layout skips the blob entirely: each store's snapshot is
stored as its own JSON string directly under the store's key.
*/

use serde_json::Value;
use tracing::debug;

use crate::storage::StorageAdapter;
use crate::store::State;
use crate::{Result, WritebackError};

/// Read the namespace blob stored under `name`
///
/// An absent key yields an empty mapping. A present value that fails to parse
/// as JSON is a hard failure propagated to the caller; so is a value that
/// parses to something other than a JSON object.
pub fn read(storage: &dyn StorageAdapter, name: &str) -> Result<State> {
    match storage.get(name)? {
        None => Ok(State::new()),
        Some(raw) => match serde_json::from_str::<Value>(&raw)? {
            Value::Object(blob) => Ok(blob),
            other => Err(WritebackError::invalid_format(format!(
                "namespace key '{name}' holds {} instead of a JSON object",
                type_name(&other)
            ))),
        },
    }
}

/// Merge one store's snapshot into the namespace blob and write it back
///
/// The store's previous snapshot is replaced wholesale (assignment, not a
/// deep merge); every other store-key already present in the blob is carried
/// over unchanged.
pub fn merge_and_write(
    storage: &dyn StorageAdapter,
    name: &str,
    store_key: &str,
    snapshot: State,
) -> Result<()> {
    let mut blob = read(storage, name)?;
    blob.insert(store_key.to_string(), Value::Object(snapshot));
    let raw = serde_json::to_string(&blob)?;
    debug!(namespace = name, store_key, bytes = raw.len(), "write-through");
    storage.set(name, &raw)
}

/// Read a standalone snapshot stored directly under `key`
///
/// Returns `Ok(None)` when the key is absent; parse failures propagate.
pub fn read_standalone(storage: &dyn StorageAdapter, key: &str) -> Result<Option<Value>> {
    match storage.get(key)? {
        None => Ok(None),
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
    }
}

/// Write a standalone snapshot directly under `key`
pub fn write_standalone(storage: &dyn StorageAdapter, key: &str, snapshot: &State) -> Result<()> {
    let raw = serde_json::to_string(snapshot)?;
    debug!(store_key = key, bytes = raw.len(), "standalone write-through");
    storage.set(key, &raw)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
