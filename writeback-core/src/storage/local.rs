/*!
Local filesystem storage adapter.

Maps each storage key to one file under an optional base directory. Useful for
desktop-style deployments where persisted store state should survive the
process, and for the CLI, which inspects namespace blobs on disk.
*/

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{Result, WritebackError};

use super::StorageAdapter;

/// Local filesystem storage adapter
///
/// Each key is stored as a UTF-8 file. Parent directories are created on
/// demand when writing.
///
/// # Example
/// ```rust,no_run
/// use writeback_core::storage::{LocalFileStorage, StorageAdapter};
///
/// let storage = LocalFileStorage::with_base_dir("/var/lib/writeback");
/// storage.set("writeback", r#"{"counter":{"count":1}}"#)?;
/// # Ok::<(), writeback_core::WritebackError>(())
/// ```
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    /// Optional base directory for all persisted keys
    base_dir: Option<PathBuf>,
}

impl LocalFileStorage {
    /// Create a new adapter without a base directory
    ///
    /// Keys are used as paths verbatim.
    pub fn new() -> Self {
        Self { base_dir: None }
    }

    /// Create a new adapter rooted at `base_dir`
    ///
    /// All keys resolve to files under the base directory.
    pub fn with_base_dir<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: Some(base_dir.as_ref().to_path_buf()),
        }
    }

    /// Resolve the file path backing a storage key
    fn resolve_path(&self, key: &str) -> PathBuf {
        match &self.base_dir {
            Some(base) => base.join(key),
            None => PathBuf::from(key),
        }
    }

    fn ensure_parent_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    WritebackError::storage(format!(
                        "Failed to create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }
        Ok(())
    }
}

impl Default for LocalFileStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageAdapter for LocalFileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.resolve_path(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(WritebackError::storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.resolve_path(key);
        self.ensure_parent_dir(&path)?;
        fs::write(&path, value).map_err(|e| {
            WritebackError::storage(format!("Failed to write {}: {}", path.display(), e))
        })
    }
}
