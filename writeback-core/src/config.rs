/*!
Configuration model and resolution.

Three layers decide how a store is persisted: the resolver's current defaults
(namespace name and default backend), an optional per-attachment global
configuration that overwrites those defaults, and the store's own declared
persistence option. [`ConfigResolver::resolve`] merges them into one effective
`{key, storage, paths}` policy.

The defaults are explicit resolver state rather than module-scoped statics, so
independent resolvers (tests, tenants) cannot leak configuration into each
other.
*/

use crate::storage::{default_storage, StorageHandle};

/// Namespace key used when no global configuration overrides it
pub const DEFAULT_NAMESPACE: &str = "writeback";

/// A store's declared persistence option
///
/// Explicit tagged union of the boolean-or-object option: no persistence,
/// persistence with defaults, or persistence with custom overrides.
#[derive(Clone, Default)]
pub enum PersistMode {
    /// Do not persist this store (hydration and write-through both skipped)
    #[default]
    Disabled,
    /// Persist with defaults: key = store id, default backend, full state
    Enabled,
    /// Persist with per-store overrides
    Custom(PersistOptions),
}

/// Per-store overrides for the persistence policy
///
/// Absent fields fall back to the resolved defaults.
#[derive(Clone, Default)]
pub struct PersistOptions {
    /// Store key inside the namespace blob (default: the store id)
    pub key: Option<String>,
    /// Backend for this store only (default: the resolver's default backend)
    pub storage: Option<StorageHandle>,
    /// Properties to persist, in order (default: everything)
    pub paths: Option<Vec<String>>,
}

/// Global configuration supplied at plugin-attachment time
///
/// Present fields overwrite the resolver's defaults for every store resolved
/// afterward. The overwrite is forward-only: stores attached earlier captured
/// their effective options already and are not re-resolved.
#[derive(Clone, Default)]
pub struct GlobalConfig {
    /// Overrides the shared namespace key
    pub name: Option<String>,
    /// Overrides the default storage backend
    pub storage: Option<StorageHandle>,
}

/// The final merged persistence policy for one store
#[derive(Clone)]
pub struct EffectiveOptions {
    /// Store key inside the namespace blob (or the storage key itself in the
    /// standalone layout)
    pub key: String,
    /// Backend this store reads from and writes to
    pub storage: StorageHandle,
    /// Properties to persist; empty means the full state
    pub paths: Vec<String>,
}

/// Persisted-data layout
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Layout {
    /// All stores share one JSON blob under the namespace key
    #[default]
    SharedNamespace,
    /// Each store's snapshot lives directly under its own storage key
    StandaloneKeys,
}

/// Merges declared options, global configuration, and defaults into one
/// effective policy per store
pub struct ConfigResolver {
    namespace: String,
    default_storage: StorageHandle,
}

impl ConfigResolver {
    /// Create a resolver with the built-in defaults
    pub fn new() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            default_storage: default_storage(),
        }
    }

    /// The namespace key stores currently resolve against
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The backend stores currently default to
    pub fn default_storage(&self) -> StorageHandle {
        self.default_storage.clone()
    }

    /// Overwrite the defaults with the present fields of `global`
    pub fn apply_global(&mut self, global: GlobalConfig) {
        if let Some(name) = global.name {
            self.namespace = name;
        }
        if let Some(storage) = global.storage {
            self.default_storage = storage;
        }
    }

    /// Resolve one store's effective persistence policy
    ///
    /// Returns `None` when the store declared no persistence. Otherwise the
    /// global configuration (if any) first overwrites the resolver's
    /// defaults, then the declared option is merged over
    /// `{key: store_id, storage: default backend, paths: []}`.
    pub fn resolve(
        &mut self,
        store_id: &str,
        declared: &PersistMode,
        global: Option<GlobalConfig>,
    ) -> Option<EffectiveOptions> {
        if matches!(declared, PersistMode::Disabled) {
            return None;
        }

        if let Some(global) = global {
            self.apply_global(global);
        }

        let defaults = EffectiveOptions {
            key: store_id.to_string(),
            storage: self.default_storage.clone(),
            paths: Vec::new(),
        };

        match declared {
            PersistMode::Disabled => None,
            PersistMode::Enabled => Some(defaults),
            PersistMode::Custom(options) => Some(EffectiveOptions {
                key: options.key.clone().unwrap_or(defaults.key),
                storage: options.storage.clone().unwrap_or(defaults.storage),
                paths: options.paths.clone().unwrap_or(defaults.paths),
            }),
        }
    }
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}
