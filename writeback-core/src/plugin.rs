/*!
Plugin facade: hydration and write-through wiring.

[`PersistPlugin::attach`] is the store-attachment hook. For each store it
resolves the effective persistence policy, hydrates the store from whatever
was persisted under its key, and then installs the write-through listener.
Hydration runs strictly before the subscription is installed, so applying a
persisted snapshot never triggers a self-write.
*/

use std::rc::Rc;

use serde_json::Value;
use tracing::debug;

use crate::config::{ConfigResolver, EffectiveOptions, GlobalConfig, Layout, PersistMode};
use crate::store::Store;
use crate::{namespace, project, Result, WritebackError};

/// Write-through persistence plugin
///
/// One plugin instance is shared by every store in a process. It owns the
/// configuration defaults and the persisted-data layout.
///
/// # Example
/// ```rust
/// use serde_json::json;
/// use writeback_core::{PersistMode, PersistPlugin};
/// use writeback_core::store::{State, Store};
///
/// let mut plugin = PersistPlugin::new();
///
/// let mut initial = State::new();
/// initial.insert("count".to_string(), json!(0));
/// let store = Store::new("counter", initial);
///
/// plugin.attach(&store, &PersistMode::Enabled, None)?;
/// store.set("count", json!(2))?; // written through to storage
/// # Ok::<(), writeback_core::WritebackError>(())
/// ```
pub struct PersistPlugin {
    resolver: ConfigResolver,
    layout: Layout,
}

impl PersistPlugin {
    /// Create a plugin using the shared-namespace layout and built-in defaults
    pub fn new() -> Self {
        Self::with_layout(Layout::SharedNamespace)
    }

    /// Create a plugin with an explicit persisted-data layout
    pub fn with_layout(layout: Layout) -> Self {
        Self {
            resolver: ConfigResolver::new(),
            layout,
        }
    }

    /// The namespace key stores currently resolve against
    pub fn namespace(&self) -> &str {
        self.resolver.namespace()
    }

    /// Overwrite the configuration defaults up front
    ///
    /// Equivalent to passing the same [`GlobalConfig`] with the next
    /// attachment, but without needing a store in hand.
    pub fn configure(&mut self, global: GlobalConfig) {
        self.resolver.apply_global(global);
    }

    /// Attach one store to the persistence pipeline
    ///
    /// Resolves the store's declared option against the current defaults
    /// (after applying `global`, if provided), hydrates the store from its
    /// persisted snapshot, and installs the write-through subscription. A
    /// store declared `Disabled` is left alone entirely.
    ///
    /// # Errors
    /// Hydration failures (malformed persisted JSON, backend errors)
    /// propagate to the caller; the store is then left unhydrated and no
    /// subscription is installed.
    pub fn attach(
        &mut self,
        store: &Rc<Store>,
        declared: &PersistMode,
        global: Option<GlobalConfig>,
    ) -> Result<()> {
        let Some(options) = self.resolver.resolve(store.id(), declared, global) else {
            debug!(store_id = store.id(), "persistence disabled, skipping");
            return Ok(());
        };

        // Captured once here; later global-config overwrites affect only
        // stores attached after them.
        let namespace = self.resolver.namespace().to_string();

        hydrate(store, &options, &self.layout, &namespace)?;
        install_write_through(store, options, self.layout.clone(), namespace);
        Ok(())
    }
}

impl Default for PersistPlugin {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply a store's persisted snapshot, if one exists
///
/// Looks the store's key up in the namespace blob (or reads its standalone
/// key) and applies the found snapshot as a partial patch: snapshot keys
/// overwrite live state, everything else keeps its initial value. Absent,
/// null, or empty snapshots leave the store untouched.
fn hydrate(
    store: &Store,
    options: &EffectiveOptions,
    layout: &Layout,
    namespace: &str,
) -> Result<()> {
    let persisted = match layout {
        Layout::SharedNamespace => {
            let mut blob = namespace::read(options.storage.as_ref(), namespace)?;
            blob.remove(&options.key)
        }
        Layout::StandaloneKeys => namespace::read_standalone(options.storage.as_ref(), &options.key)?,
    };

    match persisted {
        None | Some(Value::Null) => {
            debug!(store_id = store.id(), key = %options.key, "no persisted snapshot");
            Ok(())
        }
        Some(Value::Object(snapshot)) => {
            if snapshot.is_empty() {
                return Ok(());
            }
            debug!(
                store_id = store.id(),
                key = %options.key,
                fields = snapshot.len(),
                "hydrating from persisted snapshot"
            );
            store.patch(snapshot)
        }
        Some(other) => Err(WritebackError::invalid_format(format!(
            "snapshot for '{}' is not a JSON object: {other}",
            options.key
        ))),
    }
}

/// Install the write-through subscription
///
/// On every committed mutation the current state is re-projected and written
/// back: one notification, one storage write. No debouncing and no diffing;
/// identical consecutive payloads are written again.
fn install_write_through(
    store: &Rc<Store>,
    options: EffectiveOptions,
    layout: Layout,
    namespace: String,
) {
    store.subscribe(move |store| {
        let snapshot = project::project(&store.state(), &options.paths);
        match layout {
            Layout::SharedNamespace => namespace::merge_and_write(
                options.storage.as_ref(),
                &namespace,
                &options.key,
                snapshot,
            ),
            Layout::StandaloneKeys => {
                namespace::write_standalone(options.storage.as_ref(), &options.key, &snapshot)
            }
        }
    });
}
