/*!
Minimal mutation-observable store.

The persistence pipeline only needs four things from a store: a unique id,
read access to current state, a partial-state patch operation, and a way to be
told after each committed mutation. This module provides exactly that, with
the mutation subscription modeled as an explicit listener list.

Stores are single-threaded values (`Rc`/`RefCell`); all mutation and
notification happens synchronously in one thread of control.
*/

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::Result;

/// Store state: a JSON object with insertion order preserved
pub type State = serde_json::Map<String, Value>;

type Listener = Rc<dyn Fn(&Store) -> Result<()>>;

/// A mutation-observable store
///
/// # Example
/// ```rust
/// use serde_json::json;
/// use writeback_core::store::{State, Store};
///
/// let mut initial = State::new();
/// initial.insert("count".to_string(), json!(0));
/// let store = Store::new("counter", initial);
///
/// store.set("count", json!(1))?;
/// assert_eq!(store.get("count"), Some(json!(1)));
/// # Ok::<(), writeback_core::WritebackError>(())
/// ```
pub struct Store {
    id: String,
    state: RefCell<State>,
    listeners: RefCell<Vec<Listener>>,
}

impl Store {
    /// Create a new store with the given unique id and initial state
    pub fn new(id: impl Into<String>, initial: State) -> Rc<Self> {
        Rc::new(Self {
            id: id.into(),
            state: RefCell::new(initial),
            listeners: RefCell::new(Vec::new()),
        })
    }

    /// The store's unique id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Snapshot of the current state
    pub fn state(&self) -> State {
        self.state.borrow().clone()
    }

    /// Read a single state property
    pub fn get(&self, field: &str) -> Option<Value> {
        self.state.borrow().get(field).cloned()
    }

    /// Apply a partial-state patch and commit it
    ///
    /// Every key in `partial` overwrites the corresponding live state key;
    /// keys not present in `partial` are left untouched. Listeners are then
    /// notified once, in registration order. The first listener error aborts
    /// notification and propagates to the caller of the mutation.
    pub fn patch(&self, partial: State) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            for (key, value) in partial {
                state.insert(key, value);
            }
        }
        self.commit()
    }

    /// Set a single state property and commit it
    pub fn set(&self, field: &str, value: Value) -> Result<()> {
        let mut partial = State::new();
        partial.insert(field.to_string(), value);
        self.patch(partial)
    }

    /// Register a listener invoked after each committed mutation
    ///
    /// The subscription lives for the lifetime of the store; there is no
    /// unsubscribe.
    pub fn subscribe(&self, listener: impl Fn(&Store) -> Result<()> + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    fn commit(&self) -> Result<()> {
        // Snapshot the listener list so a listener may subscribe re-entrantly
        // without hitting the RefCell.
        let listeners: Vec<Listener> = self.listeners.borrow().clone();
        for listener in listeners {
            listener(self)?;
        }
        Ok(())
    }
}
