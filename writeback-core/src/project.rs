/*!
Path projection of store state.

Builds the snapshot that gets persisted for a store: either the full state or
a filtered object containing only the declared `paths`, in declaration order.
*/

use crate::store::State;

/// Project `state` down to the properties named in `paths`
///
/// An empty `paths` means "persist everything" and returns a shallow clone of
/// the full state. Otherwise the result contains the named properties in
/// `paths` order; names absent from the live state are omitted rather than
/// raising an error.
pub fn project(state: &State, paths: &[String]) -> State {
    if paths.is_empty() {
        return state.clone();
    }

    let mut snapshot = State::new();
    for name in paths {
        if let Some(value) = state.get(name) {
            snapshot.insert(name.clone(), value.clone());
        }
    }
    snapshot
}
