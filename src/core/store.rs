//! The state container: owns the current state, applies actions, notifies observers

use std::sync::Arc;

use crate::core::persistence::PersistenceBridge;
use crate::core::reducer::{reduce, Action};
use crate::core::state::AppState;

/// Handle returned by [`Store::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&AppState)>;

/// Single-owner store
///
/// Dispatch is synchronous: reduce, swap the state, then call every
/// listener in subscription order. A host that shares the store across
/// threads must serialize dispatches behind one mutex.
pub struct Store {
    state: Arc<AppState>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl Store {
    pub fn new(initial: AppState) -> Self {
        Self {
            state: Arc::new(initial),
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Bootstrap from the bridge's snapshot over `seed`, save once, then
    /// save after every dispatch
    pub fn with_persistence(seed: AppState, bridge: PersistenceBridge) -> Self {
        let initial = bridge.bootstrap(seed);
        bridge.persist(&initial);

        let mut store = Self::new(initial);
        store.subscribe(move |state| bridge.persist(state));
        store
    }

    /// Current state snapshot
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Apply `action` and notify listeners
    pub fn dispatch(&mut self, action: Action) -> Arc<AppState> {
        let kind = action.kind();
        let next = reduce(&self.state, action);
        tracing::debug!(action = kind, "dispatched");

        self.state = Arc::new(next);
        let state = &*self.state;
        for (_, listener) in self.listeners.iter_mut() {
            listener(state);
        }
        self.state()
    }

    /// Apply a serialized action
    ///
    /// Unknown action types and malformed payloads are ignored: the state
    /// is left untouched and no listener runs.
    pub fn dispatch_json(&mut self, raw: &str) -> Arc<AppState> {
        match Action::from_json(raw) {
            Ok(action) => self.dispatch(action),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring unrecognized action");
                self.state()
            }
        }
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&AppState) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener; false if it was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::RecordId;
    use crate::core::persistence::{KeyValueStore, MemoryStore, DEFAULT_STORAGE_KEY};
    use crate::core::seed;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_dispatch_notifies_in_order() {
        let mut store = Store::new(seed::initial_data());
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&log);
        store.subscribe(move |s| first.borrow_mut().push(("first", s.dark_mode)));
        let second = Rc::clone(&log);
        store.subscribe(move |s| second.borrow_mut().push(("second", s.dark_mode)));

        store.dispatch(Action::ToggleDarkMode);
        assert_eq!(*log.borrow(), vec![("first", true), ("second", true)]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut store = Store::new(AppState::default());
        let calls = Rc::new(RefCell::new(0));

        let counter = Rc::clone(&calls);
        let id = store.subscribe(move |_| *counter.borrow_mut() += 1);
        store.dispatch(Action::ToggleDarkMode);
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.dispatch(Action::ToggleDarkMode);

        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_dispatch_json_ignores_unknown_actions() {
        let mut store = Store::new(seed::initial_data());
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        store.subscribe(move |_| *counter.borrow_mut() += 1);

        let before = store.state();
        let after = store.dispatch_json(r#"{"type": "EXPLODE", "payload": 1}"#);
        assert!(Arc::ptr_eq(&before, &after));
        let after = store.dispatch_json("{");
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(*calls.borrow(), 0);

        let after = store.dispatch_json(r#"{"type": "DELETE_RISK", "payload": "1"}"#);
        assert_eq!(after.risks.len(), 2);
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_state_snapshots_are_immutable() {
        let mut store = Store::new(seed::initial_data());
        let before = store.state();
        store.dispatch(Action::DeleteDocument(RecordId::new("1")));
        assert_eq!(before.documents.len(), 4);
        assert_eq!(store.state().documents.len(), 3);
    }

    #[test]
    fn test_with_persistence_saves_on_start_and_dispatch() {
        let backend = MemoryStore::new();
        let bridge = PersistenceBridge::new(Box::new(backend.clone()), DEFAULT_STORAGE_KEY);

        let mut store = Store::with_persistence(seed::initial_data(), bridge);
        let saved = backend.load(DEFAULT_STORAGE_KEY).unwrap().unwrap();
        let snapshot: AppState = serde_json::from_str(&saved).unwrap();
        assert_eq!(snapshot, *store.state());

        store.dispatch(Action::ToggleDarkMode);
        let saved = backend.load(DEFAULT_STORAGE_KEY).unwrap().unwrap();
        let snapshot: AppState = serde_json::from_str(&saved).unwrap();
        assert!(snapshot.dark_mode);

        // A second store over the same backend resumes where the first stopped
        let bridge = PersistenceBridge::new(Box::new(backend), DEFAULT_STORAGE_KEY);
        let resumed = Store::with_persistence(seed::initial_data(), bridge);
        assert!(resumed.state().dark_mode);
    }
}
