//! In-memory test doubles.
//!
//! [`MemoryStore`] backs the persistence gateway and [`MockSharedState`]
//! stands in for the host's shared-state registry. Both are `Send + Sync`
//! so they can be shared with a service task behind an `Arc`.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::persistence::KeyValueStore;
use crate::shared_state::{RequestContext, SharedStatePort, SharedStateResult};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

type Slot = (String, String);

/// In-memory key/value store for testing.
#[derive(Default)]
pub struct MemoryStore {
    /// Stored values ((collection, key) -> value)
    values: Mutex<BTreeMap<Slot, String>>,
    /// Successful writes per slot
    writes: Mutex<BTreeMap<Slot, usize>>,
    /// When set, every operation fails with `StoreError::Unavailable`
    unavailable: Mutex<bool>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `set_string` calls for a slot.
    pub fn write_count(&self, collection: &str, key: &str) -> usize {
        lock(&self.writes)
            .get(&(collection.to_owned(), key.to_owned()))
            .copied()
            .unwrap_or(0)
    }

    /// Make every subsequent operation fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        *lock(&self.unavailable) = unavailable;
    }

    fn check_available(&self, collection: &str) -> Result<(), StoreError> {
        if *lock(&self.unavailable) {
            Err(StoreError::Unavailable(collection.to_owned()))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get_string(&self, collection: &str, key: &str) -> Result<Option<String>, StoreError> {
        self.check_available(collection)?;
        Ok(lock(&self.values)
            .get(&(collection.to_owned(), key.to_owned()))
            .cloned())
    }

    fn set_string(&self, collection: &str, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_available(collection)?;
        let slot = (collection.to_owned(), key.to_owned());
        lock(&self.values).insert(slot.clone(), value.to_owned());
        *lock(&self.writes).entry(slot).or_insert(0) += 1;
        Ok(())
    }

    fn remove(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        self.check_available(collection)?;
        lock(&self.values).remove(&(collection.to_owned(), key.to_owned()));
        Ok(())
    }
}

/// Scripted shared-state registry that records publications.
#[derive(Default)]
pub struct MockSharedState {
    /// Scripted states (owner -> result); unknown owners read as `None`
    states: Mutex<BTreeMap<String, SharedStateResult>>,
    /// Every published identity state, oldest first
    published: Mutex<Vec<Map<String, Value>>>,
}

impl MockSharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the result returned for `owner`.
    pub fn set_state(&self, owner: &str, result: SharedStateResult) {
        lock(&self.states).insert(owner.to_owned(), result);
    }

    /// Script a `Set` state for `owner` from a JSON object.
    ///
    /// Non-object values are scripted as an empty object.
    pub fn set_json(&self, owner: &str, value: Value) {
        let object = match value {
            Value::Object(object) => object,
            _ => Map::new(),
        };
        self.set_state(owner, SharedStateResult::set(object));
    }

    pub fn published(&self) -> Vec<Map<String, Value>> {
        lock(&self.published).clone()
    }

    pub fn publish_count(&self) -> usize {
        lock(&self.published).len()
    }

    pub fn last_published(&self) -> Option<Map<String, Value>> {
        lock(&self.published).last().cloned()
    }
}

impl SharedStatePort for MockSharedState {
    fn get_state(&self, owner: &str, _ctx: &RequestContext) -> SharedStateResult {
        lock(&self.states)
            .get(owner)
            .cloned()
            .unwrap_or_else(SharedStateResult::none)
    }

    fn publish_xdm_state(&self, state: Map<String, Value>, _ctx: &RequestContext) {
        lock(&self.published).push(state);
    }
}
