//! A small session-like key/value bag carried by [`crate::Context`].
//!
//! The activity core only ever clones/refcounts the context handle (spec.md
//! §6's "its sole engine-visible operation is copy/refcount"); the bag is
//! ambient scaffolding for activities that want to stash request-scoped
//! state (a resolved user id, a feature flag) the way the outer HTTP layer's
//! session would, without reaching for the full session/cookie subsystem
//! that spec.md keeps out of scope.

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

#[derive(Default)]
pub struct Bag {
    entries: DashMap<String, Value>,
}

impl Bag {
    pub fn new() -> Self {
        Bag { entries: DashMap::new() }
    }

    pub fn set<T: Serialize>(&self, key: impl Into<String>, value: T) {
        if let Ok(json) = serde_json::to_value(value) {
            self.entries.insert(key.into(), json);
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.entries.get(key).and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.entries.remove(key).map(|(_, v)| v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_typed_values() {
        let bag = Bag::new();
        bag.set("user_id", 42u64);
        assert_eq!(bag.get::<u64>("user_id"), Some(42));
        assert!(bag.contains("user_id"));
        bag.remove("user_id");
        assert!(!bag.contains("user_id"));
    }

    #[test]
    fn missing_key_reads_as_none() {
        let bag = Bag::new();
        assert_eq!(bag.get::<u64>("missing"), None);
    }
}
