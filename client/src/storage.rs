use shared::AnalysisRecord;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub const HISTORY_KEY: &str = "emotionAnalyses";
pub const USER_ID_KEY: &str = "userId";
pub const TOKEN_KEY: &str = "token";
pub const ROLE_KEY: &str = "userRole";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StorageError {
    #[error("Storage write failed: {0}")]
    Write(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// String key/value persistence, the shape of the browser's local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str);
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

/// In-memory store; clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

/// Bounded fallback copy of the analysis history.
#[derive(Debug, Clone)]
pub struct LocalHistoryCache<S> {
    store: S,
    key: String,
    capacity: usize,
}

impl<S: KeyValueStore> LocalHistoryCache<S> {
    pub fn new(store: S, key: impl Into<String>, capacity: usize) -> Self {
        Self {
            store,
            key: key.into(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// `None` when nothing usable is stored.
    pub fn load(&self) -> Option<Vec<AnalysisRecord>> {
        let raw = self.store.get(&self.key)?;
        match serde_json::from_str::<Vec<AnalysisRecord>>(&raw) {
            Ok(mut records) => {
                records.truncate(self.capacity);
                Some(records)
            }
            Err(e) => {
                log::warn!("Ignoring unreadable history cache '{}': {}", self.key, e);
                None
            }
        }
    }

    pub fn store(&self, records: &[AnalysisRecord]) -> Result<(), StorageError> {
        let bounded = &records[..records.len().min(self.capacity)];
        let json = serde_json::to_string(bounded)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.set(&self.key, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(id: &str) -> AnalysisRecord {
        AnalysisRecord {
            id: id.into(),
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
            image_url: None,
            text: String::new(),
            emotions: [("joy", 0.7)].into_iter().collect(),
            dominant_emotion: "joy".into(),
            mode: Default::default(),
        }
    }

    #[test]
    fn missing_key_loads_none() {
        let cache = LocalHistoryCache::new(MemoryStore::new(), HISTORY_KEY, 10);
        assert_eq!(cache.load(), None);
    }

    #[test]
    fn stores_at_most_capacity() {
        let store = MemoryStore::new();
        let cache = LocalHistoryCache::new(store.clone(), HISTORY_KEY, 2);
        cache
            .store(&[record("3"), record("2"), record("1")])
            .unwrap();

        let ids: Vec<String> = cache.load().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["3", "2"]);
        assert!(store.get(HISTORY_KEY).unwrap().starts_with('['));
    }

    #[test]
    fn corrupt_cache_is_ignored() {
        let store = MemoryStore::new();
        store.set(HISTORY_KEY, "{not json").unwrap();
        let cache = LocalHistoryCache::new(store, HISTORY_KEY, 10);
        assert_eq!(cache.load(), None);
    }
}
