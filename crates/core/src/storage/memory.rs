//! In-process storage backend.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::DurableStore;
use crate::Error;

/// HashMap-backed store.
///
/// Clones share the same underlying map, so a test can keep one handle
/// while the cache owns another. `set_failing(true)` makes every call
/// fail, simulating an unavailable backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<RwLock<HashMap<String, String>>>,
    failing: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw value, bypassing the cache (e.g. a corrupt snapshot).
    pub async fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values.write().await.insert(key.into(), value.into());
    }

    pub async fn raw(&self, key: &str) -> Option<String> {
        self.values.read().await.get(key).cloned()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), Error> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Storage("memory store unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn get(&self, keys: &[String]) -> Result<HashMap<String, String>, Error> {
        self.check_available()?;
        let values = self.values.read().await;
        Ok(keys
            .iter()
            .filter_map(|k| values.get(k).map(|v| (k.clone(), v.clone())))
            .collect())
    }

    async fn set(&self, entries: HashMap<String, String>) -> Result<(), Error> {
        self.check_available()?;
        self.values.write().await.extend(entries);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryStore::new();
        store
            .set(HashMap::from([("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())]))
            .await
            .unwrap();

        let values = store.get(&["a".to_string(), "missing".to_string()]).await.unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values["a"], "1");
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.insert_raw("k", "v").await;
        assert_eq!(other.raw("k").await.as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_failing_store() {
        let store = MemoryStore::new();
        store.set_failing(true);
        assert!(store.get(&["k".to_string()]).await.is_err());
        assert!(store.set(HashMap::new()).await.is_err());

        store.set_failing(false);
        assert!(store.get(&["k".to_string()]).await.is_ok());
    }
}
