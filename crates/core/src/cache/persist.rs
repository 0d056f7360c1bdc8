//! Snapshot encoding and expiry-aware restore.
//!
//! A snapshot is two JSON documents: an object of `key -> entry` holding
//! only unexpired entries, and the metrics counters. On restore, expired
//! entries are dropped, malformed entries are skipped one by one, and a
//! blob that is not a JSON object at all yields an empty cache.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::entry::CacheEntry;
use super::metrics::CacheMetrics;
use crate::Error;
use crate::storage::DurableStore;

/// Result of decoding a persisted snapshot.
#[derive(Debug, Default)]
pub struct Restored {
    pub entries: HashMap<String, CacheEntry>,
    pub metrics: CacheMetrics,
    /// Entries already expired at load time.
    pub expired: usize,
    /// Entries that failed to decode.
    pub corrupt: usize,
}

/// Serialize unexpired entries and the metrics.
pub fn encode(
    entries: &HashMap<String, CacheEntry>, metrics: &CacheMetrics, now_ms: i64,
) -> Result<(String, String), Error> {
    let live: BTreeMap<&String, &CacheEntry> = entries.iter().filter(|(_, e)| !e.is_expired(now_ms)).collect();
    Ok((serde_json::to_string(&live)?, serde_json::to_string(metrics)?))
}

/// Decode the entry map, dropping anything expired or malformed.
pub fn decode_entries(raw: Option<&str>, now_ms: i64, restored: &mut Restored) {
    let Some(raw) = raw else {
        return;
    };

    let map: serde_json::Map<String, serde_json::Value> = match serde_json::from_str(raw) {
        Ok(map) => map,
        Err(e) => {
            tracing::warn!(error = %e, "persisted entry snapshot is corrupt, starting empty");
            return;
        }
    };

    for (key, value) in map {
        match serde_json::from_value::<CacheEntry>(value) {
            Ok(entry) if entry.is_expired(now_ms) => restored.expired += 1,
            Ok(mut entry) => {
                entry.resize();
                restored.entries.insert(key, entry);
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "skipping malformed persisted entry");
                restored.corrupt += 1;
            }
        }
    }
}

/// Decode persisted metrics; corrupt metrics restore as zero.
pub fn decode_metrics(raw: Option<&str>) -> CacheMetrics {
    let Some(raw) = raw else {
        return CacheMetrics::default();
    };

    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "persisted metrics are corrupt, starting from zero");
        CacheMetrics::default()
    })
}

/// Reads and writes the two snapshot keys of one namespace.
#[derive(Clone)]
pub struct Persistence {
    store: Arc<dyn DurableStore>,
    entries_key: String,
    metrics_key: String,
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence")
            .field("entries_key", &self.entries_key)
            .field("metrics_key", &self.metrics_key)
            .finish_non_exhaustive()
    }
}

impl Persistence {
    pub fn new(store: Arc<dyn DurableStore>, entries_key: String, metrics_key: String) -> Self {
        Self { store, entries_key, metrics_key }
    }

    /// Load and decode the snapshot. Only backend failures are errors.
    pub async fn load(&self, now_ms: i64) -> Result<Restored, Error> {
        let values = self
            .store
            .get(&[self.entries_key.clone(), self.metrics_key.clone()])
            .await?;

        let mut restored = Restored::default();
        decode_entries(values.get(&self.entries_key).map(String::as_str), now_ms, &mut restored);
        restored.metrics = decode_metrics(values.get(&self.metrics_key).map(String::as_str));
        Ok(restored)
    }

    pub async fn save(&self, entries_json: String, metrics_json: String) -> Result<(), Error> {
        let values = HashMap::from([(self.entries_key.clone(), entries_json), (self.metrics_key.clone(), metrics_json)]);
        self.store.set(values).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::classify::ContentCategory;
    use crate::storage::MemoryStore;
    use crate::PageContent;

    fn entry(created: i64, ttl: i64) -> CacheEntry {
        CacheEntry::new(
            "https://a.com/p",
            PageContent::new("T", "x".repeat(150)),
            "h".into(),
            ContentCategory::General,
            created,
            ttl,
        )
    }

    fn persistence(store: &MemoryStore) -> Persistence {
        Persistence::new(Arc::new(store.clone()), "ns:entries".into(), "ns:metrics".into())
    }

    #[test]
    fn test_encode_skips_expired() {
        let entries = HashMap::from([("live".to_string(), entry(0, 1_000)), ("dead".to_string(), entry(0, 10))]);
        let (json, _) = encode(&entries, &CacheMetrics::default(), 500).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("live").is_some());
        assert!(value.get("dead").is_none());
    }

    #[test]
    fn test_decode_drops_expired_at_boundary() {
        let entries = HashMap::from([("a".to_string(), entry(0, 100)), ("b".to_string(), entry(0, 1_000))]);
        let (json, _) = encode(&entries, &CacheMetrics::default(), 0).unwrap();

        let mut restored = Restored::default();
        decode_entries(Some(&json), 100, &mut restored);
        assert_eq!(restored.expired, 1);
        assert!(restored.entries.contains_key("b"));
        assert!(!restored.entries.contains_key("a"));
    }

    #[test]
    fn test_decode_recovers_per_entry() {
        let good = serde_json::to_value(entry(0, 1_000)).unwrap();
        let raw = serde_json::json!({ "good": good, "bad": { "content": 5 } }).to_string();

        let mut restored = Restored::default();
        decode_entries(Some(&raw), 10, &mut restored);
        assert_eq!(restored.entries.len(), 1);
        assert_eq!(restored.corrupt, 1);
    }

    #[test]
    fn test_decode_corrupt_blob_is_empty() {
        for raw in ["", "{not json", "[1,2,3]", "null"] {
            let mut restored = Restored::default();
            decode_entries(Some(raw), 0, &mut restored);
            assert!(restored.entries.is_empty(), "{raw}");
        }
    }

    #[test]
    fn test_decode_metrics_corrupt() {
        assert_eq!(decode_metrics(Some("garbage")), CacheMetrics::default());
        assert_eq!(decode_metrics(None), CacheMetrics::default());
        assert_eq!(decode_metrics(Some(r#"{"hits":2,"misses":1}"#)).hits, 2);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = MemoryStore::new();
        let persistence = persistence(&store);
        let entries = HashMap::from([("k".to_string(), entry(0, 1_000))]);
        let metrics = CacheMetrics { hits: 3, total_requests: 3, ..Default::default() };
        let (e, m) = encode(&entries, &metrics, 0).unwrap();
        persistence.save(e, m).await.unwrap();

        let restored = persistence.load(10).await.unwrap();
        assert_eq!(restored.entries.len(), 1);
        assert_eq!(restored.metrics.hits, 3);
        assert_eq!(restored.entries["k"], entries["k"]);
    }

    #[tokio::test]
    async fn test_load_backend_failure_is_error() {
        let store = MemoryStore::new();
        store.set_failing(true);
        assert!(persistence(&store).load(0).await.is_err());
    }
}
