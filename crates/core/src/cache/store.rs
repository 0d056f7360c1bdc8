//! The page cache service.
//!
//! [`PageCache`] is a cheaply clonable handle; clones share one store.
//! Every map operation runs to completion under a single lock, so readers
//! never observe a half-applied write or eviction pass. Durable I/O happens
//! outside the lock: a write racing a flush lands in the next flush.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use tokio::sync::Mutex;

use super::admission::{AdmissionPolicy, RejectReason};
use super::classify::{TtlPolicy, classify};
use super::entry::CacheEntry;
use super::eviction;
use super::hash::content_fingerprint;
use super::key::cache_key;
use super::metrics::{CacheMetrics, CacheStats};
use super::persist::{self, Persistence};
use crate::clock::{Clock, SystemClock};
use crate::scheduler::{self, Maintenance, SchedulerHandle};
use crate::storage::DurableStore;
use crate::{CacheConfig, CacheOptions, CachedContent, Error, PageContent};

/// What a write did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetOutcome {
    /// A new or replacement entry was inserted.
    Stored,
    /// Content was unchanged; only the expiry was extended.
    Refreshed,
    /// Admission control declined the write.
    Skipped(RejectReason),
}

impl SetOutcome {
    pub fn is_cached(&self) -> bool {
        !matches!(self, Self::Skipped(_))
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    total_size: u64,
    metrics: CacheMetrics,
}

impl CacheState {
    fn insert(&mut self, key: String, entry: CacheEntry) {
        self.total_size += entry.size_bytes;
        if let Some(old) = self.entries.insert(key, entry) {
            self.total_size = self.total_size.saturating_sub(old.size_bytes);
        }
    }

    fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.total_size = self.total_size.saturating_sub(entry.size_bytes);
        Some(entry)
    }

    fn remove_where(&mut self, mut pred: impl FnMut(&CacheEntry) -> bool) -> usize {
        let doomed: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, e)| pred(e))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &doomed {
            self.remove(key);
        }
        doomed.len()
    }

    fn evict(&mut self, space_needed: u64, max_entries: usize, now_ms: i64) {
        let plan = eviction::plan(&self.entries, space_needed, max_entries, now_ms);
        if plan.victims.is_empty() {
            return;
        }
        for key in &plan.victims {
            self.remove(key);
        }
        self.metrics.evictions += plan.victims.len() as u64;
        tracing::debug!(
            evicted = plan.victims.len(),
            freed_bytes = plan.freed_bytes,
            remaining = self.entries.len(),
            "eviction pass complete"
        );
    }
}

struct Inner {
    config: CacheConfig,
    ttl: TtlPolicy,
    admission: AdmissionPolicy,
    clock: Arc<dyn Clock>,
    persistence: Persistence,
    state: Mutex<CacheState>,
    scheduler: Mutex<Option<SchedulerHandle>>,
}

impl Inner {
    fn now(&self) -> i64 {
        self.clock.now_ms()
    }

    async fn flush(&self) -> Result<(), Error> {
        let now = self.now();
        let (entries_json, metrics_json) = {
            let state = self.state.lock().await;
            persist::encode(&state.entries, &state.metrics, now)?
        };
        self.persistence.save(entries_json, metrics_json).await
    }

    async fn cleanup_expired(&self) -> usize {
        let now = self.now();
        let removed = self.state.lock().await.remove_where(|e| e.is_expired(now));
        if removed > 0 {
            tracing::debug!(removed, "swept expired entries");
        }
        removed
    }
}

#[async_trait]
impl Maintenance for Inner {
    async fn persist(&self) {
        if let Err(e) = self.flush().await {
            tracing::warn!(error = %e, "cache flush failed, continuing memory-only");
        }
    }

    async fn sweep(&self) {
        self.cleanup_expired().await;
    }
}

/// Bounded, TTL-aware cache of extracted page content.
#[derive(Clone)]
pub struct PageCache {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for PageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageCache")
            .field("config", &self.inner.config)
            .field("persistence", &self.inner.persistence)
            .finish_non_exhaustive()
    }
}

impl PageCache {
    /// Create a cache on the system clock. Nothing is loaded until [`PageCache::init`].
    pub fn new(config: CacheConfig, store: Arc<dyn DurableStore>) -> Self {
        Self::with_clock(config, store, Arc::new(SystemClock))
    }

    pub fn with_clock(config: CacheConfig, store: Arc<dyn DurableStore>, clock: Arc<dyn Clock>) -> Self {
        let persistence = Persistence::new(store, config.entries_key(), config.metrics_key());
        let inner = Inner {
            ttl: TtlPolicy::from_config(&config),
            admission: AdmissionPolicy { min_content_chars: config.min_content_chars },
            clock,
            persistence,
            state: Mutex::new(CacheState::default()),
            scheduler: Mutex::new(None),
            config,
        };
        Self { inner: Arc::new(inner) }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Restore the persisted snapshot and start the background timers.
    ///
    /// A storage failure is logged and the cache starts empty.
    pub async fn init(&self) {
        let mut timers = self.inner.scheduler.lock().await;
        if timers.is_some() {
            tracing::warn!("page cache already initialized");
            return;
        }

        if let Err(e) = self.restore().await {
            tracing::warn!(error = %e, "failed to restore cache snapshot, starting empty");
        }

        *timers = Some(scheduler::spawn(
            &self.inner,
            self.inner.config.persist_interval(),
            self.inner.config.cleanup_interval(),
        ));
        tracing::info!(namespace = %self.inner.config.namespace, "page cache initialized");
    }

    /// Stop the timers and write a final snapshot.
    pub async fn shutdown(&self) {
        let handle = self.inner.scheduler.lock().await.take();
        if let Some(handle) = handle {
            handle.shutdown().await;
        }
        self.inner.persist().await;
        tracing::info!(namespace = %self.inner.config.namespace, "page cache shut down");
    }

    /// Load the persisted snapshot into memory, dropping expired entries.
    ///
    /// Entries already present in memory win over restored ones; restored
    /// metrics are added to the live counters. Returns the number of entries restored.
    pub async fn restore(&self) -> Result<usize, Error> {
        let now = self.inner.now();
        let restored = self.inner.persistence.load(now).await?;

        let mut state = self.inner.state.lock().await;
        let mut count = 0;
        for (key, entry) in restored.entries {
            if !state.entries.contains_key(&key) {
                state.insert(key, entry);
                count += 1;
            }
        }
        state.metrics.merge(&restored.metrics);

        let over_size = state.total_size.saturating_sub(self.inner.config.max_size_bytes);
        if over_size > 0 || state.entries.len() > self.inner.config.max_entries {
            state.evict(over_size, self.inner.config.max_entries, now);
        }

        tracing::info!(
            restored = count,
            expired = restored.expired,
            corrupt = restored.corrupt,
            "restored cache snapshot"
        );
        Ok(count)
    }

    /// Look up content for a request.
    ///
    /// Expired entries are deleted on sight and count as misses.
    pub async fn get(&self, url: &str, options: &CacheOptions) -> Option<CachedContent> {
        let key = cache_key(url, options);
        let now = self.inner.now();

        let mut guard = self.inner.state.lock().await;
        let state = &mut *guard;
        state.metrics.total_requests += 1;

        let expired = match state.entries.get(&key) {
            Some(entry) => entry.is_expired(now),
            None => {
                state.metrics.misses += 1;
                tracing::debug!(key = %key, "cache miss");
                return None;
            }
        };

        if expired {
            state.remove(&key);
            state.metrics.misses += 1;
            tracing::debug!(key = %key, "cache entry expired");
            return None;
        }

        let entry = state.entries.get_mut(&key)?;
        entry.touch(now);
        let hit = CachedContent {
            content: entry.content.clone(),
            from_cache: true,
            cached_at: entry.created_at,
            access_count: entry.access_count,
        };
        state.metrics.hits += 1;
        tracing::debug!(key = %key, access_count = hit.access_count, "cache hit");
        Some(hit)
    }

    /// Store content; returns whether it was admitted.
    pub async fn set(&self, url: &str, content: PageContent, options: &CacheOptions) -> bool {
        self.put(url, content, options).await.is_cached()
    }

    /// Store content, reporting what happened.
    pub async fn put(&self, url: &str, content: PageContent, options: &CacheOptions) -> SetOutcome {
        let config = &self.inner.config;

        if let Err(reason) = self.inner.admission.check(url, &content) {
            return self.reject(url, reason).await;
        }

        let category = classify(url, &content);
        let ttl = self.inner.ttl.resolve(category, options.ttl_ms);
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let hash = content_fingerprint(&content);
        let key = cache_key(url, options);
        let now = self.inner.now();

        let mut guard = self.inner.state.lock().await;
        let state = &mut *guard;

        if let Some(existing) = state.entries.get_mut(&key)
            && existing.content_hash == hash
        {
            existing.refresh(now, ttl_ms);
            tracing::debug!(key = %key, "content unchanged, extended expiry");
            return SetOutcome::Refreshed;
        }

        let entry = CacheEntry::new(url, content, hash, category, now, ttl_ms);
        if entry.size_bytes > config.max_size_bytes {
            let reason = RejectReason::TooLarge { size_bytes: entry.size_bytes, max_bytes: config.max_size_bytes };
            drop(guard);
            return self.reject(url, reason).await;
        }

        state.remove(&key);

        if state.total_size + entry.size_bytes > config.max_size_bytes || state.entries.len() >= config.max_entries {
            let space_needed = (state.total_size + entry.size_bytes).saturating_sub(config.max_size_bytes);
            state.evict(space_needed, config.max_entries, now);
        }

        tracing::debug!(
            key = %key,
            category = %category,
            ttl_ms,
            size_bytes = entry.size_bytes,
            "cached page content"
        );
        state.insert(key, entry);
        SetOutcome::Stored
    }

    async fn reject(&self, url: &str, reason: RejectReason) -> SetOutcome {
        self.inner.state.lock().await.metrics.rejections += 1;
        tracing::info!(url, reason = %reason, "skipping cache write");
        SetOutcome::Skipped(reason)
    }

    /// Serve from cache, or run `extractor` on a miss and cache its result.
    ///
    /// The extractor is not called on a hit. A `None` from the extractor
    /// is passed through without touching the cache.
    pub async fn get_or_extract<F, Fut>(&self, url: &str, extractor: F, options: &CacheOptions) -> Option<CachedContent>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<PageContent>>,
    {
        if let Some(hit) = self.get(url, options).await {
            return Some(hit);
        }

        let content = extractor().await?;
        let outcome = self.put(url, content.clone(), options).await;
        tracing::debug!(url, cached = outcome.is_cached(), "extracted on miss");
        Some(CachedContent::fresh(content, self.inner.now()))
    }

    /// Presence check that honors expiry but records no access.
    pub async fn contains(&self, url: &str, options: &CacheOptions) -> bool {
        let key = cache_key(url, options);
        let now = self.inner.now();
        let state = self.inner.state.lock().await;
        state.entries.get(&key).is_some_and(|e| !e.is_expired(now))
    }

    /// Snapshot of one entry, without access bookkeeping.
    pub async fn entry(&self, url: &str, options: &CacheOptions) -> Option<CacheEntry> {
        let key = cache_key(url, options);
        self.inner.state.lock().await.entries.get(&key).cloned()
    }

    /// Delete the entry for one request. Returns whether anything was removed.
    pub async fn remove(&self, url: &str, options: &CacheOptions) -> bool {
        let key = cache_key(url, options);
        self.inner.state.lock().await.remove(&key).is_some()
    }

    /// Empty the store and flush the empty snapshot.
    pub async fn clear(&self) {
        {
            let mut state = self.inner.state.lock().await;
            let dropped = state.entries.len();
            state.entries.clear();
            state.total_size = 0;
            tracing::info!(dropped, "cache cleared");
        }
        self.inner.persist().await;
    }

    /// Delete every entry whose original URL matches `pattern`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPattern` if `pattern` is not a valid regex.
    pub async fn invalidate(&self, pattern: &str) -> Result<usize, Error> {
        let regex = Regex::new(pattern)?;
        Ok(self.invalidate_matching(&regex).await)
    }

    /// Delete every entry whose original URL matches a pre-compiled regex.
    pub async fn invalidate_matching(&self, regex: &Regex) -> usize {
        let removed = self.inner.state.lock().await.remove_where(|e| regex.is_match(&e.url));
        tracing::info!(pattern = regex.as_str(), removed, "invalidated cache entries");
        removed
    }

    /// Active sweep of expired entries; also run by the cleanup timer.
    pub async fn cleanup_expired(&self) -> usize {
        self.inner.cleanup_expired().await
    }

    /// Write unexpired entries and metrics to durable storage now.
    pub async fn flush(&self) -> Result<(), Error> {
        self.inner.flush().await
    }

    pub async fn stats(&self) -> CacheStats {
        let state = self.inner.state.lock().await;
        CacheStats::collect(
            state.entries.values(),
            state.metrics,
            self.inner.config.max_entries,
            self.inner.config.max_size_bytes,
        )
    }

    pub async fn metrics(&self) -> CacheMetrics {
        self.inner.state.lock().await.metrics
    }

    pub async fn len(&self) -> usize {
        self.inner.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// All keys currently held, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.state.lock().await.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub async fn total_size(&self) -> u64 {
        self.inner.state.lock().await.total_size
    }
}
