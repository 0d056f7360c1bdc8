//! Cache entries and their bookkeeping.

use serde::{Deserialize, Serialize};

use super::classify::ContentCategory;
use crate::PageContent;

/// One cached page.
///
/// Serialized as-is into the persisted entry map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub content: PageContent,
    pub content_hash: String,
    pub content_type: ContentCategory,
    pub created_at: i64,
    pub expires_at: i64,
    pub last_accessed: i64,
    #[serde(default)]
    pub access_count: u64,
    #[serde(default)]
    pub size_bytes: u64,
    /// Original, non-normalized request URL.
    pub url: String,
}

impl CacheEntry {
    /// Build a fresh entry and compute its serialized size.
    ///
    /// `ttl_ms` is clamped to at least 1 so that `expires_at > created_at`.
    pub fn new(
        url: &str, content: PageContent, content_hash: String, content_type: ContentCategory, now_ms: i64, ttl_ms: i64,
    ) -> Self {
        let mut entry = Self {
            content,
            content_hash,
            content_type,
            created_at: now_ms,
            expires_at: now_ms.saturating_add(ttl_ms.max(1)),
            last_accessed: now_ms,
            access_count: 0,
            size_bytes: 0,
            url: url.to_string(),
        };
        entry.resize();
        entry
    }

    /// Recompute `size_bytes` from the current content.
    pub fn resize(&mut self) {
        self.size_bytes = 0;
        self.size_bytes = self.measure();
    }

    /// Serialized JSON size of this entry in bytes.
    pub fn measure(&self) -> u64 {
        serde_json::to_vec(self).map_or(0, |bytes| bytes.len() as u64)
    }

    /// An entry is logically absent from the moment `now` reaches `expires_at`.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at
    }

    /// Record a cache hit.
    pub fn touch(&mut self, now_ms: i64) {
        self.last_accessed = now_ms;
        self.access_count += 1;
    }

    /// Unchanged content was written again: push expiry out without resetting history.
    pub fn refresh(&mut self, now_ms: i64, ttl_ms: i64) {
        self.expires_at = now_ms.saturating_add(ttl_ms.max(1));
        self.last_accessed = now_ms;
    }

    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.created_at).max(0)
    }

    pub fn idle_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.last_accessed).max(0)
    }
}
