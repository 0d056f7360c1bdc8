//! Hit/miss/eviction counters and the stats report.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::classify::ContentCategory;
use super::entry::CacheEntry;

/// Running counters, persisted alongside the entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub total_requests: u64,
    pub rejections: u64,
}

impl CacheMetrics {
    /// Add restored counters on top of the in-memory ones.
    pub fn merge(&mut self, other: &CacheMetrics) {
        self.hits += other.hits;
        self.misses += other.misses;
        self.evictions += other.evictions;
        self.total_requests += other.total_requests;
        self.rejections += other.rejections;
    }

    pub fn hit_rate_pct(&self) -> f64 {
        percent(self.hits as f64, self.total_requests as f64)
    }
}

/// Per-category aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub count: usize,
    pub total_size: u64,
    pub avg_access_count: f64,
}

impl CategoryStats {
    fn add(&mut self, entry: &CacheEntry) {
        self.count += 1;
        self.total_size += entry.size_bytes;
        self.avg_access_count += (entry.access_count as f64 - self.avg_access_count) / self.count as f64;
    }
}

/// Point-in-time report returned by `PageCache::stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: usize,
    pub max_entries: usize,
    pub total_size_bytes: u64,
    pub max_size_bytes: u64,
    pub entry_utilization_pct: f64,
    pub size_utilization_pct: f64,
    pub hit_rate_pct: f64,
    #[serde(flatten)]
    pub metrics: CacheMetrics,
    pub categories: BTreeMap<ContentCategory, CategoryStats>,
}

impl CacheStats {
    /// Summarize the physically present entries against the configured budgets.
    pub fn collect<'a, I>(entries: I, metrics: CacheMetrics, max_entries: usize, max_size_bytes: u64) -> Self
    where
        I: IntoIterator<Item = &'a CacheEntry>,
    {
        let mut count = 0usize;
        let mut total_size = 0u64;
        let mut categories: BTreeMap<ContentCategory, CategoryStats> = BTreeMap::new();

        for entry in entries {
            count += 1;
            total_size += entry.size_bytes;
            categories.entry(entry.content_type).or_default().add(entry);
        }

        Self {
            entries: count,
            max_entries,
            total_size_bytes: total_size,
            max_size_bytes,
            entry_utilization_pct: percent(count as f64, max_entries as f64),
            size_utilization_pct: percent(total_size as f64, max_size_bytes as f64),
            hit_rate_pct: metrics.hit_rate_pct(),
            metrics,
            categories,
        }
    }
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 { 0.0 } else { part / whole * 100.0 }
}
