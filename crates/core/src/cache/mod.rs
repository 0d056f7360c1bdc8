//! In-memory page cache with durable snapshots.
//!
//! This module provides a bounded, TTL-aware store for extracted page
//! content. It supports:
//!
//! - URL normalization into request-scoped cache keys
//! - Category-driven TTLs (news, social, documentation, static, ...)
//! - Admission control that keeps error and login pages out
//! - Score-based eviction under byte and entry budgets
//! - Periodic persistence to a [`DurableStore`](crate::storage::DurableStore)

pub mod admission;
pub mod classify;
pub mod entry;
pub mod eviction;
pub mod hash;
pub mod key;
pub mod metrics;
pub mod persist;
pub mod store;

pub use admission::{AdmissionPolicy, RejectReason};
pub use classify::{ContentCategory, TtlPolicy, classify};
pub use entry::CacheEntry;
pub use key::{cache_key, normalize_url};
pub use metrics::{CacheMetrics, CacheStats, CategoryStats};
pub use store::{PageCache, SetOutcome};
