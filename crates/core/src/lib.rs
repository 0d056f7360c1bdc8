//! Core types and shared functionality for the page cache.
//!
//! This crate provides:
//! - The [`PageCache`] service and its eviction, TTL and admission policies
//! - Durable storage backends (SQLite, in-memory)
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod clock;
pub mod config;
pub mod content;
pub mod error;
pub mod scheduler;
pub mod storage;

pub use cache::{CacheEntry, CacheMetrics, CacheStats, ContentCategory, PageCache, RejectReason, SetOutcome};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheConfig, ConfigError};
pub use content::{CacheOptions, CachedContent, PageContent};
pub use error::Error;
pub use storage::{DurableStore, MemoryStore, SqliteStore};
