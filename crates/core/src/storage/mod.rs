//! Durable key-value storage backing cache snapshots.
//!
//! The cache persists exactly two keys per namespace (the serialized entry
//! map and the serialized metrics). Backends only need batch get/set of
//! JSON text values; writes are last-writer-wins.
//!
//! - [`MemoryStore`]: process-local, for tests and memory-only operation
//! - [`SqliteStore`]: SQLite file via tokio-rusqlite, WAL mode, migrations

pub mod memory;
pub mod migrations;
pub mod sqlite;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::Error;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Async key-value contract for snapshot persistence.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Fetch the values stored under `keys`; absent keys are simply missing from the result.
    async fn get(&self, keys: &[String]) -> Result<HashMap<String, String>, Error>;

    /// Write all `entries`, replacing existing values.
    async fn set(&self, entries: HashMap<String, String>) -> Result<(), Error>;
}
