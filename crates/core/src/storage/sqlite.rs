//! SQLite storage backend with pragma configuration.
//!
//! Opens the database, applies pragmas for performance and concurrency
//! (WAL mode), runs migrations, and serves key-value reads and upserts
//! from the `kv_store` table.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tokio_rusqlite::{Connection, params, rusqlite};

use super::{DurableStore, migrations};
use crate::Error;

const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
     PRAGMA synchronous=NORMAL;
     PRAGMA temp_store=MEMORY;
     PRAGMA foreign_keys=ON;";

/// SQLite-backed durable store.
///
/// Wraps a tokio-rusqlite Connection that runs database operations
/// on a background thread.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pub(crate) conn: Connection,
}

impl SqliteStore {
    /// Open a database at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies performance pragmas,
    /// and runs any pending migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::prepare(conn).await
    }

    /// Open an in-memory database for testing.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::prepare(conn).await
    }

    async fn prepare(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| {
            conn.execute_batch(PRAGMAS)?;
            Ok(())
        })
        .await
        .map_err(Error::Database)?;

        migrations::run(&conn).await?;
        let version = migrations::schema_version(&conn).await?;
        tracing::debug!(version, "sqlite store ready");

        Ok(Self { conn })
    }
}

#[async_trait]
impl DurableStore for SqliteStore {
    async fn get(&self, keys: &[String]) -> Result<HashMap<String, String>, Error> {
        let keys = keys.to_vec();
        self.conn
            .call(move |conn| -> Result<HashMap<String, String>, Error> {
                let mut stmt = conn.prepare("SELECT value FROM kv_store WHERE key = ?1")?;
                let mut values = HashMap::new();

                for key in keys {
                    match stmt.query_row(params![key], |row| row.get::<_, String>(0)) {
                        Ok(value) => {
                            values.insert(key, value);
                        }
                        Err(rusqlite::Error::QueryReturnedNoRows) => {}
                        Err(e) => return Err(e.into()),
                    }
                }

                Ok(values)
            })
            .await
            .map_err(Error::from)
    }

    /// Upsert every entry in one transaction.
    async fn set(&self, entries: HashMap<String, String>) -> Result<(), Error> {
        let updated_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare(
                        "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                        ON CONFLICT(key) DO UPDATE SET
                            value = excluded.value,
                            updated_at = excluded.updated_at",
                    )?;
                    for (key, value) in &entries {
                        stmt.execute(params![key, value, updated_at])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}
