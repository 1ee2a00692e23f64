use std::{path::Path, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OptionalExtension, params};
use tokio::task;

use super::{CacheBackend, CacheError};

/// Key-value cache persisted in a single SQLite table.
pub struct SqliteCache {
    pool: Arc<Pool<SqliteConnectionManager>>,
}

impl SqliteCache {
    pub fn new(pool: Pool<SqliteConnectionManager>) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Opens (or creates) the cache file and makes sure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path.as_ref());
        let pool = r2d2::Pool::builder().max_size(4).build(manager)?;
        let cache = Self::new(pool);
        cache.init_schema()?;
        Ok(cache)
    }

    pub fn init_schema(&self) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS cache_entries (
               key         TEXT PRIMARY KEY,
               value       BLOB NOT NULL,
               updated_at  INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    async fn run<T, F>(&self, f: F) -> Result<T, CacheError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        task::spawn_blocking(move || -> Result<T> {
            let conn = pool.get()?;
            Ok(f(&*conn)?)
        })
        .await
        .map_err(CacheError::unavailable)?
        .map_err(CacheError::unavailable)
    }
}

#[async_trait]
impl CacheBackend for SqliteCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let key = key.to_owned();
        self.run(move |conn| {
            conn.query_row(
                "SELECT value FROM cache_entries WHERE key = ?1",
                params![key],
                |r| r.get::<_, Vec<u8>>(0),
            )
            .optional()
        })
        .await
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        let key = key.to_owned();
        self.run(move |conn| {
            conn.execute(
                r#"
                INSERT INTO cache_entries (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                "#,
                params![key, value, chrono::Utc::now().timestamp_millis()],
            )
            .map(|_| ())
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let key = key.to_owned();
        self.run(move |conn| {
            conn.execute("DELETE FROM cache_entries WHERE key = ?1", params![key])
                .map(|_| ())
        })
        .await
    }
}
