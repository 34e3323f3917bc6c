//! Response cache backends for [`RequestGate`](super::RequestGate).

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Row, Sqlite};
use tokio::sync::RwLock;

use crate::core::error::CacheError;

/// One stored response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Request identity, see [`RequestKey`](super::RequestKey).
    pub key: String,
    /// Serialized response, served back verbatim.
    pub payload: String,
    /// Wall-clock time the response was stored.
    pub created_at: DateTime<Utc>,
    /// Maximum age at which the entry is still served.
    pub ttl: Duration,
}

impl CacheEntry {
    /// `true` while the entry's age has not exceeded its TTL.
    ///
    /// An entry stamped in the future (clock moved backwards) counts as fresh.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match now.signed_duration_since(self.created_at).to_std() {
            Ok(age) => age <= self.ttl,
            Err(_) => true,
        }
    }
}

/// Storage used by the gate. Freshness is decided by the gate, not the backend.
#[async_trait]
pub trait CacheBackend: Send + Sync + std::fmt::Debug {
    /// Fetch the entry stored under `key`, fresh or not.
    async fn load(&self, key: &str) -> Result<Option<CacheEntry>, CacheError>;

    /// Insert or replace the entry under `entry.key`.
    async fn store(&self, entry: CacheEntry) -> Result<(), CacheError>;

    /// Delete every entry that is no longer fresh at `now`. Returns how many were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, CacheError>;

    /// Number of stored entries, including stale ones.
    async fn len(&self) -> Result<usize, CacheError>;
}

/* ---------------- in-memory ---------------- */

/// Process-local cache. Lost on restart.
#[derive(Debug, Default)]
pub struct MemoryCache {
    map: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn load(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self.map.read().await.get(key).cloned())
    }

    async fn store(&self, entry: CacheEntry) -> Result<(), CacheError> {
        self.map.write().await.insert(entry.key.clone(), entry);
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, CacheError> {
        let mut map = self.map.write().await;
        let before = map.len();
        map.retain(|_, e| e.is_fresh(now));
        Ok((before - map.len()) as u64)
    }

    async fn len(&self) -> Result<usize, CacheError> {
        Ok(self.map.read().await.len())
    }
}

/* ---------------- sqlite ---------------- */

/// Durable cache in a single SQLite file; survives restarts.
#[derive(Debug, Clone)]
pub struct SqliteCache {
    pool: Pool<Sqlite>,
}

impl SqliteCache {
    /// Open (creating if missing) the cache database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the schema cannot be created.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS responses (
                key TEXT PRIMARY KEY NOT NULL,
                payload TEXT NOT NULL,
                created_at_ms INTEGER NOT NULL,
                ttl_ms INTEGER NOT NULL
            );
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    /// Close the pool, flushing the WAL.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn ttl_to_ms(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)
}

#[async_trait]
impl CacheBackend for SqliteCache {
    async fn load(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let row = sqlx::query(
            "SELECT payload, created_at_ms, ttl_ms FROM responses WHERE key = ?",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let payload: String = row.try_get("payload")?;
        let created_ms: i64 = row.try_get("created_at_ms")?;
        let ttl_ms: i64 = row.try_get("ttl_ms")?;

        // An unreadable timestamp is treated as a miss; the next store overwrites it.
        let Some(created_at) = DateTime::from_timestamp_millis(created_ms) else {
            return Ok(None);
        };

        Ok(Some(CacheEntry {
            key: key.to_string(),
            payload,
            created_at,
            ttl: Duration::from_millis(u64::try_from(ttl_ms).unwrap_or(0)),
        }))
    }

    async fn store(&self, entry: CacheEntry) -> Result<(), CacheError> {
        sqlx::query(
            r#"
            INSERT INTO responses (key, payload, created_at_ms, ttl_ms)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                payload = excluded.payload,
                created_at_ms = excluded.created_at_ms,
                ttl_ms = excluded.ttl_ms
            "#,
        )
        .bind(entry.key)
        .bind(entry.payload)
        .bind(entry.created_at.timestamp_millis())
        .bind(ttl_to_ms(entry.ttl))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, CacheError> {
        let res = sqlx::query("DELETE FROM responses WHERE created_at_ms + ttl_ms < ?")
            .bind(now.timestamp_millis())
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    async fn len(&self) -> Result<usize, CacheError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM responses")
            .fetch_one(&self.pool)
            .await?;
        let n: i64 = row.try_get("n")?;
        Ok(usize::try_from(n).unwrap_or(0))
    }
}
