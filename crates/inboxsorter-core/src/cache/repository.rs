//! Address cache storage repository.

use std::future::Future;

use sqlx::sqlite::{Sqlite, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Row};
use tracing::{debug, warn};

use super::model::CacheEntry;
use crate::error::{CacheLoadError, CacheSaveError};

/// Rows per `INSERT` statement, kept well below `SQLite`'s bind limit.
const INSERT_BATCH_SIZE: usize = 400;

/// Durable backing store for the address cache.
pub trait CacheStore {
    /// Read every stored entry. A store with no table yet reads as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the store exists but cannot be read.
    fn load_all(&self) -> impl Future<Output = Result<Vec<CacheEntry>, CacheLoadError>> + Send;

    /// Replace the whole store content with `entries`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn replace_all(
        &self,
        entries: &[CacheEntry],
    ) -> impl Future<Output = Result<(), CacheSaveError>> + Send;
}

/// `SQLite` store using the `smtp_cache` table.
///
/// The table name, column names and index name are shared with external
/// export and migration tooling and must not change.
pub struct SqliteCacheStore {
    pool: SqlitePool,
}

impl SqliteCacheStore {
    /// Open (or create) the database file at `database_path`.
    ///
    /// The table itself is only created by the first flush.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails.
    pub async fn new(database_path: &str) -> crate::Result<Self> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await?;

        Ok(Self { pool })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails.
    pub async fn in_memory() -> crate::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        Ok(Self { pool })
    }

    /// Whether the `smtp_cache` table exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn table_exists(&self) -> crate::Result<bool> {
        Ok(self.has_table().await?)
    }

    /// Number of stored entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count(&self) -> crate::Result<i64> {
        if !self.has_table().await? {
            return Ok(0);
        }

        let row = sqlx::query(r"SELECT COUNT(*) as count FROM smtp_cache")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("count"))
    }

    async fn has_table(&self) -> Result<bool, sqlx::Error> {
        let row = sqlx::query(
            r"
            SELECT COUNT(*) as count
            FROM sqlite_master
            WHERE type = 'table' AND name = 'smtp_cache'
            ",
        )
        .fetch_one(&self.pool)
        .await?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }

    async fn read_rows(&self) -> Result<Vec<CacheEntry>, sqlx::Error> {
        if !self.has_table().await? {
            debug!("No smtp_cache table yet");
            return Ok(Vec::new());
        }

        let rows = sqlx::query(r"SELECT ExchangeAddress, SMTPAddress FROM smtp_cache")
            .fetch_all(&self.pool)
            .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            let internal: Option<String> = row.try_get("ExchangeAddress")?;
            let canonical: Option<String> = row.try_get("SMTPAddress")?;
            match (internal, canonical) {
                (Some(internal_address), Some(canonical_address)) => entries.push(CacheEntry {
                    internal_address,
                    canonical_address,
                }),
                _ => warn!("Ignoring smtp_cache row with a NULL column"),
            }
        }

        Ok(entries)
    }

    async fn write_rows(&self, entries: &[CacheEntry]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(r"DROP TABLE IF EXISTS smtp_cache")
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r"
            CREATE TABLE smtp_cache (
                ExchangeAddress TEXT COLLATE NOCASE,
                SMTPAddress TEXT
            )
            ",
        )
        .execute(&mut *tx)
        .await?;

        for chunk in entries.chunks(INSERT_BATCH_SIZE) {
            let mut insert: QueryBuilder<Sqlite> =
                QueryBuilder::new("INSERT INTO smtp_cache (ExchangeAddress, SMTPAddress) ");
            insert.push_values(chunk, |mut row, entry| {
                row.push_bind(entry.internal_address.clone())
                    .push_bind(entry.canonical_address.clone());
            });
            insert.build().execute(&mut *tx).await?;
        }

        // Index for point lookups by external tooling
        sqlx::query(r"CREATE INDEX IF NOT EXISTS idx_ex_addr ON smtp_cache (ExchangeAddress)")
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

impl CacheStore for SqliteCacheStore {
    async fn load_all(&self) -> Result<Vec<CacheEntry>, CacheLoadError> {
        Ok(self.read_rows().await?)
    }

    async fn replace_all(&self, entries: &[CacheEntry]) -> Result<(), CacheSaveError> {
        self.write_rows(entries).await?;
        debug!(entries = entries.len(), "Replaced smtp_cache table");
        Ok(())
    }
}
