//! Download counter store.
//!
//! Increments are single upsert statements so concurrent downloads of the
//! same resource never lose updates.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

/// Persisted counter for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadCount {
    pub resource_id: String,
    pub count: i64,
}

/// SQLite-backed download counters keyed by resource id.
#[derive(Clone)]
pub struct DownloadCounterStore {
    pool: SqlitePool,
}

impl DownloadCounterStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Atomically add one download for `resource_id` and return the new count.
    pub async fn increment(&self, resource_id: &str) -> Result<i64, sqlx::Error> {
        let now = Utc::now().to_rfc3339();
        let row = sqlx::query(
            r#"INSERT INTO download_counts (resource_id, count, last_downloaded_at)
               VALUES (?, 1, ?)
               ON CONFLICT(resource_id) DO UPDATE SET
                   count = count + 1,
                   last_downloaded_at = excluded.last_downloaded_at
               RETURNING count"#,
        )
        .bind(resource_id)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("count"))
    }

    /// Recorded downloads for `resource_id`, zero if never downloaded.
    pub async fn get(&self, resource_id: &str) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT count FROM download_counts WHERE resource_id = ?")
            .bind(resource_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get("count")).unwrap_or(0))
    }

    /// All recorded counters, ordered by resource id.
    pub async fn list(&self) -> Result<Vec<DownloadCount>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT resource_id, count FROM download_counts ORDER BY resource_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(count_from_row).collect())
    }

    /// Close the underlying pool. Later calls fail.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn count_from_row(row: &sqlx::sqlite::SqliteRow) -> DownloadCount {
    DownloadCount {
        resource_id: row.get("resource_id"),
        count: row.get("count"),
    }
}
