//! Site metadata: when the data was last refreshed

use chrono::{DateTime, Utc};
use rollcall_common::Result;
use sqlx::SqlitePool;

/// Record a completed ingestion run
pub async fn record_update(pool: &SqlitePool, at: DateTime<Utc>, timezone: &str) -> Result<()> {
    sqlx::query("INSERT OR REPLACE INTO site_meta (last_update, tz) VALUES (?, ?)")
        .bind(at.to_rfc3339())
        .bind(timezone)
        .execute(pool)
        .await?;
    Ok(())
}

/// Most recent recorded update, as stored
pub async fn last_update(pool: &SqlitePool) -> Result<Option<String>> {
    let last: Option<String> = sqlx::query_scalar("SELECT MAX(last_update) FROM site_meta")
        .fetch_one(pool)
        .await?;
    Ok(last)
}
