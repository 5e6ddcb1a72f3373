//! Database initialization
//!
//! Opens (or creates) the SQLite database and makes sure every table the
//! ingestion pipeline writes to exists. Table creation is idempotent so it
//! is safe to run at the start of every ingestion run.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Milliseconds a writer waits on a locked database before failing
const BUSY_TIMEOUT_MS: u64 = 5000;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Pragmas go on the connect options so every pooled connection gets them
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS));

    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create every ingestion table (idempotent)
///
/// Order matters: `vote_meta` references `amendments` and `votes`
/// references `vote_meta`.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_amendments_table(pool).await?;
    create_vote_meta_table(pool).await?;
    create_votes_table(pool).await?;
    create_site_meta_table(pool).await?;
    Ok(())
}

/// Create the amendments table
///
/// Real rows come from the amendment ingestion pass; the vote reconciler
/// writes placeholder rows keyed the same way.
pub async fn create_amendments_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS amendments (
            amendment_id TEXT PRIMARY KEY,
            bill_id TEXT,
            sponsor_id TEXT,
            chamber TEXT NOT NULL,
            purpose TEXT,
            congress TEXT NOT NULL,
            source_filename TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the vote_meta table
pub async fn create_vote_meta_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS vote_meta (
            vote_id TEXT PRIMARY KEY,
            vote_number INTEGER NOT NULL,
            bill_id TEXT,
            chamber TEXT NOT NULL,
            date TEXT NOT NULL,
            result TEXT NOT NULL,
            category TEXT NOT NULL,
            nomination_title TEXT,
            amendment_id TEXT REFERENCES amendments(amendment_id),
            source_filename TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_vote_meta_amendment ON vote_meta(amendment_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the votes table
pub async fn create_votes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS votes (
            vote_id TEXT NOT NULL REFERENCES vote_meta(vote_id),
            legislator_id TEXT NOT NULL,
            position TEXT NOT NULL,
            original_position TEXT NOT NULL,
            PRIMARY KEY (vote_id, legislator_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_votes_legislator ON votes(legislator_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the site_meta table (one row per completed ingestion run)
pub async fn create_site_meta_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS site_meta (
            last_update TEXT PRIMARY KEY,
            tz TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
