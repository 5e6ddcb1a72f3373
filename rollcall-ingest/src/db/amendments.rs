//! Amendment persistence
//!
//! Real amendment rows and placeholders share one upsert so a later
//! amendment pass overwrites a placeholder in place.

use rollcall_common::db::AmendmentRecord;
use rollcall_common::Result;
use sqlx::{Row, SqliteConnection, SqlitePool};

/// Insert or overwrite an amendment keyed by `amendment_id`
pub async fn upsert(conn: &mut SqliteConnection, record: &AmendmentRecord) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO amendments (
            amendment_id, bill_id, sponsor_id, chamber, purpose, congress, source_filename
        )
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(amendment_id) DO UPDATE SET
            bill_id = excluded.bill_id,
            sponsor_id = excluded.sponsor_id,
            chamber = excluded.chamber,
            purpose = excluded.purpose,
            congress = excluded.congress,
            source_filename = excluded.source_filename
        "#,
    )
    .bind(&record.amendment_id)
    .bind(&record.bill_id)
    .bind(&record.sponsor_id)
    .bind(&record.chamber)
    .bind(&record.purpose)
    .bind(&record.congress)
    .bind(&record.source_filename)
    .execute(conn)
    .await?;

    Ok(())
}

/// Load an amendment by id
pub async fn load(pool: &SqlitePool, amendment_id: &str) -> Result<Option<AmendmentRecord>> {
    let row = sqlx::query(
        r#"
        SELECT amendment_id, bill_id, sponsor_id, chamber, purpose, congress, source_filename
        FROM amendments
        WHERE amendment_id = ?
        "#,
    )
    .bind(amendment_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| AmendmentRecord {
        amendment_id: row.get("amendment_id"),
        bill_id: row.get("bill_id"),
        sponsor_id: row.get("sponsor_id"),
        chamber: row.get("chamber"),
        purpose: row.get("purpose"),
        congress: row.get("congress"),
        source_filename: row.get("source_filename"),
    }))
}

/// Count amendment rows
pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM amendments")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
