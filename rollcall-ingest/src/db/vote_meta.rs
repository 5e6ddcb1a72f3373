//! Vote metadata persistence and the count API used by sanity checks

use chrono::{DateTime, Utc};
use rollcall_common::db::{Chamber, VoteMetaRecord};
use rollcall_common::{Error, Result};
use sqlx::{Row, SqliteConnection, SqlitePool};

/// Insert or overwrite one vote_meta row keyed by `vote_id`
///
/// Every non-key column takes the new value on conflict.
pub async fn upsert(conn: &mut SqliteConnection, record: &VoteMetaRecord) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO vote_meta (
            vote_id, vote_number, bill_id, chamber, date, result,
            category, nomination_title, amendment_id, source_filename
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(vote_id) DO UPDATE SET
            vote_number = excluded.vote_number,
            bill_id = excluded.bill_id,
            chamber = excluded.chamber,
            date = excluded.date,
            result = excluded.result,
            category = excluded.category,
            nomination_title = excluded.nomination_title,
            amendment_id = excluded.amendment_id,
            source_filename = excluded.source_filename
        "#,
    )
    .bind(&record.vote_id)
    .bind(record.vote_number)
    .bind(&record.bill_id)
    .bind(record.chamber.code())
    .bind(record.date.to_rfc3339())
    .bind(&record.result)
    .bind(&record.category)
    .bind(&record.nomination_title)
    .bind(&record.amendment_id)
    .bind(&record.source_filename)
    .execute(conn)
    .await?;

    Ok(())
}

/// Load one vote_meta row
pub async fn load(pool: &SqlitePool, vote_id: &str) -> Result<Option<VoteMetaRecord>> {
    let row = sqlx::query(
        r#"
        SELECT vote_id, vote_number, bill_id, chamber, date, result,
               category, nomination_title, amendment_id, source_filename
        FROM vote_meta
        WHERE vote_id = ?
        "#,
    )
    .bind(vote_id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let chamber_code: String = row.get("chamber");
    let chamber = Chamber::from_code(&chamber_code)
        .ok_or_else(|| Error::InvalidInput(format!("unknown chamber {:?}", chamber_code)))?;

    let date_str: String = row.get("date");
    let date = DateTime::parse_from_rfc3339(&date_str)
        .map_err(|e| Error::InvalidInput(format!("bad stored date {:?}: {}", date_str, e)))?
        .with_timezone(&Utc);

    Ok(Some(VoteMetaRecord {
        vote_id: row.get("vote_id"),
        vote_number: row.get("vote_number"),
        bill_id: row.get("bill_id"),
        chamber,
        date,
        result: row.get("result"),
        category: row.get("category"),
        nomination_title: row.get("nomination_title"),
        amendment_id: row.get("amendment_id"),
        source_filename: row.get("source_filename"),
    }))
}

/// Count vote_meta rows, optionally only those of one congress
///
/// Vote ids embed the congress after the dash (`h12-118.2023`), so the
/// filter matches that suffix rather than joining other tables.
pub async fn count(pool: &SqlitePool, congress: Option<u32>) -> Result<i64> {
    let count: i64 = match congress {
        Some(congress) => {
            sqlx::query_scalar(
                "SELECT COUNT(*) FROM vote_meta WHERE vote_id LIKE ? OR vote_id LIKE ?",
            )
            .bind(format!("%-{}.%", congress))
            .bind(format!("%-{}", congress))
            .fetch_one(pool)
            .await?
        }
        None => {
            sqlx::query_scalar("SELECT COUNT(*) FROM vote_meta")
                .fetch_one(pool)
                .await?
        }
    };
    Ok(count)
}

/// vote_meta rows whose amendment_id has no amendments row
pub async fn count_dangling_amendments(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM vote_meta vm
        LEFT JOIN amendments a ON a.amendment_id = vm.amendment_id
        WHERE vm.amendment_id IS NOT NULL AND a.amendment_id IS NULL
        "#,
    )
    .fetch_one(pool)
    .await?;
    Ok(count)
}
