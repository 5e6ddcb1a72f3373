//! Individual legislator vote persistence

use rollcall_common::db::VoteRecord;
use rollcall_common::Result;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};

/// Upsert a batch of votes as one multi-row statement
///
/// On `(vote_id, legislator_id)` conflict the position columns are
/// overwritten. Returns rows affected.
pub async fn upsert_batch(conn: &mut SqliteConnection, rows: &[VoteRecord]) -> sqlx::Result<u64> {
    if rows.is_empty() {
        return Ok(0);
    }

    let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
        "INSERT INTO votes (vote_id, legislator_id, position, original_position) ",
    );
    qb.push_values(rows, |mut b, row| {
        b.push_bind(row.vote_id.as_str())
            .push_bind(row.legislator_id.as_str())
            .push_bind(row.position.as_str())
            .push_bind(row.original_position.as_str());
    });
    qb.push(
        " ON CONFLICT(vote_id, legislator_id) DO UPDATE SET \
         position = excluded.position, \
         original_position = excluded.original_position",
    );

    let result = qb.build().execute(conn).await?;
    Ok(result.rows_affected())
}

/// All votes cast in one roll call, ordered by legislator
pub async fn load_for_vote(pool: &SqlitePool, vote_id: &str) -> Result<Vec<VoteRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT vote_id, legislator_id, position, original_position
        FROM votes
        WHERE vote_id = ?
        ORDER BY legislator_id
        "#,
    )
    .bind(vote_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| VoteRecord {
            vote_id: row.get("vote_id"),
            legislator_id: row.get("legislator_id"),
            position: row.get("position"),
            original_position: row.get("original_position"),
        })
        .collect())
}

/// Count vote rows
pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM votes")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
