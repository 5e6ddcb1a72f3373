//! Shared fixtures for integration tests
//!
//! Builds a small scraped data tree in a temp directory and opens a fresh
//! database file next to it.

#![allow(dead_code)]

use rollcall_common::db::init_database;
use rollcall_ingest::services::ResponseAliases;
use rollcall_ingest::IngestSettings;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct Fixture {
    pub dir: TempDir,
    pub pool: SqlitePool,
}

impl Fixture {
    pub async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("data")).unwrap();
        let pool = init_database(&dir.path().join("db").join("rollcall.db"))
            .await
            .unwrap();
        Self { dir, pool }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn settings(&self) -> IngestSettings {
        IngestSettings {
            data_dir: self.data_dir(),
            vote_batch_size: 1000,
            loader_workers: 4,
            skip_amendments: false,
            timezone: "America/New_York".to_string(),
            aliases: ResponseAliases::builtin(),
        }
    }

    pub fn write_json(&self, rel: &str, body: &Value) {
        write_file(&self.data_dir(), rel, &serde_json::to_string_pretty(body).unwrap());
    }

    pub fn write_raw(&self, rel: &str, body: &str) {
        write_file(&self.data_dir(), rel, body);
    }

    /// Four votes across two congresses plus one bill and one amendment file
    ///
    /// - h1-118.2023: speaker election, candidate-name responses
    /// - h10-118.2023: `h-bill` ordinal 2 on hr1048 → hamdt4-118 (no data file)
    /// - h11-118.2023: direct `h` 2 → hamdt2-118 (data file present)
    /// - s20-119.2025: direct `s` 12 → samdt12-119 (no data file)
    pub fn write_standard_tree(&self) {
        self.write_json(
            "118/votes/2023/h1/data.json",
            &vote(
                "h1-118.2023",
                "h",
                118,
                json!({
                    "Johnson (LA)": [{"id": "A000001"}, {"id": "A000002"}],
                    "Jeffries": [{"id": "B000001"}],
                    "Emmer": [{"id": "C000001"}],
                    "Not Voting": [{"id": "D000001"}]
                }),
                json!({"category": "election"}),
            ),
        );

        self.write_json(
            "118/votes/2023/h10/data.json",
            &vote(
                "h10-118.2023",
                "h",
                118,
                json!({
                    "Aye": [{"id": "A000001"}, {"id": "B000001"}],
                    "No": [{"id": "C000001"}]
                }),
                json!({
                    "bill": {"type": "hr", "number": 1048, "congress": 118},
                    "amendment": {"type": "h-bill", "number": 2}
                }),
            ),
        );

        self.write_json(
            "118/votes/2023/h11/data.json",
            &vote(
                "h11-118.2023",
                "h",
                118,
                json!({
                    "Yea": [{"id": "A000001"}],
                    "Nay": [{"id": "B000001"}],
                    "Present": [{"id": "C000001"}]
                }),
                json!({
                    "bill": {"type": "hr", "number": 1048, "congress": 118},
                    "amendment": {"type": "h", "number": 2}
                }),
            ),
        );

        self.write_json(
            "119/votes/2025/s20/data.json",
            &vote(
                "s20-119.2025",
                "s",
                119,
                json!({
                    "Yea": [{"id": "S001"}, {"id": "S002"}],
                    "Nay": [{"id": "S003"}],
                    "VP": ["Vance"]
                }),
                json!({"amendment": {"type": "s", "number": 12}}),
            ),
        );

        self.write_json(
            "118/bills/hr/hr1048/data.json",
            &json!({
                "bill_id": "hr1048-118",
                "amendments": [
                    {"amendment_id": "hamdt1-118"},
                    {"amendment_id": "hamdt2-118"},
                    {"amendment_id": "hamdt3-118"},
                    {"amendment_id": "hamdt4-118"},
                    {"amendment_id": "hamdt5-118"}
                ]
            }),
        );

        self.write_amendment("hamdt2-118", "h", 118, "hamdt", 2);
    }

    pub fn write_amendment(&self, id: &str, chamber: &str, congress: u32, kind: &str, number: u32) {
        self.write_json(
            &format!("{}/amendments/{}/{}{}/data.json", congress, kind, kind, number),
            &json!({
                "amendment_id": id,
                "amends_bill": {"bill_id": "hr1048-118"},
                "sponsor": {"bioguide_id": "A000001"},
                "chamber": chamber,
                "purpose": "To strike section 2.",
                "congress": congress.to_string()
            }),
        );
    }
}

pub fn vote(vote_id: &str, chamber: &str, congress: u32, votes: Value, extra: Value) -> Value {
    let number: i64 = vote_id[1..]
        .split('-')
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap();

    let mut body = json!({
        "vote_id": vote_id,
        "number": number,
        "chamber": chamber,
        "congress": congress,
        "date": "2023-03-01T12:00:00-05:00",
        "result_text": "Agreed to",
        "category": "amendment",
        "votes": votes
    });
    if let (Value::Object(base), Value::Object(extra)) = (&mut body, extra) {
        base.extend(extra);
    }
    body
}

fn write_file(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

/// Every row of the three reconciled tables, for whole-database comparisons
pub async fn snapshot(pool: &SqlitePool) -> Vec<String> {
    let mut rows = Vec::new();

    let amendments: Vec<(String, Option<String>, Option<String>, String, Option<String>, String, String)> =
        sqlx::query_as(
            "SELECT amendment_id, bill_id, sponsor_id, chamber, purpose, congress, source_filename FROM amendments ORDER BY amendment_id",
        )
        .fetch_all(pool)
        .await
        .unwrap();
    rows.extend(amendments.into_iter().map(|r| format!("amendments {:?}", r)));

    let metas: Vec<(String, i64, Option<String>, String, String, String, String, Option<String>, Option<String>, String)> =
        sqlx::query_as(
            "SELECT vote_id, vote_number, bill_id, chamber, date, result, category, nomination_title, amendment_id, source_filename FROM vote_meta ORDER BY vote_id",
        )
        .fetch_all(pool)
        .await
        .unwrap();
    rows.extend(metas.into_iter().map(|r| format!("vote_meta {:?}", r)));

    let votes: Vec<(String, String, String, String)> = sqlx::query_as(
        "SELECT vote_id, legislator_id, position, original_position FROM votes ORDER BY vote_id, legislator_id",
    )
    .fetch_all(pool)
    .await
    .unwrap();
    rows.extend(votes.into_iter().map(|r| format!("votes {:?}", r)));

    rows
}
