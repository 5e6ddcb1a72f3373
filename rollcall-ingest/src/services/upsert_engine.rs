//! Batched, idempotent persistence of staged rows
//!
//! Two commit phases, each with its own unit of work:
//! - **Metadata**: amendments and vote_meta rows in one transaction, each
//!   record in its own savepoint so an integrity violation drops only that
//!   record.
//! - **Votes**: fixed-size batches, one transaction and one multi-row upsert
//!   per batch. A failed batch is rolled back alone; later batches are still
//!   attempted.
//!
//! Non-integrity database errors abort the phase. Whatever committed before
//! stays durable and a re-run converges because every write is an upsert.

use crate::db::{self, integrity_violation};
use crate::error::IngestResult;
use crate::models::{BatchOutcome, BatchStatus};
use rollcall_common::config::DEFAULT_VOTE_BATCH_SIZE;
use rollcall_common::db::{AmendmentRecord, VoteMetaRecord, VoteRecord};
use sqlx::{Acquire, Sqlite, SqlitePool, Transaction};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// One record of the metadata phase, written in staging order
#[derive(Debug, Clone, PartialEq)]
pub enum StagedWrite {
    Amendment(AmendmentRecord),
    VoteMeta(VoteMetaRecord),
}

impl StagedWrite {
    pub fn key(&self) -> &str {
        match self {
            StagedWrite::Amendment(record) => &record.amendment_id,
            StagedWrite::VoteMeta(record) => &record.vote_id,
        }
    }
}

/// Result of writing a single record inside its savepoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// Integrity violation; the savepoint was rolled back
    Skipped(String),
}

/// Metadata phase totals
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataOutcome {
    pub amendments_written: usize,
    pub amendments_skipped: usize,
    pub vote_meta_written: usize,
    pub vote_meta_skipped: usize,
    /// `vote_id`s whose vote_meta row was rolled back
    pub skipped_vote_ids: HashSet<String>,
}

/// Batch upsert engine
#[derive(Clone)]
pub struct UpsertEngine {
    pool: SqlitePool,
    vote_batch_size: usize,
}

impl UpsertEngine {
    pub fn new(pool: SqlitePool, vote_batch_size: usize) -> Self {
        Self {
            pool,
            vote_batch_size: vote_batch_size.max(1),
        }
    }

    pub fn with_default_batch_size(pool: SqlitePool) -> Self {
        Self::new(pool, DEFAULT_VOTE_BATCH_SIZE)
    }

    /// Write every staged record in order and commit once
    pub async fn commit_metadata(&self, writes: &[StagedWrite]) -> IngestResult<MetadataOutcome> {
        let mut outcome = MetadataOutcome::default();
        let mut tx = self.pool.begin().await?;

        for write in writes {
            let result = write_segment(&mut tx, write).await?;
            match (write, result) {
                (StagedWrite::Amendment(_), WriteOutcome::Written) => outcome.amendments_written += 1,
                (StagedWrite::VoteMeta(_), WriteOutcome::Written) => outcome.vote_meta_written += 1,
                (StagedWrite::Amendment(_), WriteOutcome::Skipped(reason)) => {
                    warn!(amendment_id = write.key(), "Skipping amendment: {}", reason);
                    outcome.amendments_skipped += 1;
                }
                (StagedWrite::VoteMeta(_), WriteOutcome::Skipped(reason)) => {
                    warn!(vote_id = write.key(), "Skipping vote metadata: {}", reason);
                    outcome.vote_meta_skipped += 1;
                    outcome.skipped_vote_ids.insert(write.key().to_string());
                }
            }
        }

        tx.commit().await?;

        info!(
            amendments = outcome.amendments_written,
            vote_meta = outcome.vote_meta_written,
            skipped = outcome.amendments_skipped + outcome.vote_meta_skipped,
            "Metadata phase committed"
        );

        Ok(outcome)
    }

    /// Upsert votes in fixed-size batches, committing after each
    pub async fn commit_votes(&self, votes: &[VoteRecord]) -> IngestResult<Vec<BatchOutcome>> {
        let mut outcomes = Vec::with_capacity(votes.len().div_ceil(self.vote_batch_size));

        for (index, batch) in votes.chunks(self.vote_batch_size).enumerate() {
            let mut tx = self.pool.begin().await?;

            let status = match db::votes::upsert_batch(&mut tx, batch).await {
                Ok(affected) => {
                    tx.commit().await?;
                    debug!(batch = index, rows = batch.len(), affected, "Vote batch committed");
                    BatchStatus::Committed
                }
                Err(e) => match integrity_violation(&e) {
                    Some(reason) => {
                        tx.rollback().await?;
                        warn!(
                            batch = index,
                            rows = batch.len(),
                            "Vote batch rolled back: {}",
                            reason
                        );
                        BatchStatus::RolledBack(reason)
                    }
                    None => return Err(e.into()),
                },
            };

            outcomes.push(BatchOutcome {
                index,
                rows: batch.len(),
                status,
            });
        }

        let committed = outcomes.iter().filter(|b| b.is_committed()).count();
        info!(
            batches = outcomes.len(),
            committed,
            failed = outcomes.len() - committed,
            "Vote phase finished"
        );

        Ok(outcomes)
    }
}

/// Write one record inside a savepoint of `tx`
async fn write_segment(
    tx: &mut Transaction<'_, Sqlite>,
    write: &StagedWrite,
) -> IngestResult<WriteOutcome> {
    let mut savepoint = Acquire::begin(&mut *tx).await?;

    let result = match write {
        StagedWrite::Amendment(record) => db::amendments::upsert(&mut savepoint, record).await,
        StagedWrite::VoteMeta(record) => db::vote_meta::upsert(&mut savepoint, record).await,
    };

    match result {
        Ok(()) => {
            savepoint.commit().await?;
            Ok(WriteOutcome::Written)
        }
        Err(e) => match integrity_violation(&e) {
            Some(reason) => {
                savepoint.rollback().await?;
                Ok(WriteOutcome::Skipped(reason))
            }
            None => Err(e.into()),
        },
    }
}
