//! Vote reconciliation run
//!
//! # Phases
//! LOADING → STAGING → METADATA → VOTES
//!
//! - **LOADING**: discover vote documents and parse them on the loader pool
//! - **STAGING**: resolve amendments and normalize responses, one document
//!   at a time so placeholder synthesis never races
//! - **METADATA**: placeholders and vote_meta rows, one commit
//! - **VOTES**: legislator votes in fixed-size batches, one commit each.
//!   Votes of a skipped vote_meta row are dropped first, since they would
//!   fail the foreign key check and roll back their whole batch.

use super::document_loader::DocumentLoader;
use super::response_normalizer::ResponseNormalizer;
use super::source_archive::DataDir;
use super::upsert_engine::UpsertEngine;
use super::vote_stager::VoteStager;
use crate::error::IngestResult;
use crate::models::{ReconcileSummary, VoteDocument};
use rollcall_common::db::VoteRecord;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{info, warn};

/// Reconciliation orchestrator
pub struct Reconciler {
    data: DataDir,
    workers: usize,
    normalizer: ResponseNormalizer,
    engine: UpsertEngine,
}

impl Reconciler {
    pub fn new(data: DataDir, workers: usize, normalizer: ResponseNormalizer, engine: UpsertEngine) -> Self {
        Self {
            data,
            workers,
            normalizer,
            engine,
        }
    }

    pub async fn run(&self) -> IngestResult<ReconcileSummary> {
        let start = Instant::now();

        // LOADING
        let loader = DocumentLoader::new(self.data.root(), self.workers);
        let files = loader.discover_votes()?;
        info!("Found {} vote documents", files.len());
        let documents = loader.load_all::<VoteDocument>(files).await?;

        // STAGING (filesystem lookups, kept off the async workers)
        let stager = VoteStager::new(self.data.clone(), self.normalizer.clone());
        let staged = tokio::task::spawn_blocking(move || stager.stage(&documents)).await??;

        // METADATA
        let metadata = self.engine.commit_metadata(&staged.writes).await?;

        // VOTES
        let votes_staged = staged.votes.len();
        let (votes, votes_dropped) = drop_orphaned_votes(staged.votes, &metadata.skipped_vote_ids);
        if votes_dropped > 0 {
            warn!(
                dropped = votes_dropped,
                vote_meta_skipped = metadata.vote_meta_skipped,
                "Dropping votes whose vote metadata was not stored"
            );
        }
        let batches = self.engine.commit_votes(&votes).await?;

        let summary = ReconcileSummary {
            documents_loaded: staged.documents,
            vote_meta_written: metadata.vote_meta_written,
            vote_meta_skipped: metadata.vote_meta_skipped,
            placeholders_created: metadata.amendments_written,
            placeholders_skipped: metadata.amendments_skipped,
            unresolved_amendments: staged.unresolved_amendments,
            votes_staged,
            votes_dropped,
            batches,
        };

        info!(
            documents = summary.documents_loaded,
            vote_meta = summary.vote_meta_written,
            placeholders = summary.placeholders_created,
            votes = summary.votes_committed(),
            dropped = summary.votes_dropped,
            failed_batches = summary.batches_failed(),
            "Reconciliation complete in {:.2}s",
            start.elapsed().as_secs_f64()
        );

        Ok(summary)
    }
}

/// Split off votes whose `vote_id` is in `skipped`; returns the rest and the dropped count
fn drop_orphaned_votes(votes: Vec<VoteRecord>, skipped: &HashSet<String>) -> (Vec<VoteRecord>, usize) {
    if skipped.is_empty() {
        return (votes, 0);
    }
    let total = votes.len();
    let kept: Vec<VoteRecord> = votes
        .into_iter()
        .filter(|vote| !skipped.contains(&vote.vote_id))
        .collect();
    let dropped = total - kept.len();
    (kept, dropped)
}
