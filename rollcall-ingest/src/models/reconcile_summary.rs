//! Run results
//!
//! Recoverable failures (integrity violations) are counted here instead of
//! being raised, so a run report shows exactly what was skipped.

use serde::Serialize;

/// Outcome of one vote batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum BatchStatus {
    Committed,
    /// Integrity violation; the batch was rolled back
    RolledBack(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    /// Zero-based batch position in the run
    pub index: usize,
    pub rows: usize,
    pub status: BatchStatus,
}

impl BatchOutcome {
    pub fn is_committed(&self) -> bool {
        self.status == BatchStatus::Committed
    }
}

/// Vote reconciliation totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub documents_loaded: usize,
    pub vote_meta_written: usize,
    pub vote_meta_skipped: usize,
    pub placeholders_created: usize,
    pub placeholders_skipped: usize,
    pub unresolved_amendments: usize,
    pub votes_staged: usize,
    /// Staged votes whose vote_meta row was skipped; never sent to a batch
    pub votes_dropped: usize,
    pub batches: Vec<BatchOutcome>,
}

impl ReconcileSummary {
    pub fn batches_committed(&self) -> usize {
        self.batches.iter().filter(|b| b.is_committed()).count()
    }

    pub fn batches_failed(&self) -> usize {
        self.batches.len() - self.batches_committed()
    }

    pub fn votes_committed(&self) -> usize {
        self.batches
            .iter()
            .filter(|b| b.is_committed())
            .map(|b| b.rows)
            .sum()
    }
}

/// Amendment ingestion totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AmendmentIngestSummary {
    pub documents_loaded: usize,
    pub written: usize,
    pub skipped: usize,
}
