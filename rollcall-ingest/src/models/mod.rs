//! Source document shapes and run summaries
//!
//! The document structs mirror the JSON written by the congress data
//! scraper. Fields the pipeline requires are still `Option` here; staging
//! decides whether a missing value is fatal.

pub mod amendment_document;
pub mod bill_document;
pub mod reconcile_summary;
pub mod vote_document;

pub use amendment_document::AmendmentDocument;
pub use bill_document::{BillAmendmentEntry, BillDocument};
pub use reconcile_summary::{AmendmentIngestSummary, BatchOutcome, BatchStatus, ReconcileSummary};
pub use vote_document::{AmendmentReference, BillReference, IdToken, NominationReference, VoteDocument};
