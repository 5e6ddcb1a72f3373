//! Ingestion services
//!
//! Leaf-first:
//! - [`document_loader`]: discover and concurrently parse data files
//! - [`response_normalizer`]: raw response token → canonical position
//! - [`source_archive`]: bill and amendment files on disk
//! - [`amendment_resolver`]: vote amendment reference → amendment id
//! - [`vote_stager`]: documents → staged rows
//! - [`upsert_engine`]: savepointed metadata phase and batched vote phase
//! - [`reconciler`] and [`amendment_ingest`]: the two run passes

pub mod amendment_ingest;
pub mod amendment_resolver;
pub mod document_loader;
pub mod reconciler;
pub mod response_normalizer;
pub mod source_archive;
pub mod upsert_engine;
pub mod vote_stager;

pub use amendment_ingest::AmendmentIngest;
pub use amendment_resolver::{AmendmentResolver, Resolution};
pub use document_loader::{DocumentLoader, LoadedDocument, SourceFile};
pub use reconciler::Reconciler;
pub use response_normalizer::{NormalizedResponse, ResponseAliases, ResponseNormalizer};
pub use source_archive::{AmendmentArchive, BillAmendmentLookup, BillKey, DataDir, Provenance};
pub use upsert_engine::{MetadataOutcome, StagedWrite, UpsertEngine, WriteOutcome};
pub use vote_stager::{StagedRun, VoteStager};
