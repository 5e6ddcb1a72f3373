//! Amendment ingestion pass
//!
//! Loads every amendment data file under the data root and upserts it by
//! `amendment_id`. Placeholders written by earlier vote runs share the key,
//! so they are replaced in place once the real file has been downloaded.

use super::document_loader::{DocumentLoader, LoadedDocument};
use super::source_archive::{DataDir, Provenance};
use super::upsert_engine::{StagedWrite, UpsertEngine};
use crate::error::{IngestError, IngestResult};
use crate::models::{AmendmentDocument, AmendmentIngestSummary};
use rollcall_common::db::AmendmentRecord;
use tracing::info;

/// Amendment ingestion service
pub struct AmendmentIngest {
    data: DataDir,
    workers: usize,
    engine: UpsertEngine,
}

impl AmendmentIngest {
    pub fn new(data: DataDir, workers: usize, engine: UpsertEngine) -> Self {
        Self {
            data,
            workers,
            engine,
        }
    }

    pub async fn run(&self) -> IngestResult<AmendmentIngestSummary> {
        let loader = DocumentLoader::new(self.data.root(), self.workers);
        let files = loader.discover_amendments()?;
        info!("Found {} amendment documents", files.len());

        let documents = loader.load_all::<AmendmentDocument>(files).await?;

        let writes = documents
            .iter()
            .map(|loaded| self.amendment_record(loaded).map(StagedWrite::Amendment))
            .collect::<IngestResult<Vec<_>>>()?;

        let outcome = self.engine.commit_metadata(&writes).await?;

        let summary = AmendmentIngestSummary {
            documents_loaded: documents.len(),
            written: outcome.amendments_written,
            skipped: outcome.amendments_skipped,
        };
        info!(
            written = summary.written,
            skipped = summary.skipped,
            "Amendment pass complete"
        );

        Ok(summary)
    }

    fn amendment_record(&self, loaded: &LoadedDocument<AmendmentDocument>) -> IngestResult<AmendmentRecord> {
        let path = &loaded.source.path;
        let doc = &loaded.document;

        let amendment_id = non_blank(doc.amendment_id.as_deref())
            .ok_or_else(|| IngestError::malformed(path, "missing amendment_id"))?;
        let chamber = non_blank(doc.chamber.as_deref())
            .ok_or_else(|| IngestError::malformed(path, "missing chamber"))?;
        let congress = doc
            .congress
            .as_ref()
            .map(|c| c.to_string())
            .and_then(|c| non_blank(Some(c.as_str())))
            .ok_or_else(|| IngestError::malformed(path, "missing congress"))?;

        Ok(AmendmentRecord {
            amendment_id,
            bill_id: doc.amends_bill.as_ref().and_then(|b| b.bill_id.clone()),
            sponsor_id: doc.sponsor.as_ref().and_then(|s| s.bioguide_id.clone()),
            chamber,
            purpose: doc.purpose.clone(),
            congress,
            source_filename: self.data.relative_name(path),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
