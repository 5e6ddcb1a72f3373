//! Full ingestion run: amendment pass, vote reconciliation, site stamp

use crate::db;
use crate::error::{IngestError, IngestResult};
use crate::models::{AmendmentIngestSummary, ReconcileSummary};
use crate::services::{AmendmentIngest, DataDir, Reconciler, ResponseAliases, ResponseNormalizer, UpsertEngine};
use chrono::Utc;
use rollcall_common::config::{validate_ingest_limits, TomlConfig, DEFAULT_DATA_DIR};
use serde::Serialize;
use sqlx::SqlitePool;
use std::path::PathBuf;
use tracing::info;

/// Resolved settings for one run
#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub data_dir: PathBuf,
    pub vote_batch_size: usize,
    pub loader_workers: usize,
    pub skip_amendments: bool,
    pub timezone: String,
    pub aliases: ResponseAliases,
}

impl IngestSettings {
    /// Settings from the TOML layer; callers apply command-line overrides on top
    pub fn from_config(config: &TomlConfig) -> IngestResult<Self> {
        let aliases = ResponseAliases::builtin().with_overrides(&config.responses.aliases)?;

        Ok(Self {
            data_dir: config
                .data_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            vote_batch_size: config.ingest.vote_batch_size,
            loader_workers: config.ingest.loader_workers,
            skip_amendments: config.ingest.skip_amendments,
            timezone: config.ingest.timezone.clone(),
            aliases,
        })
    }

    /// Limits are checked again here because command-line overrides bypass the TOML layer
    pub fn validate(&self) -> IngestResult<()> {
        validate_ingest_limits(self.vote_batch_size, self.loader_workers)?;
        if !self.data_dir.is_dir() {
            return Err(IngestError::Config(format!(
                "data directory does not exist: {}",
                self.data_dir.display()
            )));
        }
        Ok(())
    }
}

/// What one run did
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Absent when the amendment pass was skipped
    pub amendments: Option<AmendmentIngestSummary>,
    pub votes: ReconcileSummary,
}

/// Run every pass against an initialized database
pub async fn run_ingest(pool: &SqlitePool, settings: &IngestSettings) -> IngestResult<RunReport> {
    settings.validate()?;

    let data = DataDir::new(&settings.data_dir);
    let engine = UpsertEngine::new(pool.clone(), settings.vote_batch_size);

    let amendments = if settings.skip_amendments {
        info!("Skipping amendment pass");
        None
    } else {
        let ingest = AmendmentIngest::new(data.clone(), settings.loader_workers, engine.clone());
        Some(ingest.run().await?)
    };

    let reconciler = Reconciler::new(
        data,
        settings.loader_workers,
        ResponseNormalizer::new(settings.aliases.clone()),
        engine,
    );
    let votes = reconciler.run().await?;

    db::site_meta::record_update(pool, Utc::now(), &settings.timezone).await?;

    Ok(RunReport { amendments, votes })
}
