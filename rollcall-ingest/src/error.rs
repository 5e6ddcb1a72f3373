//! Error types for rollcall-ingest
//!
//! Everything in [`IngestError`] is fatal for a run. Recoverable conditions
//! (unresolvable amendment references, integrity violations on a single
//! record or batch) are reported as values by the services that hit them.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal ingestion error
#[derive(Debug, Error)]
pub enum IngestError {
    /// rollcall-common error
    #[error(transparent)]
    Common(#[from] rollcall_common::Error),

    /// Database error that is not a per-record integrity violation
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Source file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source file is not valid JSON for the expected document shape
    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Required field missing or unparseable
    #[error("Malformed document {path}: {reason}")]
    MalformedDocument { path: PathBuf, reason: String },

    /// A loader worker panicked or was cancelled
    #[error("Loader worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    /// Invalid runtime configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl IngestError {
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        IngestError::MalformedDocument {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for ingestion operations
pub type IngestResult<T> = Result<T, IngestError>;
