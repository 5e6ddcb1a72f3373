//! rollcall-ingest library interface
//!
//! Loads scraped roll-call vote and amendment documents into SQLite,
//! reconciling each vote with the amendment it was taken on.

pub mod db;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;

pub use crate::error::{IngestError, IngestResult};
pub use crate::pipeline::{run_ingest, IngestSettings, RunReport};
