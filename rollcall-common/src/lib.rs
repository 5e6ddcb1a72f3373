//! # Rollcall Common Library
//!
//! Shared code for the rollcall ingestion tools:
//! - Database initialization and schema
//! - Row models for votes, vote metadata and amendments
//! - Configuration loading
//! - Error types

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
