//! Configuration loading
//!
//! Resolution priority for every setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file (plus optional per-environment overlay)
//! 4. Compiled default (fallback)
//!
//! Levels 1 and 2 are handled by the binaries' argument parsers; this module
//! loads level 3 and supplies level 4.

use crate::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment name that loads the base config file only
pub const DEFAULT_ENVIRONMENT: &str = "prod";

/// Default data root, relative to the working directory
pub const DEFAULT_DATA_DIR: &str = "data";

/// Vote rows per multi-row upsert statement
pub const DEFAULT_VOTE_BATCH_SIZE: usize = 1000;

/// Largest batch whose 4 bound columns per row stay under SQLite's 32766 parameter limit
pub const MAX_VOTE_BATCH_SIZE: usize = 8191;

/// Concurrent document readers
pub const DEFAULT_LOADER_WORKERS: usize = 8;

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Root of the scraped congress data tree
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Path to the SQLite database file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub responses: ResponsesConfig,
}

/// Ingestion tuning
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_vote_batch_size")]
    pub vote_batch_size: usize,

    #[serde(default = "default_loader_workers")]
    pub loader_workers: usize,

    /// Skip the amendment ingestion pass (vote reconciliation still runs)
    #[serde(default)]
    pub skip_amendments: bool,

    /// Timezone name recorded with each site_meta update
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            vote_batch_size: default_vote_batch_size(),
            loader_workers: default_loader_workers(),
            skip_amendments: false,
            timezone: default_timezone(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Extra response aliases merged over the built-in table
///
/// ```toml
/// [responses.aliases]
/// "Guilty" = "Yea"
/// "Not Guilty" = "Nay"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponsesConfig {
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

fn default_vote_batch_size() -> usize {
    DEFAULT_VOTE_BATCH_SIZE
}

fn default_loader_workers() -> usize {
    DEFAULT_LOADER_WORKERS
}

fn default_timezone() -> String {
    "America/New_York".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        validate_ingest_limits(self.ingest.vote_batch_size, self.ingest.loader_workers)
    }
}

/// Limits shared by the TOML layer and command-line overrides
///
/// Batch sizes must be non-zero and fit SQLite's bound-parameter limit; at
/// least one loader worker is required.
pub fn validate_ingest_limits(vote_batch_size: usize, loader_workers: usize) -> Result<()> {
    if vote_batch_size == 0 || vote_batch_size > MAX_VOTE_BATCH_SIZE {
        return Err(Error::Config(format!(
            "vote batch size must be between 1 and {}, got {}",
            MAX_VOTE_BATCH_SIZE, vote_batch_size
        )));
    }
    if loader_workers == 0 {
        return Err(Error::Config("loader workers must be at least 1".to_string()));
    }
    Ok(())
}

/// Load configuration for the given environment
///
/// An explicitly requested file must exist. When no file is given the
/// platform locations are tried and, if none exists, compiled defaults are
/// used with a warning rather than failing startup.
pub fn load_config(explicit: Option<&Path>, environment: &str) -> Result<TomlConfig> {
    let base_path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) => path,
            None => {
                warn!("No config file found, using built-in defaults");
                let config = TomlConfig::default();
                config.validate()?;
                return Ok(config);
            }
        },
    };

    let mut value = read_toml(&base_path)?;
    info!("Loaded config file: {}", base_path.display());

    if environment != DEFAULT_ENVIRONMENT {
        let overlay = overlay_path(&base_path, environment);
        if overlay.exists() {
            merge_tables(&mut value, read_toml(&overlay)?);
            info!("Applied '{}' overlay: {}", environment, overlay.display());
        } else {
            warn!(
                "No overlay for environment '{}' at {}",
                environment,
                overlay.display()
            );
        }
    }

    let config: TomlConfig = value.try_into().map_err(|source| Error::Toml {
        path: base_path.clone(),
        source,
    })?;
    config.validate()?;

    Ok(config)
}

/// `config.toml` + `test` → `config.test.toml` in the same directory
pub fn overlay_path(base: &Path, environment: &str) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "config".to_string());
    base.with_file_name(format!("{}.{}.toml", stem, environment))
}

/// First existing platform config file
///
/// Tries `~/.config/rollcall/config.toml` then `/etc/rollcall/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("rollcall").join("config.toml"));
    let system_config = PathBuf::from("/etc/rollcall/config.toml");

    user_config
        .into_iter()
        .chain(std::iter::once(system_config))
        .find(|p| p.exists())
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("rollcall").join("rollcall.db"))
        .unwrap_or_else(|| PathBuf::from("rollcall.db"))
}

fn read_toml(path: &Path) -> Result<toml::Value> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|source| Error::Toml {
        path: path.to_path_buf(),
        source,
    })
}

/// Overlay wins key by key; nested tables merge recursively
fn merge_tables(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_tables(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
