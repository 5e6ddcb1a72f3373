//! rollcall-ingest - roll-call vote ingestion
//!
//! Loads the scraped congress data tree (votes, amendments) into SQLite.
//!
//! ```text
//! rollcall-ingest [run]                 # amendment pass + vote reconciliation
//! rollcall-ingest count [--congress N]  # vote_meta rows, optionally per congress
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rollcall_common::config::{default_database_path, load_config, DEFAULT_ENVIRONMENT};
use rollcall_common::db::init_database;
use rollcall_ingest::{db, run_ingest, IngestSettings};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "rollcall-ingest")]
#[command(about = "Load roll-call votes and amendments into SQLite")]
#[command(version)]
struct Args {
    /// Root of the scraped congress data tree
    #[arg(long, global = true, env = "ROLLCALL_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, global = true, env = "ROLLCALL_DATABASE")]
    database: Option<PathBuf>,

    /// TOML config file (default: ~/.config/rollcall/config.toml)
    #[arg(long, global = true, env = "ROLLCALL_CONFIG")]
    config: Option<PathBuf>,

    /// Config overlay to apply (config.<environment>.toml)
    #[arg(long, global = true, env = "ROLLCALL_ENV", default_value = DEFAULT_ENVIRONMENT)]
    environment: String,

    /// Vote rows per batch
    #[arg(long, global = true, env = "ROLLCALL_BATCH_SIZE")]
    batch_size: Option<usize>,

    /// Concurrent document readers
    #[arg(long, global = true, env = "ROLLCALL_WORKERS")]
    workers: Option<usize>,

    /// Skip the amendment ingestion pass
    #[arg(long, global = true, env = "ROLLCALL_SKIP_AMENDMENTS")]
    skip_amendments: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest amendments and votes (default)
    Run,
    /// Print the number of stored votes
    Count {
        /// Only votes of this congress
        #[arg(long)]
        congress: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing starts so its log level can seed the filter
    let config_result = load_config(args.config.as_deref(), &args.environment);
    let level = config_result
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    info!(
        "Starting rollcall-ingest v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = config_result.context("Failed to load configuration")?;

    let mut settings = IngestSettings::from_config(&config)?;
    if let Some(data_dir) = args.data_dir {
        settings.data_dir = data_dir;
    }
    if let Some(batch_size) = args.batch_size {
        settings.vote_batch_size = batch_size;
    }
    if let Some(workers) = args.workers {
        settings.loader_workers = workers;
    }
    settings.skip_amendments |= args.skip_amendments;

    let db_path = args
        .database
        .or(config.database_path)
        .unwrap_or_else(default_database_path);
    info!("Database: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    match args.command.unwrap_or(Command::Run) {
        Command::Run => {
            info!("Data directory: {}", settings.data_dir.display());

            let report = run_ingest(&pool, &settings).await.context("Ingestion failed")?;

            if let Some(amendments) = &report.amendments {
                info!(
                    "Amendments: {} loaded, {} written, {} skipped",
                    amendments.documents_loaded, amendments.written, amendments.skipped
                );
            }
            let votes = &report.votes;
            info!(
                "Votes: {} documents, {} metadata rows ({} skipped), {} placeholders, {} unresolved amendment references",
                votes.documents_loaded,
                votes.vote_meta_written,
                votes.vote_meta_skipped,
                votes.placeholders_created,
                votes.unresolved_amendments
            );
            info!(
                "Vote rows: {} staged, {} dropped, {} committed in {} batches ({} failed)",
                votes.votes_staged,
                votes.votes_dropped,
                votes.votes_committed(),
                votes.batches_committed(),
                votes.batches_failed()
            );

            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Count { congress } => {
            let count = db::vote_meta::count(&pool, congress).await?;
            println!("{}", count);
        }
    }

    pool.close().await;

    Ok(())
}
