//! Source document discovery and concurrent loading
//!
//! Two phases:
//! - Sequential directory traversal under each `{data_dir}/{congress}/`
//! - Parallel read + JSON parse on a bounded worker pool
//!
//! Workers share nothing; each returns one parsed document paired with
//! the path it came from. Any unreadable or malformed file fails the load.

use crate::error::{IngestError, IngestResult};
use futures::stream::{self, StreamExt};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const DOCUMENT_FILE_NAME: &str = "data.json";

/// A discovered document file
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceFile {
    /// Congress number taken from the enclosing directory
    pub congress: u32,
    pub path: PathBuf,
}

/// A parsed document and where it came from
#[derive(Debug, Clone)]
pub struct LoadedDocument<T> {
    pub source: SourceFile,
    pub document: T,
}

/// Document loader
pub struct DocumentLoader {
    data_dir: PathBuf,
    workers: usize,
}

impl DocumentLoader {
    pub fn new(data_dir: impl Into<PathBuf>, workers: usize) -> Self {
        Self {
            data_dir: data_dir.into(),
            workers: workers.max(1),
        }
    }

    /// Vote documents: `{congress}/votes/**/data.json`
    pub fn discover_votes(&self) -> IngestResult<Vec<SourceFile>> {
        self.discover("votes", None)
    }

    /// Amendment documents: `{congress}/amendments/{type}/{type}{number}/data.json`
    pub fn discover_amendments(&self) -> IngestResult<Vec<SourceFile>> {
        self.discover("amendments", Some(3))
    }

    /// Walk `{congress}/{collection}` for every congress directory
    ///
    /// `depth` pins the data file's depth below the collection directory;
    /// `None` accepts any depth.
    fn discover(&self, collection: &str, depth: Option<usize>) -> IngestResult<Vec<SourceFile>> {
        let mut files = Vec::new();

        for (congress, congress_dir) in congress_dirs(&self.data_dir)? {
            let root = congress_dir.join(collection);
            if !root.is_dir() {
                tracing::debug!("No {} directory for congress {}", collection, congress);
                continue;
            }

            let mut walker = WalkDir::new(&root).follow_links(false);
            if let Some(depth) = depth {
                walker = walker.min_depth(depth).max_depth(depth);
            }

            for entry in walker {
                match entry {
                    Ok(entry) => {
                        if entry.file_type().is_file() && entry.file_name() == DOCUMENT_FILE_NAME {
                            files.push(SourceFile {
                                congress,
                                path: entry.into_path(),
                            });
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Error accessing entry: {}", e);
                        // Continue scanning, don't abort
                    }
                }
            }
        }

        files.sort();

        tracing::debug!(
            collection,
            count = files.len(),
            "Discovered {} documents",
            collection
        );

        Ok(files)
    }

    /// Read and parse every file with at most `workers` reads in flight
    ///
    /// Results come back sorted by path so downstream processing sees a
    /// stable document order regardless of completion order.
    pub async fn load_all<T>(&self, files: Vec<SourceFile>) -> IngestResult<Vec<LoadedDocument<T>>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let total = files.len();

        let results: Vec<IngestResult<LoadedDocument<T>>> = stream::iter(files)
            .map(|source| async move {
                tokio::task::spawn_blocking(move || read_document::<T>(source)).await?
            })
            .buffer_unordered(self.workers)
            .collect()
            .await;

        let mut documents = results.into_iter().collect::<IngestResult<Vec<_>>>()?;
        documents.sort_by(|a, b| a.source.cmp(&b.source));

        tracing::info!(
            total,
            workers = self.workers,
            "Loaded {} documents",
            documents.len()
        );

        Ok(documents)
    }
}

/// Numeric top-level directories of the data root, ascending
fn congress_dirs(data_dir: &Path) -> IngestResult<Vec<(u32, PathBuf)>> {
    let entries = std::fs::read_dir(data_dir).map_err(|source| IngestError::Io {
        path: data_dir.to_path_buf(),
        source,
    })?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| IngestError::Io {
            path: data_dir.to_path_buf(),
            source,
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        if !entry.path().is_dir() {
            continue;
        }
        if let Ok(congress) = name.parse::<u32>() {
            dirs.push((congress, entry.path()));
        }
    }

    dirs.sort();
    Ok(dirs)
}

/// Read one JSON document from disk
pub fn read_document<T: DeserializeOwned>(source: SourceFile) -> IngestResult<LoadedDocument<T>> {
    let bytes = std::fs::read(&source.path).map_err(|e| IngestError::Io {
        path: source.path.clone(),
        source: e,
    })?;
    let document = serde_json::from_slice(&bytes).map_err(|e| IngestError::Json {
        path: source.path.clone(),
        source: e,
    })?;
    Ok(LoadedDocument { source, document })
}
