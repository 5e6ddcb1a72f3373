//! Read-only access to the scraped data tree
//!
//! Layout under the data root:
//! - `{congress}/bills/{type}/{type}{number}/data.json`
//! - `{congress}/amendments/{chamber}amdt/{chamber}amdt{number}/data.json`
//!
//! The amendment directory is named by amendment type (`hamdt` or `samdt`),
//! as the scraper writes it. A tree laid out as
//! `amendments/{chamber}/...` (`amendments/h/hamdt3`) is not recognized:
//! every existence check misses and each referenced amendment gets a
//! placeholder.
//!
//! The amendment resolver only sees the traits below, so tests can hand
//! it in-memory bill data instead of a directory tree.

use crate::models::{BillAmendmentEntry, BillDocument};
use rollcall_common::db::AmendmentId;
use std::path::{Path, PathBuf};

/// Natural key of a bill document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BillKey {
    /// Lowercase bill type (`hr`, `s`, `hjres`, ...)
    pub bill_type: String,
    pub number: u32,
    pub congress: u32,
}

impl BillKey {
    pub fn new(bill_type: &str, number: u32, congress: u32) -> Self {
        Self {
            bill_type: bill_type.trim().to_ascii_lowercase(),
            number,
            congress,
        }
    }
}

/// Lookup of a bill's own amendment list
pub trait BillAmendmentLookup {
    /// The bill's `amendments` list, oldest first
    ///
    /// `None` when the bill document is absent or unreadable.
    fn bill_amendments(&self, bill: &BillKey) -> Option<Vec<BillAmendmentEntry>>;
}

/// Existence check for amendment data files
pub trait AmendmentArchive {
    fn has_amendment(&self, id: &AmendmentId) -> bool;
}

/// Provenance names for files under the data root
pub trait Provenance {
    /// `path` relative to the data root with forward slashes
    fn relative_name(&self, path: &Path) -> String;
}

/// The on-disk data tree
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bill_path(&self, bill: &BillKey) -> PathBuf {
        self.root
            .join(bill.congress.to_string())
            .join("bills")
            .join(&bill.bill_type)
            .join(format!("{}{}", bill.bill_type, bill.number))
            .join("data.json")
    }

    pub fn amendment_path(&self, id: &AmendmentId) -> PathBuf {
        let amendment_type = format!("{}amdt", id.chamber.code());
        self.root
            .join(id.congress.to_string())
            .join("amendments")
            .join(&amendment_type)
            .join(format!("{}{}", amendment_type, id.number))
            .join("data.json")
    }
}

/// `path` relative to `root` with forward slashes; unrelated paths are kept whole
pub fn relative_name(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

impl<T: BillAmendmentLookup + ?Sized> BillAmendmentLookup for &T {
    fn bill_amendments(&self, bill: &BillKey) -> Option<Vec<BillAmendmentEntry>> {
        (**self).bill_amendments(bill)
    }
}

impl<T: AmendmentArchive + ?Sized> AmendmentArchive for &T {
    fn has_amendment(&self, id: &AmendmentId) -> bool {
        (**self).has_amendment(id)
    }
}

impl<T: Provenance + ?Sized> Provenance for &T {
    fn relative_name(&self, path: &Path) -> String {
        (**self).relative_name(path)
    }
}

impl Provenance for DataDir {
    fn relative_name(&self, path: &Path) -> String {
        relative_name(&self.root, path)
    }
}

impl BillAmendmentLookup for DataDir {
    fn bill_amendments(&self, bill: &BillKey) -> Option<Vec<BillAmendmentEntry>> {
        let path = self.bill_path(bill);

        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Bill document not on disk");
                return None;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Cannot read bill document");
                return None;
            }
        };

        match serde_json::from_slice::<BillDocument>(&bytes) {
            Ok(doc) => doc.amendments,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Malformed bill document");
                None
            }
        }
    }
}

impl AmendmentArchive for DataDir {
    fn has_amendment(&self, id: &AmendmentId) -> bool {
        self.amendment_path(id).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_common::db::Chamber;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_layout_paths() {
        let data = DataDir::new("/data");

        assert_eq!(
            data.bill_path(&BillKey::new("HR", 1048, 118)),
            PathBuf::from("/data/118/bills/hr/hr1048/data.json")
        );
        assert_eq!(
            data.amendment_path(&AmendmentId::new(Chamber::Senate, 12, 119)),
            PathBuf::from("/data/119/amendments/samdt/samdt12/data.json")
        );
        assert_eq!(
            data.relative_name(Path::new("/data/118/votes/2023/h1/data.json")),
            "118/votes/2023/h1/data.json"
        );
    }

    #[test]
    fn test_bill_amendments_from_disk() {
        let dir = TempDir::new().unwrap();
        let data = DataDir::new(dir.path());
        let key = BillKey::new("hr", 1048, 118);

        assert!(data.bill_amendments(&key).is_none());

        let path = data.bill_path(&key);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            r#"{"bill_id": "hr1048-118", "amendments": [{"amendment_id": "hamdt1-118"}, {"amendment_id": "hamdt9-118"}]}"#,
        )
        .unwrap();

        let entries = data.bill_amendments(&key).unwrap();
        let ids: Vec<_> = entries.iter().map(|e| e.amendment_id.as_deref()).collect();
        assert_eq!(ids, vec![Some("hamdt1-118"), Some("hamdt9-118")]);

        fs::write(&path, "{not json").unwrap();
        assert!(data.bill_amendments(&key).is_none());
    }

    #[test]
    fn test_has_amendment_checks_data_file() {
        let dir = TempDir::new().unwrap();
        let data = DataDir::new(dir.path());
        let id = AmendmentId::new(Chamber::House, 3, 118);

        assert!(!data.has_amendment(&id));

        let path = data.amendment_path(&id);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{}").unwrap();

        assert!(data.has_amendment(&id));
    }

    #[test]
    fn test_chamber_named_amendment_dir_is_not_found() {
        let dir = TempDir::new().unwrap();
        let data = DataDir::new(dir.path());
        let id = AmendmentId::new(Chamber::House, 3, 118);

        let path = dir.path().join("118/amendments/h/hamdt3/data.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{}").unwrap();

        assert!(!data.has_amendment(&id));
        assert_eq!(
            data.relative_name(&data.amendment_path(&id)),
            "118/amendments/hamdt/hamdt3/data.json"
        );
    }
}
