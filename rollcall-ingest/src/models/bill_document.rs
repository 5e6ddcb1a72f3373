//! Bill document (`{congress}/bills/{type}/{type}{number}/data.json`)
//!
//! Only the amendment list is read; it is consulted when a vote cites an
//! amendment by its ordinal position on the bill.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BillDocument {
    pub bill_id: Option<String>,
    /// Oldest first, as written by the scraper
    #[serde(default)]
    pub amendments: Option<Vec<BillAmendmentEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BillAmendmentEntry {
    pub amendment_id: Option<String>,
}
