//! Vote document (`{congress}/votes/{year}/{vote}/data.json`)

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Identifier component that the scraper writes as either a number or a string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IdToken {
    Number(u64),
    Text(String),
}

impl IdToken {
    /// Numeric value, accepting numeric strings
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            IdToken::Number(n) => u32::try_from(*n).ok(),
            IdToken::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for IdToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdToken::Number(n) => write!(f, "{}", n),
            IdToken::Text(s) => f.write_str(s.trim()),
        }
    }
}

/// One recorded roll-call vote
#[derive(Debug, Clone, Deserialize)]
pub struct VoteDocument {
    pub vote_id: Option<String>,
    pub number: Option<i64>,
    pub chamber: Option<String>,
    pub congress: Option<IdToken>,
    pub date: Option<String>,
    pub result_text: Option<String>,
    pub category: Option<String>,
    pub bill: Option<BillReference>,
    /// Present (even if empty) only on nomination votes
    pub nomination: Option<NominationReference>,
    pub amendment: Option<AmendmentReference>,
    /// Response token → voters. Only object entries are legislators; other
    /// shapes (e.g. the Vice President's tie-breaker string) are ignored.
    #[serde(default)]
    pub votes: BTreeMap<String, Vec<Value>>,
}

/// Bill the vote was taken on
#[derive(Debug, Clone, Deserialize)]
pub struct BillReference {
    #[serde(rename = "type")]
    pub bill_type: Option<String>,
    pub number: Option<IdToken>,
    pub congress: Option<IdToken>,
}

impl BillReference {
    /// `hr1048-118` style bill id, when every component is present
    pub fn bill_id(&self) -> Option<String> {
        let bill_type = self.bill_type.as_deref()?.trim();
        let number = self.number.as_ref()?;
        let congress = self.congress.as_ref()?;
        Some(format!("{}{}-{}", bill_type, number, congress))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NominationReference {
    pub title: Option<String>,
}

/// Amendment the vote was taken on
#[derive(Debug, Clone, Deserialize)]
pub struct AmendmentReference {
    /// `s`, `h`, or `h-bill` (ordinal position on the vote's bill)
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub number: Option<IdToken>,
}
