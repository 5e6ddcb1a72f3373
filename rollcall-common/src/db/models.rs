//! Database models
//!
//! Row types for the `vote_meta`, `votes` and `amendments` tables plus the
//! small value types (chamber, canonical position, amendment identifier)
//! shared by the loaders and repositories.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sponsor id written into placeholder amendments
pub const PLACEHOLDER_SPONSOR_ID: &str = "UNKNOWN";

/// Purpose text marking an amendment row as awaiting its real data file
pub const PLACEHOLDER_PURPOSE: &str = "[PLACEHOLDER] Amendment datafile not yet downloaded.";

/// Source marker for placeholder amendments (not a filesystem path)
pub const PLACEHOLDER_SOURCE: &str = "na";

/// Legislative chamber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chamber {
    #[serde(rename = "h")]
    House,
    #[serde(rename = "s")]
    Senate,
}

impl Chamber {
    /// Single-letter code used in identifiers and stored in the database
    pub fn code(&self) -> &'static str {
        match self {
            Chamber::House => "h",
            Chamber::Senate => "s",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "h" => Some(Chamber::House),
            "s" => Some(Chamber::Senate),
            _ => None,
        }
    }
}

impl fmt::Display for Chamber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Canonical vote response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Yea,
    Nay,
    Present,
    NotVoting,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::Yea,
        Position::Nay,
        Position::Present,
        Position::NotVoting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Yea => "Yea",
            Position::Nay => "Nay",
            Position::Present => "Present",
            Position::NotVoting => "Not Voting",
        }
    }

    /// Parse one of the four canonical tokens (exact match)
    pub fn from_canonical(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == token)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical amendment identifier, e.g. `samdt12-119`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AmendmentId {
    pub chamber: Chamber,
    pub number: u32,
    pub congress: u32,
}

impl AmendmentId {
    pub fn new(chamber: Chamber, number: u32, congress: u32) -> Self {
        Self {
            chamber,
            number,
            congress,
        }
    }
}

impl fmt::Display for AmendmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}amdt{}-{}", self.chamber, self.number, self.congress)
    }
}

impl FromStr for AmendmentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidInput(format!("not an amendment id: {:?}", s));

        let (head, congress) = s.split_once('-').ok_or_else(invalid)?;
        let (chamber, number) = head.split_once("amdt").ok_or_else(invalid)?;

        let chamber = Chamber::from_code(chamber).ok_or_else(invalid)?;
        let number = number.parse::<u32>().map_err(|_| invalid())?;
        let congress = congress.parse::<u32>().map_err(|_| invalid())?;

        Ok(Self::new(chamber, number, congress))
    }
}

/// One row of `vote_meta`
#[derive(Debug, Clone, PartialEq)]
pub struct VoteMetaRecord {
    pub vote_id: String,
    pub vote_number: i64,
    pub bill_id: Option<String>,
    pub chamber: Chamber,
    pub date: DateTime<Utc>,
    pub result: String,
    pub category: String,
    pub nomination_title: Option<String>,
    pub amendment_id: Option<String>,
    pub source_filename: String,
}

/// One row of `votes`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRecord {
    pub vote_id: String,
    pub legislator_id: String,
    /// Normalized response (canonical unless the raw token had no alias)
    pub position: String,
    /// Raw response token exactly as read from the source document
    pub original_position: String,
}

/// One row of `amendments`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmendmentRecord {
    pub amendment_id: String,
    pub bill_id: Option<String>,
    pub sponsor_id: Option<String>,
    pub chamber: String,
    pub purpose: Option<String>,
    pub congress: String,
    pub source_filename: String,
}

impl AmendmentRecord {
    /// Minimal row standing in for an amendment whose data file is not on disk yet
    pub fn placeholder(id: &AmendmentId, bill_id: Option<String>) -> Self {
        Self {
            amendment_id: id.to_string(),
            bill_id,
            sponsor_id: Some(PLACEHOLDER_SPONSOR_ID.to_string()),
            chamber: id.chamber.code().to_string(),
            purpose: Some(PLACEHOLDER_PURPOSE.to_string()),
            congress: id.congress.to_string(),
            source_filename: PLACEHOLDER_SOURCE.to_string(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.source_filename == PLACEHOLDER_SOURCE
            && self.purpose.as_deref() == Some(PLACEHOLDER_PURPOSE)
    }
}
