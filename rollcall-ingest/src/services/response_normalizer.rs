//! Vote response normalization
//!
//! Maps the many response spellings found in roll-call records onto the
//! canonical vocabulary {Yea, Nay, Present, Not Voting}. The alias table is
//! an immutable value handed to the normalizer, so tests and configuration
//! can supply their own.

use rollcall_common::db::Position;
use rollcall_common::{Error, Result};
use std::collections::{BTreeMap, HashMap};

/// Non-canonical token → canonical position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseAliases {
    table: HashMap<String, Position>,
}

impl ResponseAliases {
    pub fn new(table: HashMap<String, Position>) -> Self {
        Self { table }
    }

    /// Built-in aliases
    ///
    /// The 118th Congress speaker election recorded candidate names as
    /// responses: Johnson (LA) counts as Yea, Jeffries as Nay, and the
    /// Emmer write-in as Present.
    pub fn builtin() -> Self {
        let table = [
            ("Aye", Position::Yea),
            ("No", Position::Nay),
            ("Emmer", Position::Present),
            ("Johnson (LA)", Position::Yea),
            ("Jeffries", Position::Nay),
        ]
        .into_iter()
        .map(|(token, position)| (token.to_string(), position))
        .collect();

        Self { table }
    }

    /// Return a copy with `extra` entries added (overriding on collision)
    ///
    /// Values must be canonical tokens; anything else is a config error.
    pub fn with_overrides(&self, extra: &BTreeMap<String, String>) -> Result<Self> {
        let mut table = self.table.clone();
        for (token, target) in extra {
            let position = Position::from_canonical(target).ok_or_else(|| {
                Error::Config(format!(
                    "response alias {:?} maps to {:?}, which is not one of Yea, Nay, Present, Not Voting",
                    token, target
                ))
            })?;
            table.insert(token.clone(), position);
        }
        Ok(Self { table })
    }

    pub fn get(&self, token: &str) -> Option<Position> {
        self.table.get(token).copied()
    }
}

impl Default for ResponseAliases {
    fn default() -> Self {
        Self::builtin()
    }
}

/// A normalized response with its raw token kept for audit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedResponse {
    pub position: String,
    pub original: String,
}

impl NormalizedResponse {
    /// True when `position` is one of the four canonical tokens
    pub fn is_canonical(&self) -> bool {
        Position::from_canonical(&self.position).is_some()
    }
}

/// Response normalizer
#[derive(Debug, Clone, Default)]
pub struct ResponseNormalizer {
    aliases: ResponseAliases,
}

impl ResponseNormalizer {
    pub fn new(aliases: ResponseAliases) -> Self {
        Self { aliases }
    }

    /// Map a raw token; tokens without an alias pass through unchanged
    pub fn normalize(&self, raw: &str) -> NormalizedResponse {
        let position = match self.aliases.get(raw) {
            Some(position) => position.as_str().to_string(),
            None => raw.to_string(),
        };

        NormalizedResponse {
            position,
            original: raw.to_string(),
        }
    }
}
