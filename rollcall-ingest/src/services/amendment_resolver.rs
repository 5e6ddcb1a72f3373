//! Amendment reference resolution
//!
//! A vote document cites its amendment one of two ways:
//! - `{"type": "s" | "h", "number": N}`: the id is `{type}amdt{N}-{congress}`
//! - `{"type": "h-bill", "number": K}`: the K-th most recent amendment on the
//!   vote's bill, looked up in that bill's own `amendments` list
//!
//! Nothing here is fatal. A reference that cannot be turned into a valid
//! identifier resolves to [`Resolution::Unresolvable`] and the vote is stored
//! without an amendment.

use super::source_archive::{BillAmendmentLookup, BillKey};
use crate::models::{AmendmentReference, BillReference};
use rollcall_common::db::{AmendmentId, Chamber};

/// Bill-relative reference type
const BILL_RELATIVE_TYPE: &str = "h-bill";

/// Result of resolving one vote's amendment reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The vote carries no amendment reference
    NotApplicable,
    /// A reference was present but no identifier could be derived
    Unresolvable(String),
    Resolved(AmendmentId),
}

impl Resolution {
    pub fn amendment_id(&self) -> Option<AmendmentId> {
        match self {
            Resolution::Resolved(id) => Some(*id),
            _ => None,
        }
    }
}

/// Amendment resolver over a bill lookup
pub struct AmendmentResolver<B> {
    bills: B,
}

impl<B: BillAmendmentLookup> AmendmentResolver<B> {
    pub fn new(bills: B) -> Self {
        Self { bills }
    }

    /// Resolve `amendment` for a vote taken in `congress` on `bill`
    pub fn resolve(
        &self,
        amendment: Option<&AmendmentReference>,
        congress: u32,
        bill: Option<&BillReference>,
    ) -> Resolution {
        let Some(amendment) = amendment else {
            return Resolution::NotApplicable;
        };

        let kind = amendment.kind.as_deref().map(str::trim).unwrap_or_default();
        let Some(number) = amendment.number.as_ref().and_then(|n| n.as_u32()) else {
            return Resolution::Unresolvable(format!(
                "amendment reference of type {:?} has no usable number",
                kind
            ));
        };

        if kind == BILL_RELATIVE_TYPE {
            return self.resolve_bill_relative(number, bill);
        }

        match Chamber::from_code(kind) {
            Some(chamber) => Resolution::Resolved(AmendmentId::new(chamber, number, congress)),
            None => Resolution::Unresolvable(format!("unknown amendment type {:?}", kind)),
        }
    }

    /// Index the bill's amendment list from the end (ordinal 1 = last entry)
    fn resolve_bill_relative(&self, ordinal: u32, bill: Option<&BillReference>) -> Resolution {
        let Some(key) = bill.and_then(bill_key) else {
            return Resolution::Unresolvable("bill-relative amendment on a vote without a bill".into());
        };

        let entries = match self.bills.bill_amendments(&key) {
            Some(entries) if !entries.is_empty() => entries,
            _ => {
                return Resolution::Unresolvable(format!(
                    "no amendment list for {}{}-{}",
                    key.bill_type, key.number, key.congress
                ))
            }
        };

        let ordinal = ordinal as usize;
        if ordinal == 0 || ordinal > entries.len() {
            return Resolution::Unresolvable(format!(
                "ordinal {} outside amendment list of {} entries",
                ordinal,
                entries.len()
            ));
        }

        let index = entries.len() - ordinal;
        match entries[index].amendment_id.as_deref().map(str::trim) {
            Some(raw) => match raw.parse::<AmendmentId>() {
                Ok(id) => Resolution::Resolved(id),
                Err(e) => Resolution::Unresolvable(e.to_string()),
            },
            None => Resolution::Unresolvable(format!("amendment entry {} has no amendment_id", index)),
        }
    }
}

fn bill_key(bill: &BillReference) -> Option<BillKey> {
    let bill_type = bill.bill_type.as_deref()?;
    let number = bill.number.as_ref()?.as_u32()?;
    let congress = bill.congress.as_ref()?.as_u32()?;
    Some(BillKey::new(bill_type, number, congress))
}
