//! Amendment document (`{congress}/amendments/{chamber}amdt/{chamber}amdt{number}/data.json`)

use super::vote_document::IdToken;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AmendmentDocument {
    pub amendment_id: Option<String>,
    pub amends_bill: Option<AmendedBill>,
    /// Committee sponsors carry no bioguide id
    pub sponsor: Option<Sponsor>,
    pub chamber: Option<String>,
    pub purpose: Option<String>,
    pub congress: Option<IdToken>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AmendedBill {
    pub bill_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sponsor {
    pub bioguide_id: Option<String>,
}
