//! Turns loaded vote documents into rows ready to persist
//!
//! Runs sequentially in document order. For each document it:
//! 1. validates the required metadata fields
//! 2. resolves the amendment reference, staging a placeholder amendment
//!    ahead of the vote_meta row when the amendment's data file is absent
//! 3. normalizes every legislator response
//!
//! A placeholder is staged at most once per run, however many votes cite it.

use super::amendment_resolver::{AmendmentResolver, Resolution};
use super::document_loader::LoadedDocument;
use super::response_normalizer::ResponseNormalizer;
use super::source_archive::{AmendmentArchive, BillAmendmentLookup, Provenance};
use super::upsert_engine::StagedWrite;
use crate::error::{IngestError, IngestResult};
use crate::models::VoteDocument;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rollcall_common::db::{AmendmentRecord, Chamber, VoteMetaRecord, VoteRecord};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Naive timestamp layouts seen in older vote files (read as UTC)
const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Rows staged from one run's documents
#[derive(Debug, Default)]
pub struct StagedRun {
    pub documents: usize,
    /// Placeholder amendments and vote_meta rows, in write order
    pub writes: Vec<StagedWrite>,
    pub votes: Vec<VoteRecord>,
    pub placeholders: usize,
    pub unresolved_amendments: usize,
}

/// Vote staging over a source of bill and amendment files
pub struct VoteStager<S> {
    source: S,
    normalizer: ResponseNormalizer,
}

impl<S> VoteStager<S>
where
    S: BillAmendmentLookup + AmendmentArchive + Provenance,
{
    pub fn new(source: S, normalizer: ResponseNormalizer) -> Self {
        Self { source, normalizer }
    }

    /// Stage every document; the first malformed document aborts staging
    pub fn stage(&self, documents: &[LoadedDocument<VoteDocument>]) -> IngestResult<StagedRun> {
        let resolver = AmendmentResolver::new(&self.source);
        let mut staged_placeholders = HashSet::new();
        let mut run = StagedRun {
            documents: documents.len(),
            ..StagedRun::default()
        };

        for loaded in documents {
            let path = loaded.source.path.as_path();
            let doc = &loaded.document;

            let mut record = self.vote_meta(doc, path)?;
            let congress = doc
                .congress
                .as_ref()
                .and_then(|c| c.as_u32())
                .unwrap_or(loaded.source.congress);

            match resolver.resolve(doc.amendment.as_ref(), congress, doc.bill.as_ref()) {
                Resolution::NotApplicable => {}
                Resolution::Unresolvable(reason) => {
                    warn!(vote_id = %record.vote_id, "Amendment reference not resolved: {}", reason);
                    run.unresolved_amendments += 1;
                }
                Resolution::Resolved(id) => {
                    let amendment_id = id.to_string();
                    if !self.source.has_amendment(&id) && staged_placeholders.insert(amendment_id.clone()) {
                        info!(
                            amendment_id = %amendment_id,
                            vote_id = %record.vote_id,
                            "Amendment data file missing, staging placeholder"
                        );
                        run.writes.push(StagedWrite::Amendment(AmendmentRecord::placeholder(
                            &id,
                            record.bill_id.clone(),
                        )));
                        run.placeholders += 1;
                    }
                    record.amendment_id = Some(amendment_id);
                }
            }

            let before = run.votes.len();
            self.stage_votes(doc, &record.vote_id, &mut run.votes);
            debug!(
                vote_id = %record.vote_id,
                votes = run.votes.len() - before,
                "Staged vote document"
            );

            run.writes.push(StagedWrite::VoteMeta(record));
        }

        info!(
            documents = run.documents,
            vote_meta = run.documents,
            votes = run.votes.len(),
            placeholders = run.placeholders,
            unresolved = run.unresolved_amendments,
            "Staging complete"
        );

        Ok(run)
    }

    /// Build the vote_meta row; `amendment_id` is filled in by the caller
    fn vote_meta(&self, doc: &VoteDocument, path: &Path) -> IngestResult<VoteMetaRecord> {
        let vote_id = required(doc.vote_id.as_deref(), "vote_id", path)?;
        let vote_number = doc
            .number
            .ok_or_else(|| IngestError::malformed(path, "missing number"))?;

        let chamber_code = required(doc.chamber.as_deref(), "chamber", path)?;
        let chamber = Chamber::from_code(&chamber_code)
            .ok_or_else(|| IngestError::malformed(path, format!("unknown chamber {:?}", chamber_code)))?;

        let raw_date = required(doc.date.as_deref(), "date", path)?;
        let date = parse_vote_date(&raw_date)
            .ok_or_else(|| IngestError::malformed(path, format!("unparseable date {:?}", raw_date)))?;

        let result = required(doc.result_text.as_deref(), "result_text", path)?;
        let category = required(doc.category.as_deref(), "category", path)?;

        Ok(VoteMetaRecord {
            vote_id,
            vote_number,
            bill_id: doc.bill.as_ref().and_then(|b| b.bill_id()),
            chamber,
            date,
            result,
            category,
            nomination_title: doc.nomination.as_ref().and_then(|n| n.title.clone()),
            amendment_id: None,
            source_filename: self.source.relative_name(path),
        })
    }

    /// One row per legislator object under each response token
    fn stage_votes(&self, doc: &VoteDocument, vote_id: &str, out: &mut Vec<VoteRecord>) {
        for (token, voters) in &doc.votes {
            let response = self.normalizer.normalize(token);

            for voter in voters {
                let Value::Object(fields) = voter else {
                    continue;
                };

                match fields.get("id").and_then(Value::as_str) {
                    Some(legislator_id) => out.push(VoteRecord {
                        vote_id: vote_id.to_string(),
                        legislator_id: legislator_id.to_string(),
                        position: response.position.clone(),
                        original_position: response.original.clone(),
                    }),
                    None => warn!(vote_id, response = %token, "Voter entry without id, skipping"),
                }
            }
        }
    }
}

/// Present, non-blank, trimmed
fn required(value: Option<&str>, field: &str, path: &Path) -> IngestResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(IngestError::malformed(path, format!("missing {}", field))),
    }
}

/// Parse a vote timestamp into UTC
///
/// Offset-bearing RFC 3339 first, then naive layouts, then a bare date.
pub fn parse_vote_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BillAmendmentEntry;
    use crate::services::document_loader::SourceFile;
    use crate::services::source_archive::{relative_name, BillKey};
    use rollcall_common::db::{AmendmentId, PLACEHOLDER_PURPOSE};
    use serde_json::json;
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[derive(Default)]
    struct FakeSource {
        bills: HashMap<BillKey, Vec<BillAmendmentEntry>>,
        on_disk: HashSet<AmendmentId>,
    }

    impl BillAmendmentLookup for FakeSource {
        fn bill_amendments(&self, bill: &BillKey) -> Option<Vec<BillAmendmentEntry>> {
            self.bills.get(bill).cloned()
        }
    }

    impl AmendmentArchive for FakeSource {
        fn has_amendment(&self, id: &AmendmentId) -> bool {
            self.on_disk.contains(id)
        }
    }

    impl Provenance for FakeSource {
        fn relative_name(&self, path: &Path) -> String {
            relative_name(Path::new("/data"), path)
        }
    }

    fn loaded(rel: &str, body: Value) -> LoadedDocument<VoteDocument> {
        LoadedDocument {
            source: SourceFile {
                congress: 118,
                path: PathBuf::from("/data").join(rel),
            },
            document: serde_json::from_value(body).unwrap(),
        }
    }

    fn house_vote(number: i64, extra: Value) -> Value {
        let mut body = json!({
            "vote_id": format!("h{}-118.2023", number),
            "number": number,
            "chamber": "h",
            "congress": 118,
            "date": "2023-01-31T13:37:00-05:00",
            "result_text": "Passed",
            "category": " amendment ",
            "votes": {
                "Aye": [{"id": "A000370"}, {"id": "B001291"}],
                "No": [{"id": "C001120"}],
                "Not Voting": [{"id": "D000032"}]
            }
        });
        if let (Value::Object(base), Value::Object(extra)) = (&mut body, extra) {
            base.extend(extra);
        }
        body
    }

    fn stager(source: FakeSource) -> VoteStager<FakeSource> {
        VoteStager::new(source, ResponseNormalizer::default())
    }

    #[test]
    fn test_stages_meta_and_normalized_votes() {
        let docs = vec![loaded("118/votes/2023/h1/data.json", house_vote(1, json!({})))];
        let run = stager(FakeSource::default()).stage(&docs).unwrap();

        assert_eq!(run.writes.len(), 1);
        let StagedWrite::VoteMeta(meta) = &run.writes[0] else {
            panic!("expected vote_meta write");
        };
        assert_eq!(meta.vote_id, "h1-118.2023");
        assert_eq!(meta.category, "amendment");
        assert_eq!(meta.chamber, Chamber::House);
        assert_eq!(meta.date.to_rfc3339(), "2023-01-31T18:37:00+00:00");
        assert_eq!(meta.bill_id, None);
        assert_eq!(meta.amendment_id, None);
        assert_eq!(meta.source_filename, "118/votes/2023/h1/data.json");

        assert_eq!(run.votes.len(), 4);
        let by_id: HashMap<_, _> = run
            .votes
            .iter()
            .map(|v| (v.legislator_id.as_str(), (v.position.as_str(), v.original_position.as_str())))
            .collect();
        assert_eq!(by_id["A000370"], ("Yea", "Aye"));
        assert_eq!(by_id["C001120"], ("Nay", "No"));
        assert_eq!(by_id["D000032"], ("Not Voting", "Not Voting"));
    }

    #[test]
    fn test_placeholder_precedes_meta_and_is_staged_once() {
        let amendment = json!({"amendment": {"type": "h", "number": 3}, "bill": {"type": "hr", "number": 1048, "congress": 118}});
        let docs = vec![
            loaded("118/votes/2023/h1/data.json", house_vote(1, amendment.clone())),
            loaded("118/votes/2023/h2/data.json", house_vote(2, amendment)),
        ];
        let run = stager(FakeSource::default()).stage(&docs).unwrap();

        assert_eq!(run.placeholders, 1);
        assert_eq!(run.writes.len(), 3);

        let StagedWrite::Amendment(placeholder) = &run.writes[0] else {
            panic!("placeholder must come first");
        };
        assert_eq!(placeholder.amendment_id, "hamdt3-118");
        assert_eq!(placeholder.bill_id.as_deref(), Some("hr1048-118"));
        assert_eq!(placeholder.purpose.as_deref(), Some(PLACEHOLDER_PURPOSE));

        for write in &run.writes[1..] {
            let StagedWrite::VoteMeta(meta) = write else {
                panic!("expected vote_meta write");
            };
            assert_eq!(meta.amendment_id.as_deref(), Some("hamdt3-118"));
        }
    }

    #[test]
    fn test_no_placeholder_when_amendment_on_disk() {
        let mut source = FakeSource::default();
        source.on_disk.insert(AmendmentId::new(Chamber::Senate, 12, 119));

        let mut body = house_vote(5, json!({"amendment": {"type": "s", "number": 12}}));
        body["chamber"] = json!("s");
        body["congress"] = json!(119);
        body["vote_id"] = json!("s5-119.2025");

        let run = stager(source).stage(&[loaded("119/votes/2025/s5/data.json", body)]).unwrap();

        assert_eq!(run.placeholders, 0);
        let StagedWrite::VoteMeta(meta) = &run.writes[0] else {
            panic!("expected vote_meta write");
        };
        assert_eq!(meta.amendment_id.as_deref(), Some("samdt12-119"));
    }

    #[test]
    fn test_unresolvable_reference_stores_null_amendment() {
        let body = house_vote(
            7,
            json!({"amendment": {"type": "h-bill", "number": 2}, "bill": {"type": "hr", "number": 1048, "congress": 118}}),
        );
        let run = stager(FakeSource::default())
            .stage(&[loaded("118/votes/2023/h7/data.json", body)])
            .unwrap();

        assert_eq!(run.unresolved_amendments, 1);
        assert_eq!(run.placeholders, 0);
        let StagedWrite::VoteMeta(meta) = &run.writes[0] else {
            panic!("expected vote_meta write");
        };
        assert_eq!(meta.amendment_id, None);
        assert_eq!(meta.bill_id.as_deref(), Some("hr1048-118"));
    }

    #[test]
    fn test_nomination_title_and_non_object_voters() {
        let mut body = house_vote(9, json!({"nomination": {"title": "Jane Doe, of Ohio, to be a Judge"}}));
        body["votes"] = json!({
            "Guilty": [{"id": "S001"}, "VP"],
            "Yea": [{"display_name": "No id"}]
        });

        let run = stager(FakeSource::default())
            .stage(&[loaded("118/votes/2023/h9/data.json", body)])
            .unwrap();

        let StagedWrite::VoteMeta(meta) = &run.writes[0] else {
            panic!("expected vote_meta write");
        };
        assert_eq!(meta.nomination_title.as_deref(), Some("Jane Doe, of Ohio, to be a Judge"));

        assert_eq!(run.votes.len(), 1);
        assert_eq!(run.votes[0].position, "Guilty");
        assert_eq!(run.votes[0].original_position, "Guilty");
    }

    #[test]
    fn test_missing_required_field_is_malformed() {
        for field in ["vote_id", "number", "chamber", "date", "result_text", "category"] {
            let mut body = house_vote(11, json!({}));
            body.as_object_mut().unwrap().remove(field);

            let result = stager(FakeSource::default()).stage(&[loaded("118/votes/2023/h11/data.json", body)]);
            assert!(
                matches!(result, Err(IngestError::MalformedDocument { .. })),
                "missing {} should be malformed",
                field
            );
        }

        let mut body = house_vote(12, json!({}));
        body["date"] = json!("last Tuesday");
        let result = stager(FakeSource::default()).stage(&[loaded("118/votes/2023/h12/data.json", body)]);
        assert!(matches!(result, Err(IngestError::MalformedDocument { .. })));
    }

    #[test]
    fn test_parse_vote_date_variants() {
        assert_eq!(
            parse_vote_date("2023-01-31T13:37:00-05:00").unwrap().to_rfc3339(),
            "2023-01-31T18:37:00+00:00"
        );
        assert_eq!(
            parse_vote_date("1990-05-02 12:00:00").unwrap().to_rfc3339(),
            "1990-05-02T12:00:00+00:00"
        );
        assert_eq!(
            parse_vote_date("1990-05-02").unwrap().to_rfc3339(),
            "1990-05-02T00:00:00+00:00"
        );
        assert!(parse_vote_date("").is_none());
    }
}
