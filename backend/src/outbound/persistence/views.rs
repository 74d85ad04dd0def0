//! Secondary index keys computed from document bodies.
//!
//! Each document maps to zero or more `(index, key)` rows. Documents missing
//! a key component are left out of that index.

use chrono::{DateTime, Utc};

use crate::domain::audit::timestamp_key;
use crate::domain::ports::{IndexKey, IndexName};
use crate::domain::{Doctype, Document};

fn key_of(document: &Document, fields: &[&str]) -> Option<IndexKey> {
    fields
        .iter()
        .map(|field| document.text(field).filter(|value| !value.is_empty()))
        .collect::<Option<Vec<_>>>()
        .map(IndexKey::new)
}

fn log_key(document: &Document) -> Option<IndexKey> {
    let owner = document.text("doc")?;
    let timestamp = document
        .text("timestamp")
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())?
        .with_timezone(&Utc);
    Some(IndexKey::new([owner.to_owned(), timestamp_key(timestamp)]))
}

/// Rows `document` contributes to the secondary indexes.
pub(crate) fn index_rows(document: &Document) -> Vec<(IndexName, IndexKey)> {
    let keyed = |index: IndexName, fields: &[&str]| key_of(document, fields).map(|key| (index, key));
    let rows = match document.doctype {
        Doctype::Project => vec![
            keyed(IndexName::ProjectId, &["projectid"]),
            keyed(IndexName::ProjectName, &["name"]),
        ],
        Doctype::Sample => vec![keyed(IndexName::SampleId, &["projectid", "sampleid"])],
        Doctype::LibPrep => vec![keyed(
            IndexName::LibPrepId,
            &["projectid", "sampleid", "libprepid"],
        )],
        Doctype::SeqRun => vec![keyed(
            IndexName::SeqRunId,
            &["projectid", "sampleid", "libprepid", "seqrunid"],
        )],
        Doctype::User => vec![
            keyed(IndexName::UserEmail, &["email"]),
            keyed(IndexName::UserApiToken, &["api_token"]),
        ],
        Doctype::Log => vec![log_key(document).map(|key| (IndexName::LogOwner, key))],
    };
    rows.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::DocId;

    fn document(doctype: Doctype, body: serde_json::Value) -> Document {
        Document {
            id: DocId::generate(),
            rev: None,
            doctype,
            body,
        }
    }

    #[rstest]
    fn seqruns_are_keyed_by_their_parent_chain() {
        let doc = document(
            Doctype::SeqRun,
            json!({"projectid": "P0", "sampleid": "S1", "libprepid": "A", "seqrunid": "2"}),
        );
        assert_eq!(
            index_rows(&doc),
            vec![(IndexName::SeqRunId, IndexKey::new(["P0", "S1", "A", "2"]))]
        );
    }

    #[rstest]
    fn unnamed_projects_skip_the_name_index() {
        let doc = document(Doctype::Project, json!({"projectid": "P0"}));
        assert_eq!(
            index_rows(&doc),
            vec![(IndexName::ProjectId, IndexKey::new(["P0"]))]
        );
    }

    #[rstest]
    fn log_entries_are_keyed_by_owner_and_time() {
        let doc = document(
            Doctype::Log,
            json!({"doc": "abc", "timestamp": "2024-03-01T09:30:00Z"}),
        );
        let rows = index_rows(&doc);
        assert_eq!(rows.len(), 1);
        let (index, key) = &rows[0];
        assert_eq!(*index, IndexName::LogOwner);
        assert_eq!(key.text(0), Some("abc"));
        assert_eq!(key.text(1), Some("2024-03-01T09:30:00.000000Z"));
    }
}
