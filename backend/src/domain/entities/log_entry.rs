//! Append-only audit records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Stored;
use crate::domain::{DocId, Doctype, DocumentMeta};

/// Record of one committed mutation.
///
/// `changed` holds new values; `deleted` holds the values that were removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Metadata of the entry itself.
    #[serde(flatten)]
    pub meta: DocumentMeta,
    /// Id of the document the entry describes.
    pub doc: DocId,
    /// Doctype of the described document.
    pub owner_doctype: Doctype,
    /// New values keyed by field.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub changed: BTreeMap<String, Value>,
    /// Removed values keyed by field.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub deleted: BTreeMap<String, Value>,
    /// Email of the authenticated operator, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    /// Commit instant; entries sort newest first on it.
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    /// Unsaved entry for `owner`.
    #[must_use]
    pub fn new(
        owner: &DocumentMeta,
        changed: BTreeMap<String, Value>,
        deleted: BTreeMap<String, Value>,
        operator: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            meta: DocumentMeta::fresh(Doctype::Log, timestamp),
            doc: owner.id.clone(),
            owner_doctype: owner.doctype,
            changed,
            deleted,
            operator,
            timestamp,
        }
    }
}

impl Stored for LogEntry {
    const DOCTYPE: Doctype = Doctype::Log;

    fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut DocumentMeta {
        &mut self.meta
    }
}
