//! Document identity and metadata shared by every persisted entity.
//!
//! Every document carries an opaque globally unique id, the revision token the
//! store assigned on its last write, creation/modification timestamps, and a
//! doctype discriminant. The store port moves [`Document`] values; entity
//! structs convert to and from them.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Opaque globally unique document identifier: 32 lowercase hex digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocId(String);

/// Rejected document identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("document id must be 32 lowercase hex digits: {0:?}")]
pub struct InvalidDocId(String);

static DOC_ID_RE: OnceLock<Regex> = OnceLock::new();

fn doc_id_regex() -> &'static Regex {
    DOC_ID_RE.get_or_init(|| {
        Regex::new("^[0-9a-z]{32}$")
            .unwrap_or_else(|error| panic!("document id regex failed to compile: {error}"))
    })
}

impl DocId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Validate an identifier received from a caller or the store.
    ///
    /// # Examples
    /// ```
    /// use seqtrack::domain::DocId;
    ///
    /// assert!(DocId::parse("0123456789abcdef0123456789abcdef").is_ok());
    /// assert!(DocId::parse("not-an-id").is_err());
    /// ```
    pub fn parse(value: impl Into<String>) -> Result<Self, InvalidDocId> {
        let raw = value.into();
        if doc_id_regex().is_match(&raw) {
            Ok(Self(raw))
        } else {
            Err(InvalidDocId(raw))
        }
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DocId {
    type Error = InvalidDocId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<DocId> for String {
    fn from(value: DocId) -> Self {
        value.0
    }
}

/// Revision token assigned by the store on every accepted write.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(String);

impl Revision {
    /// Wrap a store-issued revision token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrow the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Discriminant stored on every document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Doctype {
    /// Sequencing project.
    Project,
    /// Biological sample within a project.
    Sample,
    /// Library preparation of a sample.
    #[serde(rename = "libprep")]
    LibPrep,
    /// Sequencing run of a library preparation.
    #[serde(rename = "seqrun")]
    SeqRun,
    /// Operator account.
    User,
    /// Audit log entry.
    Log,
}

impl Doctype {
    /// Stable lowercase name used in documents and log entries.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Sample => "sample",
            Self::LibPrep => "libprep",
            Self::SeqRun => "seqrun",
            Self::User => "user",
            Self::Log => "log",
        }
    }
}

impl fmt::Display for Doctype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata common to every entity document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMeta {
    /// Opaque document id.
    #[serde(rename = "_id")]
    pub id: DocId,
    /// Revision of the stored copy this value was read from; `None` before
    /// the first save.
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<Revision>,
    /// Document type discriminant.
    pub doctype: Doctype,
    /// Creation instant.
    pub created: DateTime<Utc>,
    /// Instant of the last committed change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

impl DocumentMeta {
    /// Metadata for a document that has never been saved.
    #[must_use]
    pub fn fresh(doctype: Doctype, created: DateTime<Utc>) -> Self {
        Self {
            id: DocId::generate(),
            rev: None,
            doctype,
            created,
            modified: None,
        }
    }

    /// Whether the document has never been saved.
    #[must_use]
    pub const fn is_new(&self) -> bool {
        self.rev.is_none()
    }
}

/// Raw document as exchanged with the store port.
///
/// `body` is the full JSON rendering of the entity; `id`, `rev` and `doctype`
/// are lifted out so the store can index and compare without parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document id.
    pub id: DocId,
    /// Revision the writer read, or the revision currently stored on reads.
    pub rev: Option<Revision>,
    /// Discriminant.
    pub doctype: Doctype,
    /// JSON body.
    pub body: Value,
}

impl Document {
    /// Look up a top-level string value in the body.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.body.get(key).and_then(Value::as_str)
    }
}
