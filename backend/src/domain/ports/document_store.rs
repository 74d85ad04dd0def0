//! Port for the revisioned document store backing every entity.
//!
//! The store offers single-document atomicity only: `save` is a
//! compare-and-swap on the revision the writer read, and there is no
//! multi-document transaction. Secondary indexes are defined by the adapter;
//! the core addresses them by [`IndexName`] and composite [`IndexKey`]s.

use std::fmt;

use async_trait::async_trait;

use crate::domain::{DocId, Document, Revision};

use super::define_port_error;

define_port_error! {
    /// Errors raised by document store adapters.
    pub enum DocumentStoreError {
        /// No document with the given id exists.
        NotFound { id: String } => "document {id} not found",
        /// The stored revision no longer matches the one supplied by the writer.
        RevisionConflict { id: String } => "document {id} revision update conflict",
        /// Store connection could not be established.
        Connection { message: String } => "document store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "document store query failed: {message}",
    }
}

/// Secondary indexes the core range-queries.
///
/// Keys per index:
/// - `ProjectId`: `[projectid]`
/// - `ProjectName`: `[name]` (projects with a name only)
/// - `SampleId`: `[projectid, sampleid]`
/// - `LibPrepId`: `[projectid, sampleid, libprepid]`
/// - `SeqRunId`: `[projectid, sampleid, libprepid, seqrunid]`
/// - `LogOwner`: `[owner id, timestamp]`
/// - `UserEmail`: `[email]`
/// - `UserApiToken`: `[api_token]` (users with a token only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexName {
    /// Projects by projectid.
    ProjectId,
    /// Projects by optional name.
    ProjectName,
    /// Samples scoped by project.
    SampleId,
    /// Libpreps scoped by project and sample.
    LibPrepId,
    /// Seqruns scoped by project, sample and libprep.
    SeqRunId,
    /// Log entries by owner document id, then timestamp.
    LogOwner,
    /// Users by email.
    UserEmail,
    /// Users by API token.
    UserApiToken,
}

impl IndexName {
    /// Stable name of the index, in `doctype/key` form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProjectId => "project/projectid",
            Self::ProjectName => "project/name",
            Self::SampleId => "sample/sampleid",
            Self::LibPrepId => "libprep/libprepid",
            Self::SeqRunId => "seqrun/seqrunid",
            Self::LogOwner => "log/doc",
            Self::UserEmail => "user/email",
            Self::UserApiToken => "user/api_token",
        }
    }
}

impl fmt::Display for IndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One component of a composite index key.
///
/// `High` sorts after every text value and closes prefix ranges.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyPart {
    /// Concrete key component.
    Text(String),
    /// Upper sentinel.
    High,
}

/// Composite index key compared element by element.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexKey(Vec<KeyPart>);

impl IndexKey {
    /// Build a key from text components.
    ///
    /// # Examples
    /// ```
    /// use seqtrack::domain::ports::IndexKey;
    ///
    /// let key = IndexKey::new(["P0", "S1"]);
    /// assert_eq!(key.len(), 2);
    /// ```
    #[must_use]
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(|part| KeyPart::Text(part.into())).collect())
    }

    /// Append a text component.
    #[must_use]
    pub fn with(mut self, part: impl Into<String>) -> Self {
        self.0.push(KeyPart::Text(part.into()));
        self
    }

    /// Number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the key has no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Text component at `position`, if present.
    #[must_use]
    pub fn text(&self, position: usize) -> Option<&str> {
        match self.0.get(position) {
            Some(KeyPart::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    fn closed(&self) -> Self {
        let mut parts = self.0.clone();
        parts.push(KeyPart::High);
        Self(parts)
    }
}

/// Inclusive key range for a range query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyRange {
    /// Lowest matching key.
    pub start: IndexKey,
    /// Highest matching key.
    pub end: IndexKey,
}

impl KeyRange {
    /// Range matching exactly one key.
    #[must_use]
    pub fn exact(key: IndexKey) -> Self {
        Self {
            start: key.clone(),
            end: key,
        }
    }

    /// Range matching every key that extends `prefix` (and `prefix` itself).
    ///
    /// # Examples
    /// ```
    /// use seqtrack::domain::ports::{IndexKey, KeyRange};
    ///
    /// let range = KeyRange::prefix(IndexKey::new(["P0", "S1"]));
    /// assert!(range.contains(&IndexKey::new(["P0", "S1", "A"])));
    /// assert!(!range.contains(&IndexKey::new(["P0", "S10", "A"])));
    /// ```
    #[must_use]
    pub fn prefix(prefix: IndexKey) -> Self {
        Self {
            end: prefix.closed(),
            start: prefix,
        }
    }

    /// Range covering every key in the index.
    #[must_use]
    pub fn all() -> Self {
        Self {
            start: IndexKey(Vec::new()),
            end: IndexKey(vec![KeyPart::High]),
        }
    }

    /// Whether `key` falls inside the range.
    #[must_use]
    pub fn contains(&self, key: &IndexKey) -> bool {
        &self.start <= key && key <= &self.end
    }
}

/// One matching row of a range query, with its document included.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRow {
    /// Key the document was indexed under.
    pub key: IndexKey,
    /// Indexed document.
    pub document: Document,
}

/// Port for revisioned document persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by id.
    async fn get(&self, id: &DocId) -> Result<Document, DocumentStoreError>;

    /// Persist a document if its `rev` still matches the stored revision
    /// (`None` for a document that must not exist yet). Returns the new
    /// revision.
    async fn save(&self, document: &Document) -> Result<Revision, DocumentStoreError>;

    /// Remove a document.
    async fn delete(&self, id: &DocId) -> Result<(), DocumentStoreError>;

    /// Rows of `index` whose keys fall in `range`, in ascending key order.
    async fn range_query(
        &self,
        index: IndexName,
        range: &KeyRange,
    ) -> Result<Vec<IndexRow>, DocumentStoreError>;
}
