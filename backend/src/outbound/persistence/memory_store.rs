//! In-process document store.
//!
//! Holds every document in a map guarded by a mutex and answers range
//! queries by recomputing index rows from document bodies. Saves are a
//! compare-and-swap on the revision, matching what a CouchDB-style backend
//! enforces.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::views::index_rows;
use crate::domain::ports::{DocumentStore, DocumentStoreError, IndexName, IndexRow, KeyRange};
use crate::domain::{DocId, Doctype, Document, Revision};

#[derive(Debug, Clone)]
struct StoredDocument {
    generation: u64,
    rev: Revision,
    doctype: Doctype,
    body: Value,
}

impl StoredDocument {
    fn to_document(&self, id: &DocId) -> Document {
        Document {
            id: id.clone(),
            rev: Some(self.rev.clone()),
            doctype: self.doctype,
            body: self.body.clone(),
        }
    }
}

/// Document store kept in memory for the life of the process.
///
/// # Examples
/// ```
/// use seqtrack::outbound::persistence::MemoryDocumentStore;
///
/// let store = MemoryDocumentStore::new();
/// assert!(store.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<BTreeMap<DocId, StoredDocument>>,
}

impl MemoryDocumentStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<DocId, StoredDocument>> {
        self.documents.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the store holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of stored documents of `doctype`.
    #[must_use]
    pub fn count(&self, doctype: Doctype) -> usize {
        self.lock()
            .values()
            .filter(|stored| stored.doctype == doctype)
            .count()
    }
}

fn next_revision(generation: u64) -> Revision {
    Revision::new(format!("{generation}-{}", Uuid::new_v4().simple()))
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, id: &DocId) -> Result<Document, DocumentStoreError> {
        self.lock()
            .get(id)
            .map(|stored| stored.to_document(id))
            .ok_or_else(|| DocumentStoreError::not_found(id.as_str()))
    }

    async fn save(&self, document: &Document) -> Result<Revision, DocumentStoreError> {
        let mut documents = self.lock();
        let generation = match (documents.get(&document.id), document.rev.as_ref()) {
            (None, None) => 1,
            (Some(stored), Some(rev)) if &stored.rev == rev => stored.generation + 1,
            _ => return Err(DocumentStoreError::revision_conflict(document.id.as_str())),
        };
        let rev = next_revision(generation);
        let mut body = document.body.clone();
        if let Value::Object(fields) = &mut body {
            fields.insert("_rev".to_owned(), Value::String(rev.as_str().to_owned()));
        }
        documents.insert(
            document.id.clone(),
            StoredDocument {
                generation,
                rev: rev.clone(),
                doctype: document.doctype,
                body,
            },
        );
        debug!(id = %document.id, rev = %rev, "document saved");
        Ok(rev)
    }

    async fn delete(&self, id: &DocId) -> Result<(), DocumentStoreError> {
        self.lock()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DocumentStoreError::not_found(id.as_str()))
    }

    async fn range_query(
        &self,
        index: IndexName,
        range: &KeyRange,
    ) -> Result<Vec<IndexRow>, DocumentStoreError> {
        let documents = self.lock();
        let mut rows: Vec<IndexRow> = documents
            .iter()
            .flat_map(|(id, stored)| {
                let document = stored.to_document(id);
                index_rows(&document)
                    .into_iter()
                    .filter(|(name, key)| *name == index && range.contains(key))
                    .map(|(_, key)| IndexRow {
                        key,
                        document: document.clone(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        rows.sort_by(|left, right| {
            left.key
                .cmp(&right.key)
                .then_with(|| left.document.id.cmp(&right.document.id))
        });
        Ok(rows)
    }
}
