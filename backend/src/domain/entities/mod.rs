//! Entity structs persisted as documents.
//!
//! One explicit struct per doctype. Entities edited through the saver
//! implement [`Entity`], exposing their field table and keyed access to the
//! fields it names; log entries are append-only and only implement
//! [`Stored`].

mod libprep;
mod log_entry;
mod project;
mod sample;
mod seqrun;
mod user;

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use libprep::LibPrep;
pub use log_entry::LogEntry;
pub use project::Project;
pub use sample::{Sample, TOTAL_AUTOSOMAL_COVERAGE, TOTAL_SEQUENCED_READS};
pub use seqrun::{LANE_STATUSES, MEAN_AUTOSOMAL_COVERAGE, SeqRun, TOTAL_READS};
pub use user::{API_TOKEN, User, UserRole, UserStatus};

use crate::domain::field::{FieldSpec, FieldValue};
use crate::domain::ports::IndexKey;
use crate::domain::{Doctype, Document, DocumentMeta, EntityConfig, DomainError};

/// Any document-backed value.
pub trait Stored: Serialize + DeserializeOwned + Send + Sync {
    /// Discriminant stored in the document.
    const DOCTYPE: Doctype;

    /// Shared document metadata.
    fn meta(&self) -> &DocumentMeta;

    /// Mutable document metadata.
    fn meta_mut(&mut self) -> &mut DocumentMeta;
}

/// Entity edited through the saver.
pub trait Entity: Stored + Clone {
    /// Field table applied on create and update.
    fn field_specs(config: &EntityConfig) -> &'static [FieldSpec];

    /// Current canonical value of a field named in the table.
    fn field(&self, key: &str) -> Option<FieldValue>;

    /// Replace a field value; `None` clears it.
    fn set_field(&mut self, key: &str, value: Option<FieldValue>) -> Result<(), DomainError>;

    /// Identifiers of the parent chain, scoping sibling uniqueness.
    fn scope(&self) -> IndexKey;
}

/// Render an entity as a store document.
pub fn to_document<S: Stored>(value: &S) -> Result<Document, DomainError> {
    let meta = value.meta();
    let body = serde_json::to_value(value).map_err(|err| {
        DomainError::internal(format!("failed to serialise {} document: {err}", S::DOCTYPE))
    })?;
    Ok(Document {
        id: meta.id.clone(),
        rev: meta.rev.clone(),
        doctype: S::DOCTYPE,
        body,
    })
}

/// Parse a store document into an entity, checking its doctype.
pub fn from_document<S: Stored>(document: Document) -> Result<S, DomainError> {
    if document.doctype != S::DOCTYPE {
        return Err(DomainError::internal(format!(
            "document {} is a {}, not a {}",
            document.id,
            document.doctype,
            S::DOCTYPE
        )));
    }
    let Document { rev, body, id, .. } = document;
    let mut value: S = serde_json::from_value(body).map_err(|err| {
        DomainError::internal(format!("malformed {} document {id}: {err}", S::DOCTYPE))
    })?;
    value.meta_mut().rev = rev;
    Ok(value)
}

fn unknown_field<T>(doctype: Doctype, key: &str) -> Result<T, DomainError> {
    Err(DomainError::internal(format!("{doctype} has no field {key}")))
}

fn mismatched(doctype: Doctype, key: &str) -> DomainError {
    DomainError::internal(format!("{doctype} field {key} received a value of the wrong type"))
}

fn text_field(value: &str) -> Option<FieldValue> {
    (!value.is_empty()).then(|| FieldValue::Text(value.to_owned()))
}

fn optional_text_field(value: Option<&String>) -> Option<FieldValue> {
    value.map(|text| FieldValue::Text(text.clone()))
}

fn take_text(doctype: Doctype, key: &str, value: Option<FieldValue>) -> Result<Option<String>, DomainError> {
    match value {
        None => Ok(None),
        Some(FieldValue::Text(text)) => Ok(Some(text)),
        Some(_) => Err(mismatched(doctype, key)),
    }
}

fn take_float(doctype: Doctype, key: &str, value: Option<FieldValue>) -> Result<f64, DomainError> {
    match value {
        None => Ok(0.0),
        Some(FieldValue::Float(number)) => Ok(number),
        Some(_) => Err(mismatched(doctype, key)),
    }
}

fn take_map(
    doctype: Doctype,
    key: &str,
    value: Option<FieldValue>,
) -> Result<BTreeMap<String, String>, DomainError> {
    match value {
        None => Ok(BTreeMap::new()),
        Some(FieldValue::Map(map)) => Ok(map),
        Some(_) => Err(mismatched(doctype, key)),
    }
}

#[cfg(test)]
mod tests;
