//! Library preparation of a sample.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Entity, Sample, Stored, optional_text_field, take_text, text_field, unknown_field};
use crate::domain::field::{FieldKind, FieldSpec, FieldValue, IdSyntax};
use crate::domain::ports::{IndexKey, IndexName};
use crate::domain::{Doctype, DocumentMeta, EntityConfig, DomainError};

/// Library preparation states.
pub const LIBPREP_STATUSES: &[&str] = &["NEW", "RUNNING", "DONE", "FAILED"];

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new(
        "libprepid",
        FieldKind::Identifier {
            index: IndexName::LibPrepId,
            syntax: IdSyntax::Code,
        },
    )
    .mandatory()
    .immutable(),
    FieldSpec::new("status", FieldKind::Choice(LIBPREP_STATUSES)).with_text_default("NEW"),
    FieldSpec::text("limsid"),
    FieldSpec::text("qc"),
];

/// A library preparation, unique by `libprepid` within its sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibPrep {
    /// Document metadata.
    #[serde(flatten)]
    pub meta: DocumentMeta,
    /// Libprep identifier, unique within the sample.
    #[serde(default)]
    pub libprepid: String,
    /// Owning project.
    #[serde(default)]
    pub projectid: String,
    /// Owning sample.
    #[serde(default)]
    pub sampleid: String,
    /// Preparation state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// LIMS reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limsid: Option<String>,
    /// Free-text QC verdict.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qc: Option<String>,
}

impl LibPrep {
    /// Unsaved libprep bound to `sample`.
    #[must_use]
    pub fn draft(sample: &Sample, created: DateTime<Utc>) -> Self {
        Self {
            meta: DocumentMeta::fresh(Doctype::LibPrep, created),
            libprepid: String::new(),
            projectid: sample.projectid.clone(),
            sampleid: sample.sampleid.clone(),
            status: None,
            limsid: None,
            qc: None,
        }
    }
}

impl Stored for LibPrep {
    const DOCTYPE: Doctype = Doctype::LibPrep;

    fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut DocumentMeta {
        &mut self.meta
    }
}

impl Entity for LibPrep {
    fn field_specs(_config: &EntityConfig) -> &'static [FieldSpec] {
        FIELDS
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "libprepid" => text_field(&self.libprepid),
            "status" => optional_text_field(self.status.as_ref()),
            "limsid" => optional_text_field(self.limsid.as_ref()),
            "qc" => optional_text_field(self.qc.as_ref()),
            _ => None,
        }
    }

    fn set_field(&mut self, key: &str, value: Option<FieldValue>) -> Result<(), DomainError> {
        let text = take_text(Doctype::LibPrep, key, value)?;
        match key {
            "libprepid" => self.libprepid = text.unwrap_or_default(),
            "status" => self.status = text,
            "limsid" => self.limsid = text,
            "qc" => self.qc = text,
            _ => return unknown_field(Doctype::LibPrep, key),
        }
        Ok(())
    }

    fn scope(&self) -> IndexKey {
        IndexKey::new([self.projectid.as_str(), self.sampleid.as_str()])
    }
}
