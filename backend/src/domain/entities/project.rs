//! Sequencing project, the root of the entity hierarchy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Entity, Stored, optional_text_field, take_text, text_field, unknown_field};
use crate::domain::field::{FieldKind, FieldSpec, FieldValue, IdSyntax};
use crate::domain::ports::{IndexKey, IndexName};
use crate::domain::{Doctype, DocumentMeta, EntityConfig, DomainError};

/// Project lifecycle states.
pub const PROJECT_STATUSES: &[&str] = &["OPEN", "CLOSED", "ABORTED"];

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new(
        "projectid",
        FieldKind::Identifier {
            index: IndexName::ProjectId,
            syntax: IdSyntax::Code,
        },
    )
    .mandatory()
    .immutable(),
    FieldSpec::new(
        "name",
        FieldKind::Identifier {
            index: IndexName::ProjectName,
            syntax: IdSyntax::Code,
        },
    ),
    FieldSpec::new("status", FieldKind::Choice(PROJECT_STATUSES)).with_text_default("OPEN"),
    FieldSpec::text("pipeline"),
    FieldSpec::text("best_practice_analysis"),
    FieldSpec::text("sequencing_facility"),
];

/// A sequencing project, e.g. `P1234`.
///
/// `projectid` is globally unique and fixed at creation; `name` is optional
/// but globally unique when set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Document metadata.
    #[serde(flatten)]
    pub meta: DocumentMeta,
    /// Project identifier.
    #[serde(default)]
    pub projectid: String,
    /// Optional human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Lifecycle state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Analysis pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<String>,
    /// Best-practice analysis selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_practice_analysis: Option<String>,
    /// Facility performing the sequencing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequencing_facility: Option<String>,
}

impl Project {
    /// Unsaved project with no fields set.
    #[must_use]
    pub fn draft(created: DateTime<Utc>) -> Self {
        Self {
            meta: DocumentMeta::fresh(Doctype::Project, created),
            projectid: String::new(),
            name: None,
            status: None,
            pipeline: None,
            best_practice_analysis: None,
            sequencing_facility: None,
        }
    }
}

impl Stored for Project {
    const DOCTYPE: Doctype = Doctype::Project;

    fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut DocumentMeta {
        &mut self.meta
    }
}

impl Entity for Project {
    fn field_specs(_config: &EntityConfig) -> &'static [FieldSpec] {
        FIELDS
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "projectid" => text_field(&self.projectid),
            "name" => optional_text_field(self.name.as_ref()),
            "status" => optional_text_field(self.status.as_ref()),
            "pipeline" => optional_text_field(self.pipeline.as_ref()),
            "best_practice_analysis" => optional_text_field(self.best_practice_analysis.as_ref()),
            "sequencing_facility" => optional_text_field(self.sequencing_facility.as_ref()),
            _ => None,
        }
    }

    fn set_field(&mut self, key: &str, value: Option<FieldValue>) -> Result<(), DomainError> {
        let text = take_text(Doctype::Project, key, value)?;
        match key {
            "projectid" => self.projectid = text.unwrap_or_default(),
            "name" => self.name = text,
            "status" => self.status = text,
            "pipeline" => self.pipeline = text,
            "best_practice_analysis" => self.best_practice_analysis = text,
            "sequencing_facility" => self.sequencing_facility = text,
            _ => return unknown_field(Doctype::Project, key),
        }
        Ok(())
    }

    fn scope(&self) -> IndexKey {
        IndexKey::new(Vec::<String>::new())
    }
}
