//! Sequencing run of a library preparation.
//!
//! The run identifier is either a position assigned on creation or a
//! client-supplied code, depending on [`SeqRunIdPolicy`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    Entity, LibPrep, Stored, optional_text_field, take_float, take_map, take_text, text_field,
    unknown_field,
};
use crate::domain::field::{FieldKind, FieldSpec, FieldValue, IdSyntax};
use crate::domain::ports::{IndexKey, IndexName};
use crate::domain::{Doctype, DocumentMeta, EntityConfig, DomainError, SeqRunIdPolicy};

/// Per-lane outcome values.
pub const LANE_STATUSES: &[&str] = &["PASSED", "FAILED", "UNKNOWN"];
/// Sequencing states.
pub const SEQUENCING_STATUSES: &[&str] = &["NEW", "RUNNING", "DONE", "FAILED"];
/// Alignment states.
pub const ALIGNMENT_STATUSES: &[&str] = &[
    "NOT_RUNNING",
    "RUNNING",
    "DONE",
    "COMPUTATION_FAILED",
    "DATA_FAILED",
];

/// Key of the per-run coverage summed into the sample.
pub const MEAN_AUTOSOMAL_COVERAGE: &str = "mean_autosomal_coverage";
/// Key of the per-run read count summed into the sample.
pub const TOTAL_READS: &str = "total_reads";

const POSITION_FIELDS: &[FieldSpec] = &[
    FieldSpec::new(
        "seqrunid",
        FieldKind::Position {
            index: IndexName::SeqRunId,
        },
    )
    .immutable(),
    FieldSpec::new("sequencing_status", FieldKind::Choice(SEQUENCING_STATUSES))
        .with_text_default("NEW"),
    FieldSpec::new("alignment_status", FieldKind::Choice(ALIGNMENT_STATUSES))
        .with_text_default("NOT_RUNNING"),
    FieldSpec::text("runid"),
    FieldSpec::measure(MEAN_AUTOSOMAL_COVERAGE),
    FieldSpec::measure(TOTAL_READS),
    FieldSpec::new("lane_statuses", FieldKind::LaneStatuses(LANE_STATUSES)),
];

const RUNID_FIELDS: &[FieldSpec] = &[
    FieldSpec::new(
        "seqrunid",
        FieldKind::Identifier {
            index: IndexName::SeqRunId,
            syntax: IdSyntax::RunCode,
        },
    )
    .mandatory()
    .immutable(),
    FieldSpec::new("sequencing_status", FieldKind::Choice(SEQUENCING_STATUSES))
        .with_text_default("NEW"),
    FieldSpec::new("alignment_status", FieldKind::Choice(ALIGNMENT_STATUSES))
        .with_text_default("NOT_RUNNING"),
    FieldSpec::text("runid"),
    FieldSpec::measure(MEAN_AUTOSOMAL_COVERAGE),
    FieldSpec::measure(TOTAL_READS),
    FieldSpec::new("lane_statuses", FieldKind::LaneStatuses(LANE_STATUSES)),
];

/// A sequencing run, unique by `seqrunid` within its libprep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeqRun {
    /// Document metadata.
    #[serde(flatten)]
    pub meta: DocumentMeta,
    /// Position or client-supplied code.
    #[serde(default)]
    pub seqrunid: String,
    /// Owning project.
    #[serde(default)]
    pub projectid: String,
    /// Owning sample.
    #[serde(default)]
    pub sampleid: String,
    /// Owning libprep.
    #[serde(default)]
    pub libprepid: String,
    /// Sequencing state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequencing_status: Option<String>,
    /// Alignment state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment_status: Option<String>,
    /// Instrument run identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runid: Option<String>,
    /// Mean autosomal coverage of this run.
    #[serde(default)]
    pub mean_autosomal_coverage: f64,
    /// Reads produced by this run.
    #[serde(default)]
    pub total_reads: f64,
    /// Lane number to outcome.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub lane_statuses: BTreeMap<String, String>,
}

impl SeqRun {
    /// Unsaved seqrun bound to `libprep`.
    #[must_use]
    pub fn draft(libprep: &LibPrep, created: DateTime<Utc>) -> Self {
        Self {
            meta: DocumentMeta::fresh(Doctype::SeqRun, created),
            seqrunid: String::new(),
            projectid: libprep.projectid.clone(),
            sampleid: libprep.sampleid.clone(),
            libprepid: libprep.libprepid.clone(),
            sequencing_status: None,
            alignment_status: None,
            runid: None,
            mean_autosomal_coverage: 0.0,
            total_reads: 0.0,
            lane_statuses: BTreeMap::new(),
        }
    }
}

impl Stored for SeqRun {
    const DOCTYPE: Doctype = Doctype::SeqRun;

    fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut DocumentMeta {
        &mut self.meta
    }
}

impl Entity for SeqRun {
    fn field_specs(config: &EntityConfig) -> &'static [FieldSpec] {
        match config.seqrun_id_policy() {
            SeqRunIdPolicy::Position => POSITION_FIELDS,
            SeqRunIdPolicy::RunId => RUNID_FIELDS,
        }
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "seqrunid" => text_field(&self.seqrunid),
            "sequencing_status" => optional_text_field(self.sequencing_status.as_ref()),
            "alignment_status" => optional_text_field(self.alignment_status.as_ref()),
            "runid" => optional_text_field(self.runid.as_ref()),
            MEAN_AUTOSOMAL_COVERAGE => Some(FieldValue::Float(self.mean_autosomal_coverage)),
            TOTAL_READS => Some(FieldValue::Float(self.total_reads)),
            "lane_statuses" => {
                (!self.lane_statuses.is_empty()).then(|| FieldValue::Map(self.lane_statuses.clone()))
            }
            _ => None,
        }
    }

    fn set_field(&mut self, key: &str, value: Option<FieldValue>) -> Result<(), DomainError> {
        match key {
            MEAN_AUTOSOMAL_COVERAGE => {
                self.mean_autosomal_coverage = take_float(Doctype::SeqRun, key, value)?;
            }
            TOTAL_READS => self.total_reads = take_float(Doctype::SeqRun, key, value)?,
            "lane_statuses" => self.lane_statuses = take_map(Doctype::SeqRun, key, value)?,
            _ => {
                let text = take_text(Doctype::SeqRun, key, value)?;
                match key {
                    "seqrunid" => self.seqrunid = text.unwrap_or_default(),
                    "sequencing_status" => self.sequencing_status = text,
                    "alignment_status" => self.alignment_status = text,
                    "runid" => self.runid = text,
                    _ => return unknown_field(Doctype::SeqRun, key),
                }
            }
        }
        Ok(())
    }

    fn scope(&self) -> IndexKey {
        IndexKey::new([
            self.projectid.as_str(),
            self.sampleid.as_str(),
            self.libprepid.as_str(),
        ])
    }
}
