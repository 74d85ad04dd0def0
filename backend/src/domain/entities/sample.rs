//! Sample within a project, carrying totals rolled up from its seqruns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    Entity, Project, Stored, optional_text_field, take_float, take_text, text_field,
    unknown_field,
};
use crate::domain::field::{FieldKind, FieldSpec, FieldValue, IdSyntax};
use crate::domain::ports::{IndexKey, IndexName};
use crate::domain::{Doctype, DocumentMeta, EntityConfig, DomainError};

/// Sample processing states.
pub const SAMPLE_STATUSES: &[&str] = &["NEW", "RUNNING", "DONE", "FAILED", "ABORTED"];
/// Sample analysis states.
pub const ANALYSIS_STATUSES: &[&str] = &["TO_ANALYZE", "UNDER_ANALYSIS", "ANALYZED", "FAILED"];
/// Sample QC states.
pub const QC_STATUSES: &[&str] = &["NEW", "RUNNING", "DONE", "FAILED"];
/// Sample genotyping states.
pub const GENOTYPING_STATUSES: &[&str] = &["ARRIVED", "PROCESSED"];

/// Key of the rolled-up autosomal coverage total.
pub const TOTAL_AUTOSOMAL_COVERAGE: &str = "total_autosomal_coverage";
/// Key of the rolled-up read count total.
pub const TOTAL_SEQUENCED_READS: &str = "total_sequenced_reads";

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new(
        "sampleid",
        FieldKind::Identifier {
            index: IndexName::SampleId,
            syntax: IdSyntax::Code,
        },
    )
    .mandatory()
    .immutable(),
    FieldSpec::new("status", FieldKind::Choice(SAMPLE_STATUSES)).with_text_default("NEW"),
    FieldSpec::new("analysis_status", FieldKind::Choice(ANALYSIS_STATUSES))
        .with_text_default("TO_ANALYZE"),
    FieldSpec::new("qc_status", FieldKind::Choice(QC_STATUSES)).with_text_default("NEW"),
    FieldSpec::new("genotyping_status", FieldKind::Choice(GENOTYPING_STATUSES)),
    FieldSpec::measure(TOTAL_AUTOSOMAL_COVERAGE),
    FieldSpec::measure(TOTAL_SEQUENCED_READS),
];

/// A sample, unique by `sampleid` within its project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Document metadata.
    #[serde(flatten)]
    pub meta: DocumentMeta,
    /// Sample identifier, unique within the project.
    #[serde(default)]
    pub sampleid: String,
    /// Owning project.
    #[serde(default)]
    pub projectid: String,
    /// Processing state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Analysis state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_status: Option<String>,
    /// QC state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qc_status: Option<String>,
    /// Genotyping state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genotyping_status: Option<String>,
    /// Sum of seqrun `mean_autosomal_coverage`.
    #[serde(default)]
    pub total_autosomal_coverage: f64,
    /// Sum of seqrun `total_reads`.
    #[serde(default)]
    pub total_sequenced_reads: f64,
}

impl Sample {
    /// Unsaved sample bound to `project`.
    #[must_use]
    pub fn draft(project: &Project, created: DateTime<Utc>) -> Self {
        Self {
            meta: DocumentMeta::fresh(Doctype::Sample, created),
            sampleid: String::new(),
            projectid: project.projectid.clone(),
            status: None,
            analysis_status: None,
            qc_status: None,
            genotyping_status: None,
            total_autosomal_coverage: 0.0,
            total_sequenced_reads: 0.0,
        }
    }
}

impl Stored for Sample {
    const DOCTYPE: Doctype = Doctype::Sample;

    fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut DocumentMeta {
        &mut self.meta
    }
}

impl Entity for Sample {
    fn field_specs(_config: &EntityConfig) -> &'static [FieldSpec] {
        FIELDS
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "sampleid" => text_field(&self.sampleid),
            "status" => optional_text_field(self.status.as_ref()),
            "analysis_status" => optional_text_field(self.analysis_status.as_ref()),
            "qc_status" => optional_text_field(self.qc_status.as_ref()),
            "genotyping_status" => optional_text_field(self.genotyping_status.as_ref()),
            TOTAL_AUTOSOMAL_COVERAGE => Some(FieldValue::Float(self.total_autosomal_coverage)),
            TOTAL_SEQUENCED_READS => Some(FieldValue::Float(self.total_sequenced_reads)),
            _ => None,
        }
    }

    fn set_field(&mut self, key: &str, value: Option<FieldValue>) -> Result<(), DomainError> {
        match key {
            TOTAL_AUTOSOMAL_COVERAGE => {
                self.total_autosomal_coverage = take_float(Doctype::Sample, key, value)?;
            }
            TOTAL_SEQUENCED_READS => {
                self.total_sequenced_reads = take_float(Doctype::Sample, key, value)?;
            }
            _ => {
                let text = take_text(Doctype::Sample, key, value)?;
                match key {
                    "sampleid" => self.sampleid = text.unwrap_or_default(),
                    "status" => self.status = text,
                    "analysis_status" => self.analysis_status = text,
                    "qc_status" => self.qc_status = text,
                    "genotyping_status" => self.genotyping_status = text,
                    _ => return unknown_field(Doctype::Sample, key),
                }
            }
        }
        Ok(())
    }

    fn scope(&self) -> IndexKey {
        IndexKey::new([self.projectid.as_str()])
    }
}
