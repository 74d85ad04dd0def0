//! Driving port for entity mutations.
//!
//! Creates return the stored entity; updates return it after the commit (or
//! unchanged when nothing differed); deletes cascade and report what went.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{LibPrepPath, ProjectPath, SamplePath, SeqRunPath};
use crate::domain::{DeleteReport, DomainError, LibPrep, Operator, Project, Sample, SeqRun};

/// Field values submitted for one create or update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveRequest {
    /// Acting operator, recorded on the log entry.
    pub operator: Option<Operator>,
    /// Raw field values keyed by field name; `null` clears a field.
    pub fields: Map<String, Value>,
}

impl SaveRequest {
    /// Request carrying `fields` on behalf of `operator`.
    #[must_use]
    pub const fn new(operator: Option<Operator>, fields: Map<String, Value>) -> Self {
        Self { operator, fields }
    }
}

/// Driving port for project, sample, libprep and seqrun writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrackingCommand: Send + Sync {
    /// Create a project.
    async fn create_project(&self, request: SaveRequest) -> Result<Project, DomainError>;

    /// Update a project's editable fields.
    async fn update_project(
        &self,
        path: &ProjectPath,
        request: SaveRequest,
    ) -> Result<Project, DomainError>;

    /// Delete a project and everything beneath it.
    async fn delete_project(&self, path: &ProjectPath) -> Result<DeleteReport, DomainError>;

    /// Create a sample in a project.
    async fn create_sample(
        &self,
        parent: &ProjectPath,
        request: SaveRequest,
    ) -> Result<Sample, DomainError>;

    /// Update a sample's editable fields.
    async fn update_sample(&self, path: &SamplePath, request: SaveRequest)
    -> Result<Sample, DomainError>;

    /// Delete a sample and everything beneath it.
    async fn delete_sample(&self, path: &SamplePath) -> Result<DeleteReport, DomainError>;

    /// Create a libprep in a sample.
    async fn create_libprep(
        &self,
        parent: &SamplePath,
        request: SaveRequest,
    ) -> Result<LibPrep, DomainError>;

    /// Update a libprep's editable fields.
    async fn update_libprep(
        &self,
        path: &LibPrepPath,
        request: SaveRequest,
    ) -> Result<LibPrep, DomainError>;

    /// Delete a libprep and its seqruns, then re-roll the sample totals.
    async fn delete_libprep(&self, path: &LibPrepPath) -> Result<DeleteReport, DomainError>;

    /// Create a seqrun in a libprep, then re-roll the sample totals.
    ///
    /// The seqrun commit and the sample rollup are separate writes. When a
    /// concurrent writer moves the sample on between them, the call fails
    /// with a conflict although the seqrun is already stored. Callers should
    /// re-read the libprep's seqruns before retrying: under the position
    /// policy a blind retry creates a second seqrun.
    async fn create_seqrun(
        &self,
        parent: &LibPrepPath,
        request: SaveRequest,
    ) -> Result<SeqRun, DomainError>;

    /// Update a seqrun, then re-roll the sample totals.
    ///
    /// As with [`TrackingCommand::create_seqrun`], a conflict from the
    /// rollup leaves the seqrun change committed; re-read before retrying.
    async fn update_seqrun(&self, path: &SeqRunPath, request: SaveRequest)
    -> Result<SeqRun, DomainError>;

    /// Delete a seqrun, then re-roll the sample totals.
    ///
    /// A conflict from the rollup arrives after the seqrun is gone; a retry
    /// then reports it as not found.
    async fn delete_seqrun(&self, path: &SeqRunPath) -> Result<DeleteReport, DomainError>;
}
