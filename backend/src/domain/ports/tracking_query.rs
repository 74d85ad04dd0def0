//! Driving port for entity reads.

use async_trait::async_trait;
use serde_json::Value;

use super::{LibPrepPath, LibPrepScope, ProjectPath, SamplePath, SeqRunPath, SeqRunScope};
use crate::domain::{DocId, DomainError, LibPrep, LogEntry, Project, Sample, SeqRun};

/// Driving port for reading the hierarchy and its audit log.
///
/// Lists come back in identifier order; log entries newest first.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrackingQuery: Send + Sync {
    /// Project at `path`.
    async fn project(&self, path: &ProjectPath) -> Result<Project, DomainError>;

    /// Every project.
    async fn projects(&self) -> Result<Vec<Project>, DomainError>;

    /// Sample at `path`; a missing project is reported first.
    async fn sample(&self, path: &SamplePath) -> Result<Sample, DomainError>;

    /// Samples of an existing project.
    async fn samples(&self, parent: &ProjectPath) -> Result<Vec<Sample>, DomainError>;

    /// Libprep at `path`.
    async fn libprep(&self, path: &LibPrepPath) -> Result<LibPrep, DomainError>;

    /// Libpreps of a project, or of one sample when the scope names it.
    async fn libpreps(&self, scope: &LibPrepScope) -> Result<Vec<LibPrep>, DomainError>;

    /// Seqrun at `path`.
    async fn seqrun(&self, path: &SeqRunPath) -> Result<SeqRun, DomainError>;

    /// Seqruns under a project, sample or libprep.
    async fn seqruns(&self, scope: &SeqRunScope) -> Result<Vec<SeqRun>, DomainError>;

    /// Audit entries of any document, newest first.
    async fn logs(&self, owner: &DocId) -> Result<Vec<LogEntry>, DomainError>;

    /// Stored body of any document, including `_id`, `_rev` and `doctype`.
    ///
    /// Account documents come back without their API token.
    async fn document(&self, id: &DocId) -> Result<Value, DomainError>;
}
