//! Parent resolution, scoped uniqueness and cascading delete.
//!
//! Parents are addressed by their identifier chain and resolved through the
//! scoped secondary indexes. Deletes run leaf-first (seqruns, libpreps,
//! samples, then the project), each document's log entries going before the
//! document itself. The store has no multi-document transaction, so an
//! interrupted cascade leaves the remaining descendants in place.

use std::ops::AddAssign;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::audit;
use crate::domain::context::map_store_error;
use crate::domain::entities::{LibPrep, Project, Sample, SeqRun, Stored, from_document};
use crate::domain::ports::{IndexKey, IndexName, KeyRange};
use crate::domain::{DocId, DomainError, RequestContext};

/// Counts of documents removed by a delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    /// Entity documents removed, including the target.
    pub documents: usize,
    /// Log entries removed.
    pub logs: usize,
}

impl AddAssign for DeleteReport {
    fn add_assign(&mut self, other: Self) {
        self.documents += other.documents;
        self.logs += other.logs;
    }
}

/// Entity stored under exactly `key` in `index`, if any.
pub async fn find_one<S: Stored>(
    ctx: &RequestContext,
    index: IndexName,
    key: IndexKey,
) -> Result<Option<S>, DomainError> {
    let rows = ctx.cached_range(index, &KeyRange::exact(key)).await?;
    rows.into_iter()
        .next()
        .map(|row| from_document(row.document))
        .transpose()
}

/// Every entity whose key in `index` extends `prefix`, in key order.
pub async fn list<S: Stored>(
    ctx: &RequestContext,
    index: IndexName,
    prefix: IndexKey,
) -> Result<Vec<S>, DomainError> {
    ctx.cached_range(index, &KeyRange::prefix(prefix))
        .await?
        .into_iter()
        .map(|row| from_document(row.document))
        .collect()
}

async fn children<S: Stored>(
    ctx: &RequestContext,
    index: IndexName,
    scope: IndexKey,
) -> Result<Vec<S>, DomainError> {
    ctx.fresh_range(index, &KeyRange::prefix(scope))
        .await?
        .into_iter()
        .map(|row| from_document(row.document))
        .collect()
}

/// Resolve a project by `projectid`.
pub async fn get_project(ctx: &RequestContext, projectid: &str) -> Result<Project, DomainError> {
    find_one(ctx, IndexName::ProjectId, IndexKey::new([projectid]))
        .await?
        .ok_or_else(|| DomainError::not_found(format!("project {projectid} not found")))
}

/// Resolve a sample and its project.
pub async fn get_sample(
    ctx: &RequestContext,
    projectid: &str,
    sampleid: &str,
) -> Result<Sample, DomainError> {
    get_project(ctx, projectid).await?;
    find_one(ctx, IndexName::SampleId, IndexKey::new([projectid, sampleid]))
        .await?
        .ok_or_else(|| DomainError::not_found(format!("sample {projectid}/{sampleid} not found")))
}

/// Resolve a libprep and its parent chain.
pub async fn get_libprep(
    ctx: &RequestContext,
    projectid: &str,
    sampleid: &str,
    libprepid: &str,
) -> Result<LibPrep, DomainError> {
    get_sample(ctx, projectid, sampleid).await?;
    find_one(
        ctx,
        IndexName::LibPrepId,
        IndexKey::new([projectid, sampleid, libprepid]),
    )
    .await?
    .ok_or_else(|| {
        DomainError::not_found(format!(
            "libprep {projectid}/{sampleid}/{libprepid} not found"
        ))
    })
}

/// Resolve a seqrun and its parent chain.
pub async fn get_seqrun(
    ctx: &RequestContext,
    projectid: &str,
    sampleid: &str,
    libprepid: &str,
    seqrunid: &str,
) -> Result<SeqRun, DomainError> {
    get_libprep(ctx, projectid, sampleid, libprepid).await?;
    find_one(
        ctx,
        IndexName::SeqRunId,
        IndexKey::new([projectid, sampleid, libprepid, seqrunid]),
    )
    .await?
    .ok_or_else(|| {
        DomainError::not_found(format!(
            "seqrun {projectid}/{sampleid}/{libprepid}/{seqrunid} not found"
        ))
    })
}

/// Fail when a document other than `own_id` already holds `value` under
/// `scope` in `index`.
///
/// The check and the later commit are separate store calls; two concurrent
/// creates of the same identifier can both pass it.
pub async fn ensure_unique(
    ctx: &RequestContext,
    field: &str,
    index: IndexName,
    scope: IndexKey,
    value: &str,
    own_id: &DocId,
) -> Result<(), DomainError> {
    let rows = ctx
        .fresh_range(index, &KeyRange::exact(scope.with(value)))
        .await?;
    if rows.iter().any(|row| &row.document.id != own_id) {
        return Err(DomainError::invalid_field(
            field,
            "duplicate",
            format!("{field} {value} is already in use"),
        ));
    }
    Ok(())
}

/// One past the highest numeric position under `scope` in `index`.
pub async fn next_position(
    ctx: &RequestContext,
    index: IndexName,
    scope: IndexKey,
) -> Result<String, DomainError> {
    let depth = scope.len();
    let rows = ctx.fresh_range(index, &KeyRange::prefix(scope)).await?;
    let highest = rows
        .iter()
        .filter_map(|row| row.key.text(depth))
        .filter_map(|position| position.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    Ok((highest + 1).to_string())
}

async fn remove<S: Stored>(ctx: &RequestContext, entity: &S) -> Result<DeleteReport, DomainError> {
    let id = &entity.meta().id;
    let logs = audit::purge(ctx, id).await?;
    ctx.store().delete(id).await.map_err(map_store_error)?;
    ctx.invalidate();
    debug!(doctype = %S::DOCTYPE, id = %id, logs, "document deleted");
    Ok(DeleteReport { documents: 1, logs })
}

fn interrupted(what: &str, progress: DeleteReport, error: &DomainError) {
    warn!(
        entity = what,
        documents = progress.documents,
        logs = progress.logs,
        error = %error,
        "cascading delete interrupted; descendants may be orphaned"
    );
}

/// Delete a seqrun and its log entries.
pub async fn delete_seqrun(ctx: &RequestContext, seqrun: &SeqRun) -> Result<DeleteReport, DomainError> {
    remove(ctx, seqrun).await
}

/// Delete a libprep, its seqruns and all their log entries.
pub async fn delete_libprep(
    ctx: &RequestContext,
    libprep: &LibPrep,
) -> Result<DeleteReport, DomainError> {
    let mut report = DeleteReport::default();
    let seqruns: Vec<SeqRun> = children(
        ctx,
        IndexName::SeqRunId,
        IndexKey::new([
            libprep.projectid.as_str(),
            libprep.sampleid.as_str(),
            libprep.libprepid.as_str(),
        ]),
    )
    .await?;
    for seqrun in &seqruns {
        match delete_seqrun(ctx, seqrun).await {
            Ok(part) => report += part,
            Err(err) => {
                interrupted(&libprep.libprepid, report, &err);
                return Err(err);
            }
        }
    }
    report += remove(ctx, libprep).await?;
    Ok(report)
}

/// Delete a sample, its libpreps, their seqruns and all log entries.
pub async fn delete_sample(ctx: &RequestContext, sample: &Sample) -> Result<DeleteReport, DomainError> {
    let mut report = DeleteReport::default();
    let libpreps: Vec<LibPrep> = children(
        ctx,
        IndexName::LibPrepId,
        IndexKey::new([sample.projectid.as_str(), sample.sampleid.as_str()]),
    )
    .await?;
    for libprep in &libpreps {
        match delete_libprep(ctx, libprep).await {
            Ok(part) => report += part,
            Err(err) => {
                interrupted(&sample.sampleid, report, &err);
                return Err(err);
            }
        }
    }
    report += remove(ctx, sample).await?;
    Ok(report)
}

/// Delete a project and everything beneath it.
pub async fn delete_project(
    ctx: &RequestContext,
    project: &Project,
) -> Result<DeleteReport, DomainError> {
    let mut report = DeleteReport::default();
    let samples: Vec<Sample> = children(
        ctx,
        IndexName::SampleId,
        IndexKey::new([project.projectid.as_str()]),
    )
    .await?;
    for sample in &samples {
        match delete_sample(ctx, sample).await {
            Ok(part) => report += part,
            Err(err) => {
                interrupted(&project.projectid, report, &err);
                return Err(err);
            }
        }
    }
    report += remove(ctx, project).await?;
    info!(
        projectid = %project.projectid,
        documents = report.documents,
        logs = report.logs,
        "project deleted"
    );
    Ok(report)
}

#[cfg(test)]
#[path = "hierarchy_tests.rs"]
mod tests;
