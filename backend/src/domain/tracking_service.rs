//! Tracking services implementing the entity driving ports.
//!
//! Each port call opens its own [`RequestContext`], so the query cache lives
//! exactly as long as the call. Seqrun writes and libprep deletes finish by
//! re-rolling the owning sample's totals.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::{Map, Value};

use crate::domain::context::map_store_error;
use crate::domain::entities::{API_TOKEN, Entity};
use crate::domain::field::JsonPayload;
use crate::domain::hierarchy::{self, DeleteReport};
use crate::domain::ports::{
    DocumentStore, IndexKey, IndexName, LibPrepPath, LibPrepScope, ProjectPath, SamplePath,
    SaveRequest, SeqRunPath, SeqRunScope, TrackingCommand, TrackingQuery,
};
use crate::domain::rollup::rollup_sample;
use crate::domain::{
    DocId, Doctype, Document, DomainError, EntityConfig, LibPrep, LogEntry, Operator, Project,
    RequestContext, Sample, Saver, SeqRun, audit,
};

async fn create<E: Entity>(
    ctx: &RequestContext,
    draft: E,
    fields: &Map<String, Value>,
) -> Result<E, DomainError> {
    let mut saver = Saver::create(ctx, draft);
    saver.apply(&JsonPayload(fields)).await?;
    saver.commit().await
}

async fn update<E: Entity>(
    ctx: &RequestContext,
    entity: E,
    fields: &Map<String, Value>,
) -> Result<E, DomainError> {
    let mut saver = Saver::update(ctx, entity);
    saver.apply(&JsonPayload(fields)).await?;
    saver.commit().await
}

/// Tracking service implementing [`TrackingCommand`] and [`TrackingQuery`].
#[derive(Clone)]
pub struct TrackingService {
    store: Arc<dyn DocumentStore>,
    config: EntityConfig,
    clock: Arc<dyn Clock>,
}

impl TrackingService {
    /// Create a service over the given store.
    #[must_use]
    pub const fn new(store: Arc<dyn DocumentStore>, config: EntityConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            config,
            clock,
        }
    }

    fn context(&self, operator: Option<Operator>) -> RequestContext {
        RequestContext::new(self.store.clone(), self.config, self.clock.clone())
            .with_operator(operator)
    }
}

#[async_trait]
impl TrackingCommand for TrackingService {
    async fn create_project(&self, request: SaveRequest) -> Result<Project, DomainError> {
        let ctx = self.context(request.operator);
        create(&ctx, Project::draft(ctx.now()), &request.fields).await
    }

    async fn update_project(
        &self,
        path: &ProjectPath,
        request: SaveRequest,
    ) -> Result<Project, DomainError> {
        let ctx = self.context(request.operator);
        let project = hierarchy::get_project(&ctx, &path.projectid).await?;
        update(&ctx, project, &request.fields).await
    }

    async fn delete_project(&self, path: &ProjectPath) -> Result<DeleteReport, DomainError> {
        let ctx = self.context(None);
        let project = hierarchy::get_project(&ctx, &path.projectid).await?;
        hierarchy::delete_project(&ctx, &project).await
    }

    async fn create_sample(
        &self,
        parent: &ProjectPath,
        request: SaveRequest,
    ) -> Result<Sample, DomainError> {
        let ctx = self.context(request.operator);
        let project = hierarchy::get_project(&ctx, &parent.projectid).await?;
        create(&ctx, Sample::draft(&project, ctx.now()), &request.fields).await
    }

    async fn update_sample(
        &self,
        path: &SamplePath,
        request: SaveRequest,
    ) -> Result<Sample, DomainError> {
        let ctx = self.context(request.operator);
        let sample = hierarchy::get_sample(&ctx, &path.projectid, &path.sampleid).await?;
        update(&ctx, sample, &request.fields).await
    }

    async fn delete_sample(&self, path: &SamplePath) -> Result<DeleteReport, DomainError> {
        let ctx = self.context(None);
        let sample = hierarchy::get_sample(&ctx, &path.projectid, &path.sampleid).await?;
        hierarchy::delete_sample(&ctx, &sample).await
    }

    async fn create_libprep(
        &self,
        parent: &SamplePath,
        request: SaveRequest,
    ) -> Result<LibPrep, DomainError> {
        let ctx = self.context(request.operator);
        let sample = hierarchy::get_sample(&ctx, &parent.projectid, &parent.sampleid).await?;
        create(&ctx, LibPrep::draft(&sample, ctx.now()), &request.fields).await
    }

    async fn update_libprep(
        &self,
        path: &LibPrepPath,
        request: SaveRequest,
    ) -> Result<LibPrep, DomainError> {
        let ctx = self.context(request.operator);
        let libprep =
            hierarchy::get_libprep(&ctx, &path.projectid, &path.sampleid, &path.libprepid).await?;
        update(&ctx, libprep, &request.fields).await
    }

    async fn delete_libprep(&self, path: &LibPrepPath) -> Result<DeleteReport, DomainError> {
        let ctx = self.context(None);
        let libprep =
            hierarchy::get_libprep(&ctx, &path.projectid, &path.sampleid, &path.libprepid).await?;
        let report = hierarchy::delete_libprep(&ctx, &libprep).await?;
        rollup_sample(&ctx, &path.projectid, &path.sampleid).await?;
        Ok(report)
    }

    async fn create_seqrun(
        &self,
        parent: &LibPrepPath,
        request: SaveRequest,
    ) -> Result<SeqRun, DomainError> {
        let ctx = self.context(request.operator);
        let libprep = hierarchy::get_libprep(
            &ctx,
            &parent.projectid,
            &parent.sampleid,
            &parent.libprepid,
        )
        .await?;
        let seqrun = create(&ctx, SeqRun::draft(&libprep, ctx.now()), &request.fields).await?;
        rollup_sample(&ctx, &seqrun.projectid, &seqrun.sampleid).await?;
        Ok(seqrun)
    }

    async fn update_seqrun(
        &self,
        path: &SeqRunPath,
        request: SaveRequest,
    ) -> Result<SeqRun, DomainError> {
        let ctx = self.context(request.operator);
        let stored = hierarchy::get_seqrun(
            &ctx,
            &path.projectid,
            &path.sampleid,
            &path.libprepid,
            &path.seqrunid,
        )
        .await?;
        let seqrun = update(&ctx, stored, &request.fields).await?;
        rollup_sample(&ctx, &seqrun.projectid, &seqrun.sampleid).await?;
        Ok(seqrun)
    }

    async fn delete_seqrun(&self, path: &SeqRunPath) -> Result<DeleteReport, DomainError> {
        let ctx = self.context(None);
        let seqrun = hierarchy::get_seqrun(
            &ctx,
            &path.projectid,
            &path.sampleid,
            &path.libprepid,
            &path.seqrunid,
        )
        .await?;
        let report = hierarchy::delete_seqrun(&ctx, &seqrun).await?;
        rollup_sample(&ctx, &path.projectid, &path.sampleid).await?;
        Ok(report)
    }
}

#[async_trait]
impl TrackingQuery for TrackingService {
    async fn project(&self, path: &ProjectPath) -> Result<Project, DomainError> {
        let ctx = self.context(None);
        hierarchy::get_project(&ctx, &path.projectid).await
    }

    async fn projects(&self) -> Result<Vec<Project>, DomainError> {
        let ctx = self.context(None);
        hierarchy::list(&ctx, IndexName::ProjectId, IndexKey::new(Vec::<String>::new())).await
    }

    async fn sample(&self, path: &SamplePath) -> Result<Sample, DomainError> {
        let ctx = self.context(None);
        hierarchy::get_sample(&ctx, &path.projectid, &path.sampleid).await
    }

    async fn samples(&self, parent: &ProjectPath) -> Result<Vec<Sample>, DomainError> {
        let ctx = self.context(None);
        hierarchy::get_project(&ctx, &parent.projectid).await?;
        hierarchy::list(
            &ctx,
            IndexName::SampleId,
            IndexKey::new([parent.projectid.as_str()]),
        )
        .await
    }

    async fn libprep(&self, path: &LibPrepPath) -> Result<LibPrep, DomainError> {
        let ctx = self.context(None);
        hierarchy::get_libprep(&ctx, &path.projectid, &path.sampleid, &path.libprepid).await
    }

    async fn libpreps(&self, scope: &LibPrepScope) -> Result<Vec<LibPrep>, DomainError> {
        let ctx = self.context(None);
        let mut prefix = IndexKey::new([scope.projectid.as_str()]);
        match &scope.sampleid {
            Some(sampleid) => {
                hierarchy::get_sample(&ctx, &scope.projectid, sampleid).await?;
                prefix = prefix.with(sampleid.as_str());
            }
            None => {
                hierarchy::get_project(&ctx, &scope.projectid).await?;
            }
        }
        hierarchy::list(&ctx, IndexName::LibPrepId, prefix).await
    }

    async fn seqrun(&self, path: &SeqRunPath) -> Result<SeqRun, DomainError> {
        let ctx = self.context(None);
        hierarchy::get_seqrun(
            &ctx,
            &path.projectid,
            &path.sampleid,
            &path.libprepid,
            &path.seqrunid,
        )
        .await
    }

    async fn seqruns(&self, scope: &SeqRunScope) -> Result<Vec<SeqRun>, DomainError> {
        let ctx = self.context(None);
        let projectid = scope.projectid.as_str();
        let prefix = match (scope.sampleid.as_deref(), scope.libprepid.as_deref()) {
            (None, None) => {
                hierarchy::get_project(&ctx, projectid).await?;
                IndexKey::new([projectid])
            }
            (Some(sampleid), None) => {
                hierarchy::get_sample(&ctx, projectid, sampleid).await?;
                IndexKey::new([projectid, sampleid])
            }
            (Some(sampleid), Some(libprepid)) => {
                hierarchy::get_libprep(&ctx, projectid, sampleid, libprepid).await?;
                IndexKey::new([projectid, sampleid, libprepid])
            }
            (None, Some(_)) => {
                return Err(DomainError::invalid_request(
                    "a libprep scope needs its sample",
                ));
            }
        };
        hierarchy::list(&ctx, IndexName::SeqRunId, prefix).await
    }

    async fn logs(&self, owner: &DocId) -> Result<Vec<LogEntry>, DomainError> {
        let ctx = self.context(None);
        ctx.store().get(owner).await.map_err(map_store_error)?;
        audit::entries_for(&ctx, owner).await
    }

    async fn document(&self, id: &DocId) -> Result<Value, DomainError> {
        let ctx = self.context(None);
        let Document {
            doctype, mut body, ..
        } = ctx.store().get(id).await.map_err(map_store_error)?;
        if let (Doctype::User, Value::Object(fields)) = (doctype, &mut body) {
            fields.remove(API_TOKEN);
        }
        Ok(body)
    }
}

#[cfg(test)]
#[path = "tracking_service_tests.rs"]
mod tests;
