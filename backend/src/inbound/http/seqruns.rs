//! Seqrun HTTP handlers.
//!
//! ```text
//! POST   /api/v1/seqrun/{projectid}/{sampleid}/{libprepid}
//! GET    /api/v1/seqrun/{projectid}/{sampleid}/{libprepid}/{seqrunid}
//! PUT    /api/v1/seqrun/{projectid}/{sampleid}/{libprepid}/{seqrunid}
//! DELETE /api/v1/seqrun/{projectid}/{sampleid}/{libprepid}/{seqrunid}
//! GET    /api/v1/seqruns/{projectid}[/{sampleid}[/{libprepid}]]
//! ```
//!
//! Every write re-rolls the owning sample's totals before responding.

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use serde_json::Value;

use crate::domain::SeqRun;
use crate::domain::ports::{LibPrepPath, ProjectPath, SamplePath, SeqRunPath, SeqRunScope};
use crate::inbound::http::ApiResult;
use crate::inbound::http::payload::{created, save_request};
use crate::inbound::http::state::HttpState;

/// Create a seqrun under a libprep.
///
/// Under the `position` policy the server assigns `seqrunid`; under `runid`
/// the body must carry it.
#[post("/seqrun/{projectid}/{sampleid}/{libprepid}")]
pub async fn create_seqrun(
    state: web::Data<HttpState>,
    req: HttpRequest,
    parent: web::Path<LibPrepPath>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let request = save_request(&req, payload.into_inner())?;
    let seqrun = state.tracking.create_seqrun(&parent, request).await?;
    let location = parent.seqrun(seqrun.seqrunid.as_str());
    Ok(created(&format!("/seqrun/{location}"), &seqrun))
}

/// Fetch one seqrun.
#[get("/seqrun/{projectid}/{sampleid}/{libprepid}/{seqrunid}")]
pub async fn get_seqrun(
    state: web::Data<HttpState>,
    path: web::Path<SeqRunPath>,
) -> ApiResult<web::Json<SeqRun>> {
    let seqrun = state.tracking_query.seqrun(&path).await?;
    Ok(web::Json(seqrun))
}

/// Update a seqrun; the sample totals are recomputed.
#[put("/seqrun/{projectid}/{sampleid}/{libprepid}/{seqrunid}")]
pub async fn update_seqrun(
    state: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<SeqRunPath>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let request = save_request(&req, payload.into_inner())?;
    state.tracking.update_seqrun(&path, request).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete a seqrun; the sample totals are recomputed.
#[delete("/seqrun/{projectid}/{sampleid}/{libprepid}/{seqrunid}")]
pub async fn delete_seqrun(
    state: web::Data<HttpState>,
    path: web::Path<SeqRunPath>,
) -> ApiResult<HttpResponse> {
    state.tracking.delete_seqrun(&path).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn list(state: &HttpState, scope: &SeqRunScope) -> ApiResult<web::Json<Vec<SeqRun>>> {
    let seqruns = state.tracking_query.seqruns(scope).await?;
    Ok(web::Json(seqruns))
}

/// Seqruns of a project.
#[get("/seqruns/{projectid}")]
pub async fn list_project_seqruns(
    state: web::Data<HttpState>,
    project: web::Path<ProjectPath>,
) -> ApiResult<web::Json<Vec<SeqRun>>> {
    let ProjectPath { projectid } = project.into_inner();
    list(
        &state,
        &SeqRunScope {
            projectid,
            sampleid: None,
            libprepid: None,
        },
    )
    .await
}

/// Seqruns of a sample.
#[get("/seqruns/{projectid}/{sampleid}")]
pub async fn list_sample_seqruns(
    state: web::Data<HttpState>,
    sample: web::Path<SamplePath>,
) -> ApiResult<web::Json<Vec<SeqRun>>> {
    let SamplePath {
        projectid,
        sampleid,
    } = sample.into_inner();
    list(
        &state,
        &SeqRunScope {
            projectid,
            sampleid: Some(sampleid),
            libprepid: None,
        },
    )
    .await
}

/// Seqruns of a libprep.
#[get("/seqruns/{projectid}/{sampleid}/{libprepid}")]
pub async fn list_libprep_seqruns(
    state: web::Data<HttpState>,
    libprep: web::Path<LibPrepPath>,
) -> ApiResult<web::Json<Vec<SeqRun>>> {
    let LibPrepPath {
        projectid,
        sampleid,
        libprepid,
    } = libprep.into_inner();
    list(
        &state,
        &SeqRunScope {
            projectid,
            sampleid: Some(sampleid),
            libprepid: Some(libprepid),
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use actix_web::http::{StatusCode, header};
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::{DeleteReport, DomainError, LibPrep, Project, Sample};
    use crate::inbound::http::test_utils::{MockPorts, test_app};
    use crate::test_support::fixture_timestamp;

    fn stored_seqrun(seqrunid: &str, total_reads: f64) -> SeqRun {
        let mut project = Project::draft(fixture_timestamp());
        "P0".clone_into(&mut project.projectid);
        let mut sample = Sample::draft(&project, fixture_timestamp());
        "S1".clone_into(&mut sample.sampleid);
        let mut libprep = LibPrep::draft(&sample, fixture_timestamp());
        "A".clone_into(&mut libprep.libprepid);
        let mut seqrun = SeqRun::draft(&libprep, fixture_timestamp());
        seqrunid.clone_into(&mut seqrun.seqrunid);
        seqrun.total_reads = total_reads;
        seqrun
    }

    #[actix_web::test]
    async fn create_reports_the_assigned_position() {
        let mut ports = MockPorts::default();
        ports
            .tracking
            .expect_create_seqrun()
            .withf(|parent, request| {
                parent == &ProjectPath::new("P0").sample("S1").libprep("A")
                    && request.fields.get("total_reads") == Some(&json!(100))
            })
            .times(1)
            .returning(|_, _| Ok(stored_seqrun("1", 100.0)));
        let app = actix_test::init_service(test_app(ports)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/seqrun/P0/S1/A")
            .set_json(json!({"total_reads": 100}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response
                .headers()
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok()),
            Some("/api/v1/seqrun/P0/S1/A/1")
        );
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body.get("seqrunid"), Some(&json!("1")));
        assert_eq!(body.get("total_reads"), Some(&json!(100.0)));
    }

    #[rstest]
    #[case("/api/v1/seqruns/P0", None, None)]
    #[case("/api/v1/seqruns/P0/S1", Some("S1"), None)]
    #[case("/api/v1/seqruns/P0/S1/A", Some("S1"), Some("A"))]
    #[actix_web::test]
    async fn listings_narrow_by_path_depth(
        #[case] uri: &str,
        #[case] sampleid: Option<&'static str>,
        #[case] libprepid: Option<&'static str>,
    ) {
        let mut ports = MockPorts::default();
        ports
            .tracking_query
            .expect_seqruns()
            .withf(move |scope| {
                scope.projectid == "P0"
                    && scope.sampleid.as_deref() == sampleid
                    && scope.libprepid.as_deref() == libprepid
            })
            .times(1)
            .returning(|_| Ok(vec![stored_seqrun("1", 100.0), stored_seqrun("2", 50.0)]));
        let app = actix_test::init_service(test_app(ports)).await;

        let request = actix_test::TestRequest::get().uri(uri).to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, request).await;

        assert_eq!(body.as_array().map(Vec::len), Some(2));
    }

    #[actix_web::test]
    async fn stale_update_is_conflict() {
        let mut ports = MockPorts::default();
        ports
            .tracking
            .expect_update_seqrun()
            .times(1)
            .returning(|path, _| Err(DomainError::conflict(format!("seqrun {path} changed concurrently"))));
        let app = actix_test::init_service(test_app(ports)).await;

        let request = actix_test::TestRequest::put()
            .uri("/api/v1/seqrun/P0/S1/A/1")
            .set_json(json!({"total_reads": 75}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn delete_returns_no_content() {
        let mut ports = MockPorts::default();
        ports
            .tracking
            .expect_delete_seqrun()
            .withf(|path| path.seqrunid == "1")
            .times(1)
            .returning(|_| Ok(DeleteReport::default()));
        let app = actix_test::init_service(test_app(ports)).await;

        let request = actix_test::TestRequest::delete()
            .uri("/api/v1/seqrun/P0/S1/A/1")
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn store_outage_is_service_unavailable() {
        let mut ports = MockPorts::default();
        ports
            .tracking_query
            .expect_seqrun()
            .times(1)
            .returning(|_| Err(DomainError::service_unavailable("document store unavailable")));
        let app = actix_test::init_service(test_app(ports)).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/seqrun/P0/S1/A/1")
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
