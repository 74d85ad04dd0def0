//! Libprep HTTP handlers.
//!
//! ```text
//! POST   /api/v1/libprep/{projectid}/{sampleid}
//! GET    /api/v1/libprep/{projectid}/{sampleid}/{libprepid}
//! PUT    /api/v1/libprep/{projectid}/{sampleid}/{libprepid}
//! DELETE /api/v1/libprep/{projectid}/{sampleid}/{libprepid}
//! GET    /api/v1/libpreps/{projectid}
//! GET    /api/v1/libpreps/{projectid}/{sampleid}
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use serde_json::Value;

use crate::domain::LibPrep;
use crate::domain::ports::{LibPrepPath, LibPrepScope, ProjectPath, SamplePath};
use crate::inbound::http::ApiResult;
use crate::inbound::http::payload::{created, save_request};
use crate::inbound::http::state::HttpState;

/// Create a libprep under a sample.
#[post("/libprep/{projectid}/{sampleid}")]
pub async fn create_libprep(
    state: web::Data<HttpState>,
    req: HttpRequest,
    parent: web::Path<SamplePath>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let request = save_request(&req, payload.into_inner())?;
    let libprep = state.tracking.create_libprep(&parent, request).await?;
    let location = parent.libprep(libprep.libprepid.as_str());
    Ok(created(&format!("/libprep/{location}"), &libprep))
}

/// Fetch one libprep.
#[get("/libprep/{projectid}/{sampleid}/{libprepid}")]
pub async fn get_libprep(
    state: web::Data<HttpState>,
    path: web::Path<LibPrepPath>,
) -> ApiResult<web::Json<LibPrep>> {
    let libprep = state.tracking_query.libprep(&path).await?;
    Ok(web::Json(libprep))
}

/// Update the posted fields of a libprep.
#[put("/libprep/{projectid}/{sampleid}/{libprepid}")]
pub async fn update_libprep(
    state: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<LibPrepPath>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let request = save_request(&req, payload.into_inner())?;
    state.tracking.update_libprep(&path, request).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete a libprep and its seqruns; the sample totals are recomputed.
#[delete("/libprep/{projectid}/{sampleid}/{libprepid}")]
pub async fn delete_libprep(
    state: web::Data<HttpState>,
    path: web::Path<LibPrepPath>,
) -> ApiResult<HttpResponse> {
    state.tracking.delete_libprep(&path).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// List the libpreps of every sample in a project.
#[get("/libpreps/{projectid}")]
pub async fn list_project_libpreps(
    state: web::Data<HttpState>,
    project: web::Path<ProjectPath>,
) -> ApiResult<web::Json<Vec<LibPrep>>> {
    let ProjectPath { projectid } = project.into_inner();
    let scope = LibPrepScope {
        projectid,
        sampleid: None,
    };
    let libpreps = state.tracking_query.libpreps(&scope).await?;
    Ok(web::Json(libpreps))
}

/// List the libpreps of one sample.
#[get("/libpreps/{projectid}/{sampleid}")]
pub async fn list_sample_libpreps(
    state: web::Data<HttpState>,
    sample: web::Path<SamplePath>,
) -> ApiResult<web::Json<Vec<LibPrep>>> {
    let SamplePath {
        projectid,
        sampleid,
    } = sample.into_inner();
    let scope = LibPrepScope {
        projectid,
        sampleid: Some(sampleid),
    };
    let libpreps = state.tracking_query.libpreps(&scope).await?;
    Ok(web::Json(libpreps))
}

#[cfg(test)]
mod tests {
    use actix_web::http::{StatusCode, header};
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::{DomainError, Project, Sample};
    use crate::inbound::http::test_utils::{MockPorts, test_app};
    use crate::test_support::fixture_timestamp;

    fn stored_libprep(libprepid: &str) -> LibPrep {
        let mut project = Project::draft(fixture_timestamp());
        "P0".clone_into(&mut project.projectid);
        let mut sample = Sample::draft(&project, fixture_timestamp());
        "S1".clone_into(&mut sample.sampleid);
        let mut libprep = LibPrep::draft(&sample, fixture_timestamp());
        libprepid.clone_into(&mut libprep.libprepid);
        libprep
    }

    #[actix_web::test]
    async fn create_under_sample_sets_location() {
        let mut ports = MockPorts::default();
        ports
            .tracking
            .expect_create_libprep()
            .withf(|parent, _| parent == &ProjectPath::new("P0").sample("S1"))
            .times(1)
            .returning(|_, _| Ok(stored_libprep("A")));
        let app = actix_test::init_service(test_app(ports)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/libprep/P0/S1")
            .set_json(json!({"libprepid": "A"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response
                .headers()
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok()),
            Some("/api/v1/libprep/P0/S1/A")
        );
    }

    #[rstest]
    #[case("/api/v1/libpreps/P0", None)]
    #[case("/api/v1/libpreps/P0/S1", Some("S1"))]
    #[actix_web::test]
    async fn listings_narrow_by_sample(#[case] uri: &str, #[case] sampleid: Option<&'static str>) {
        let mut ports = MockPorts::default();
        ports
            .tracking_query
            .expect_libpreps()
            .withf(move |scope| {
                scope.projectid == "P0" && scope.sampleid.as_deref() == sampleid
            })
            .times(1)
            .returning(|_| Ok(vec![stored_libprep("A")]));
        let app = actix_test::init_service(test_app(ports)).await;

        let request = actix_test::TestRequest::get().uri(uri).to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, request).await;

        assert_eq!(body.as_array().map(Vec::len), Some(1));
    }

    #[actix_web::test]
    async fn duplicate_libprep_id_is_bad_request() {
        let mut ports = MockPorts::default();
        ports
            .tracking
            .expect_create_libprep()
            .times(1)
            .returning(|_, _| {
                Err(DomainError::invalid_field(
                    "libprepid",
                    "duplicate",
                    "libprepid 'A' is already in use",
                ))
            });
        let app = actix_test::init_service(test_app(ports)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/libprep/P0/S1")
            .set_json(json!({"libprepid": "A"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(
            body.pointer("/details/field"),
            Some(&json!("libprepid"))
        );
    }
}
