//! Project HTTP handlers.
//!
//! ```text
//! POST   /api/v1/project
//! GET    /api/v1/project/{projectid}
//! PUT    /api/v1/project/{projectid}
//! DELETE /api/v1/project/{projectid}
//! GET    /api/v1/projects
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use serde_json::Value;

use crate::domain::Project;
use crate::domain::ports::ProjectPath;
use crate::inbound::http::ApiResult;
use crate::inbound::http::payload::{created, save_request};
use crate::inbound::http::state::HttpState;

/// Create a project from the posted fields.
#[post("/project")]
pub async fn create_project(
    state: web::Data<HttpState>,
    req: HttpRequest,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let request = save_request(&req, payload.into_inner())?;
    let project = state.tracking.create_project(request).await?;
    Ok(created(&format!("/project/{}", project.projectid), &project))
}

/// Fetch one project.
#[get("/project/{projectid}")]
pub async fn get_project(
    state: web::Data<HttpState>,
    path: web::Path<ProjectPath>,
) -> ApiResult<web::Json<Project>> {
    let project = state.tracking_query.project(&path).await?;
    Ok(web::Json(project))
}

/// Update the posted fields of a project.
#[put("/project/{projectid}")]
pub async fn update_project(
    state: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<ProjectPath>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let request = save_request(&req, payload.into_inner())?;
    state.tracking.update_project(&path, request).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete a project together with its samples, libpreps and seqruns.
#[delete("/project/{projectid}")]
pub async fn delete_project(
    state: web::Data<HttpState>,
    path: web::Path<ProjectPath>,
) -> ApiResult<HttpResponse> {
    state.tracking.delete_project(&path).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// List every project in identifier order.
#[get("/projects")]
pub async fn list_projects(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Project>>> {
    let projects = state.tracking_query.projects().await?;
    Ok(web::Json(projects))
}

#[cfg(test)]
mod tests {
    use actix_web::HttpMessage;
    use actix_web::http::{StatusCode, header};
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::{DeleteReport, DomainError, Operator};
    use crate::inbound::http::test_utils::{MockPorts, test_app};
    use crate::test_support::fixture_timestamp;

    fn stored_project(projectid: &str) -> Project {
        let mut project = Project::draft(fixture_timestamp());
        projectid.clone_into(&mut project.projectid);
        project.status = Some("OPEN".to_owned());
        project
    }

    #[actix_web::test]
    async fn create_returns_created_with_location() {
        let mut ports = MockPorts::default();
        ports
            .tracking
            .expect_create_project()
            .withf(|request| {
                request.fields.get("projectid") == Some(&json!("P0"))
                    && request.operator == Some(Operator::new("per@example.org"))
            })
            .times(1)
            .returning(|_| Ok(stored_project("P0")));
        let app = actix_test::init_service(test_app(ports)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/project")
            .set_json(json!({"projectid": "P0"}))
            .to_request();
        request
            .extensions_mut()
            .insert(Operator::new("per@example.org"));
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response
                .headers()
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok()),
            Some("/api/v1/project/P0")
        );
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body.get("projectid"), Some(&json!("P0")));
        assert_eq!(body.get("status"), Some(&json!("OPEN")));
        assert_eq!(body.get("doctype"), Some(&json!("project")));
    }

    #[rstest]
    #[case(
        DomainError::invalid_field("projectid", "mandatory", "projectid must be set"),
        StatusCode::BAD_REQUEST
    )]
    #[case(DomainError::conflict("revision moved on"), StatusCode::CONFLICT)]
    #[case(DomainError::not_found("no project P9"), StatusCode::NOT_FOUND)]
    #[actix_web::test]
    async fn update_failures_map_to_status(#[case] error: DomainError, #[case] status: StatusCode) {
        let mut ports = MockPorts::default();
        ports
            .tracking
            .expect_update_project()
            .times(1)
            .returning(move |_, _| Err(error.clone()));
        let app = actix_test::init_service(test_app(ports)).await;

        let request = actix_test::TestRequest::put()
            .uri("/api/v1/project/P0")
            .set_json(json!({"name": "Lab"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), status);
    }

    #[actix_web::test]
    async fn update_returns_no_content() {
        let mut ports = MockPorts::default();
        ports
            .tracking
            .expect_update_project()
            .withf(|path, request| {
                path == &ProjectPath::new("P0") && request.fields.get("name") == Some(&json!("Lab"))
            })
            .times(1)
            .returning(|_, _| Ok(stored_project("P0")));
        let app = actix_test::init_service(test_app(ports)).await;

        let request = actix_test::TestRequest::put()
            .uri("/api/v1/project/P0")
            .set_json(json!({"name": "Lab"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let body = actix_test::read_body(response).await;
        assert!(body.is_empty());
    }

    #[actix_web::test]
    async fn delete_returns_no_content() {
        let mut ports = MockPorts::default();
        ports
            .tracking
            .expect_delete_project()
            .withf(|path| path == &ProjectPath::new("P0"))
            .times(1)
            .returning(|_| Ok(DeleteReport::default()));
        let app = actix_test::init_service(test_app(ports)).await;

        let request = actix_test::TestRequest::delete()
            .uri("/api/v1/project/P0")
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn get_unknown_project_is_not_found() {
        let mut ports = MockPorts::default();
        ports
            .tracking_query
            .expect_project()
            .times(1)
            .returning(|path| Err(DomainError::not_found(format!("no project {path}"))));
        let app = actix_test::init_service(test_app(ports)).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/project/P9")
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body.get("message"), Some(&json!("no project P9")));
        assert_eq!(body.get("code"), Some(&json!("not_found")));
    }

    #[actix_web::test]
    async fn list_returns_projects_in_order() {
        let mut ports = MockPorts::default();
        ports
            .tracking_query
            .expect_projects()
            .times(1)
            .returning(|| Ok(vec![stored_project("P0"), stored_project("P1")]));
        let app = actix_test::init_service(test_app(ports)).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/projects")
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, request).await;

        let ids: Vec<_> = body
            .as_array()
            .expect("array body")
            .iter()
            .filter_map(|project| project.get("projectid").and_then(Value::as_str))
            .collect();
        assert_eq!(ids, ["P0", "P1"]);
    }

    #[rstest]
    #[case("[1, 2]", "payload must be a JSON object, got an array")]
    #[case("{not json", "malformed JSON payload")]
    #[actix_web::test]
    async fn unusable_bodies_are_bad_requests(#[case] body: &str, #[case] prefix: &str) {
        let app = actix_test::init_service(test_app(MockPorts::default())).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/project")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload(body.to_owned())
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload: Value = actix_test::read_body_json(response).await;
        let message = payload
            .get("message")
            .and_then(Value::as_str)
            .expect("message present");
        assert!(message.starts_with(prefix), "unexpected message {message}");
    }
}
