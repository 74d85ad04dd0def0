//! Sample HTTP handlers.
//!
//! ```text
//! POST   /api/v1/sample/{projectid}
//! GET    /api/v1/sample/{projectid}/{sampleid}
//! PUT    /api/v1/sample/{projectid}/{sampleid}
//! DELETE /api/v1/sample/{projectid}/{sampleid}
//! GET    /api/v1/samples/{projectid}
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use serde_json::Value;

use crate::domain::Sample;
use crate::domain::ports::{ProjectPath, SamplePath};
use crate::inbound::http::ApiResult;
use crate::inbound::http::payload::{created, save_request};
use crate::inbound::http::state::HttpState;

/// Create a sample under a project.
#[post("/sample/{projectid}")]
pub async fn create_sample(
    state: web::Data<HttpState>,
    req: HttpRequest,
    parent: web::Path<ProjectPath>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let request = save_request(&req, payload.into_inner())?;
    let sample = state.tracking.create_sample(&parent, request).await?;
    let location = parent.sample(sample.sampleid.as_str());
    Ok(created(&format!("/sample/{location}"), &sample))
}

/// Fetch one sample.
#[get("/sample/{projectid}/{sampleid}")]
pub async fn get_sample(
    state: web::Data<HttpState>,
    path: web::Path<SamplePath>,
) -> ApiResult<web::Json<Sample>> {
    let sample = state.tracking_query.sample(&path).await?;
    Ok(web::Json(sample))
}

/// Update the posted fields of a sample.
#[put("/sample/{projectid}/{sampleid}")]
pub async fn update_sample(
    state: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<SamplePath>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let request = save_request(&req, payload.into_inner())?;
    state.tracking.update_sample(&path, request).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete a sample together with its libpreps and seqruns.
#[delete("/sample/{projectid}/{sampleid}")]
pub async fn delete_sample(
    state: web::Data<HttpState>,
    path: web::Path<SamplePath>,
) -> ApiResult<HttpResponse> {
    state.tracking.delete_sample(&path).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// List the samples of a project.
#[get("/samples/{projectid}")]
pub async fn list_samples(
    state: web::Data<HttpState>,
    parent: web::Path<ProjectPath>,
) -> ApiResult<web::Json<Vec<Sample>>> {
    let samples = state.tracking_query.samples(&parent).await?;
    Ok(web::Json(samples))
}
