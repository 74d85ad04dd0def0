//! Audit log HTTP handler.
//!
//! ```text
//! GET /api/v1/logs/{id}
//! ```

use actix_web::{get, web};
use serde_json::json;

use crate::domain::{DocId, DomainError, LogEntry};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Log entries of the document with id `id`, newest first.
#[get("/logs/{id}")]
pub async fn get_logs(
    state: web::Data<HttpState>,
    id: web::Path<String>,
) -> ApiResult<web::Json<Vec<LogEntry>>> {
    let owner = DocId::parse(id.into_inner()).map_err(|err| {
        DomainError::invalid_request(err.to_string())
            .with_details(json!({ "field": "id", "code": "invalid_id" }))
    })?;
    let entries = state.tracking_query.logs(&owner).await?;
    Ok(web::Json(entries))
}
