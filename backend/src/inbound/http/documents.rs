//! Raw document HTTP handler.
//!
//! ```text
//! GET /api/v1/doc/{id}
//! ```

use actix_web::{get, web};
use serde_json::{Value, json};

use crate::domain::{DocId, DomainError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Stored body of the document with id `id`, metadata included.
#[get("/doc/{id}")]
pub async fn get_document(
    state: web::Data<HttpState>,
    id: web::Path<String>,
) -> ApiResult<web::Json<Value>> {
    let doc_id = DocId::parse(id.into_inner()).map_err(|err| {
        DomainError::invalid_request(err.to_string())
            .with_details(json!({ "field": "id", "code": "invalid_id" }))
    })?;
    let body = state.tracking_query.document(&doc_id).await?;
    Ok(web::Json(body))
}
