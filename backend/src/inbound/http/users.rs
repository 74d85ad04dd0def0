//! Operator account HTTP handlers.
//!
//! ```text
//! POST /api/v1/user                  {"email":"per@example.org","name":"Per"}
//! GET  /api/v1/user/{email}
//! PUT  /api/v1/user/{email}          {"status":"active","role":"admin"}
//! POST /api/v1/user/{email}/token
//! ```

use actix_web::{HttpRequest, HttpResponse, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{User, UserRole, UserStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::payload::{created, operator, save_request};
use crate::inbound::http::state::HttpState;

/// Account as exposed over HTTP; the API token is never echoed back here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    /// Login email.
    pub email: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Access role.
    pub role: UserRole,
    /// Lifecycle state.
    pub status: UserStatus,
    /// Registration instant.
    pub created: DateTime<Utc>,
    /// Instant of the last change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            name: user.name,
            role: user.role,
            status: user.status,
            created: user.meta.created,
            modified: user.meta.modified,
        }
    }
}

/// Freshly issued API token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiTokenResponse {
    /// Account the token belongs to.
    pub email: String,
    /// The new token; earlier tokens stop working.
    pub api_token: String,
}

/// Register an account; it starts out pending whatever the body asks for.
#[post("/user")]
pub async fn register_user(
    state: web::Data<HttpState>,
    req: HttpRequest,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let request = save_request(&req, payload.into_inner())?;
    let user = state.users.register(request).await?;
    let location = format!("/user/{}", user.email);
    Ok(created(&location, &UserResponse::from(user)))
}

/// Fetch one account.
#[get("/user/{email}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    email: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    let user = state.users_query.user_by_email(&email).await?;
    Ok(web::Json(user.into()))
}

/// Change name, role or status of an account.
#[put("/user/{email}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    req: HttpRequest,
    email: web::Path<String>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let request = save_request(&req, payload.into_inner())?;
    state.users.update_user(&email, request).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Replace the account's API token and return the new one.
#[post("/user/{email}/token")]
pub async fn issue_api_token(
    state: web::Data<HttpState>,
    req: HttpRequest,
    email: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user = state
        .users
        .issue_api_token(&email, operator(&req))
        .await?;
    let api_token = user.api_token.unwrap_or_default();
    Ok(HttpResponse::Ok().json(ApiTokenResponse {
        email: user.email,
        api_token,
    }))
}
