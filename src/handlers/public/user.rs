use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::user_service;
use crate::state::AppState;
use crate::types::UserId;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub account: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub account: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct Created {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub id: UserId,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
    pub expires_in: u64,
}

/// POST /user/register - Create an account
///
/// Expected Input:
/// ```json
/// { "account": "alice", "password": "s3cret", "name": "Alice" }
/// ```
///
/// Responds 201 with `{"id": <new user id>}`; an account that is already
/// taken is 409.
pub async fn register_post(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> ApiResult<Created> {
    let mut conn = state.db.acquire().await?;
    let id = user_service::register(&mut conn, &body.account, &body.password, &body.name).await?;
    Ok(ApiResponse::created(Created { id }))
}

/// POST /user/login - Exchange account credentials for a bearer token
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "data": {
///     "token": "eyJhbGciOiJIUzI1NiI...",
///     "user": { "id": 1 },
///     "expires_in": 86400
///   }
/// }
/// ```
pub async fn login_post(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let mut conn = state.db.acquire().await?;
    let id = user_service::login(&mut conn, &body.account, &body.password).await?;
    drop(conn);

    let token = state.issuer.issue(id)?;
    if state.config.security.enable_audit_logging {
        tracing::info!("User {} logged in", id);
    }

    Ok(ApiResponse::success(LoginResponse {
        token,
        user: LoginUser { id },
        expires_in: state.issuer.expires_in_secs(),
    }))
}
