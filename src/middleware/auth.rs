use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::CallerIdentity;
use crate::error::ApiError;
use crate::state::AppState;

/// Resolves the bearer token and injects `CallerIdentity` into the request.
/// Handlers behind this layer extract it with `Extension<CallerIdentity>`.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credential = extract_authorization(&headers)?;
    let caller = state.resolver.resolve(credential)?;

    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}

fn extract_authorization(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

    value
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))
}
