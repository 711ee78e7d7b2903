use axum::extract::{Extension, Path, State};
use serde::Serialize;

use crate::auth::CallerIdentity;
use crate::database::models::{JoinedCourse, PublicProfile, TaskSummary, UserProfile};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::user_service;
use crate::state::AppState;
use crate::types::UserId;

/// Either a user's own full profile or someone else's public one
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ProfileView {
    Own(UserProfile),
    Public(PublicProfile),
}

/// GET /user - the caller's own profile
pub async fn me_get(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> ApiResult<UserProfile> {
    let mut conn = state.db.acquire().await?;
    let profile = user_service::profile(&mut conn, caller.user_id()).await?;
    Ok(ApiResponse::success(profile))
}

/// GET /user/:id - full profile for the caller, public fields for anyone else
pub async fn user_get(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<UserId>,
) -> ApiResult<ProfileView> {
    let mut conn = state.db.acquire().await?;
    let view = if id == caller.user_id() {
        ProfileView::Own(user_service::profile(&mut conn, id).await?)
    } else {
        ProfileView::Public(user_service::public_profile(&mut conn, id).await?)
    };
    Ok(ApiResponse::success(view))
}

/// GET /user/courses
pub async fn courses_get(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> ApiResult<Vec<JoinedCourse>> {
    let mut conn = state.db.acquire().await?;
    let courses = user_service::joined_courses(&mut conn, caller.user_id()).await?;
    Ok(ApiResponse::success(courses))
}

/// GET /user/tasks - open tasks the caller is assigned to or reviewing
pub async fn tasks_get(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> ApiResult<Vec<TaskSummary>> {
    let mut conn = state.db.acquire().await?;
    let tasks = user_service::assigned_tasks(&mut conn, caller.user_id()).await?;
    Ok(ApiResponse::success(tasks))
}
