use axum::extract::{Extension, Path, Query, State};
use serde::{Deserialize, Serialize};

use crate::auth::CallerIdentity;
use crate::database::models::{Course, GroupSummary};
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::course_service::{self, NewCourse};
use crate::state::AppState;
use crate::types::{CourseId, Patch};

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub name: String,
    pub year: i64,
    pub semester: i64,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCourseRequest {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct Created {
    pub id: CourseId,
}

#[derive(Debug, Serialize)]
pub struct Updated {
    pub id: CourseId,
}

/// POST /course - create a course; the caller owns it and is enrolled
pub async fn course_post(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    ApiJson(body): ApiJson<CreateCourseRequest>,
) -> ApiResult<Created> {
    let mut tx = state.db.begin().await?;
    let id = course_service::create(
        &mut tx,
        caller.user_id(),
        NewCourse {
            name: &body.name,
            year: body.year,
            semester: body.semester,
            description: body.description.as_deref(),
        },
    )
    .await?;
    tx.commit().await?;

    Ok(ApiResponse::created(Created { id }))
}

/// GET /course?offset=&limit= - course catalogue, one page at a time
pub async fn course_list(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Vec<Course>> {
    let api = &state.config.api;
    let limit = page.limit.unwrap_or(api.default_page_limit).clamp(1, api.max_page_limit.max(1));
    let offset = page.offset.unwrap_or(0).max(0);

    let mut conn = state.db.acquire().await?;
    let courses = course_service::list(&mut conn, offset, limit).await?;
    Ok(ApiResponse::success(courses))
}

/// GET /course/:id
pub async fn course_get(State(state): State<AppState>, Path(id): Path<CourseId>) -> ApiResult<Course> {
    let mut conn = state.db.acquire().await?;
    let course = course_service::find(&mut conn, id).await?;
    Ok(ApiResponse::success(course))
}

/// PATCH /course/:id - owner only
///
/// Expected Input (every key optional, at least one required):
/// ```json
/// { "name": "Operating Systems", "description": null }
/// ```
/// A `null` description clears it; a `null` name is ignored.
pub async fn course_patch(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<CourseId>,
    ApiJson(body): ApiJson<UpdateCourseRequest>,
) -> ApiResult<Updated> {
    let mut conn = state.db.acquire().await?;
    course_service::update(&mut conn, caller.user_id(), id, body.name, body.description).await?;
    Ok(ApiResponse::success(Updated { id }))
}

/// POST /course/:id/join
pub async fn course_join(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<CourseId>,
) -> ApiResult<Updated> {
    let mut conn = state.db.acquire().await?;
    course_service::join(&mut conn, caller.user_id(), id).await?;
    Ok(ApiResponse::success(Updated { id }))
}

/// GET /course/:id/groups - course members only
pub async fn course_groups(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<CourseId>,
) -> ApiResult<Vec<GroupSummary>> {
    let mut conn = state.db.acquire().await?;
    let groups = course_service::groups(&mut conn, caller.user_id(), id).await?;
    Ok(ApiResponse::success(groups))
}
