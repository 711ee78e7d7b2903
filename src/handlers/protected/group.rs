use axum::extract::{Extension, Path, Query, State};
use serde::{Deserialize, Serialize};

use crate::auth::CallerIdentity;
use crate::database::models::GroupMember;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::group_service::{self, GroupInfo};
use crate::state::AppState;
use crate::types::{CourseId, GroupId, Patch};

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub course_id: CourseId,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGroupRequest {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
}

#[derive(Debug, Deserialize)]
pub struct MemberQuery {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GroupRef {
    pub id: GroupId,
}

/// POST /group - create a group inside a course the caller belongs to
///
/// The group row and the owner's membership are written in one transaction.
pub async fn group_post(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    ApiJson(body): ApiJson<CreateGroupRequest>,
) -> ApiResult<GroupRef> {
    let mut tx = state.db.begin().await?;
    let id = group_service::create(
        &mut tx,
        caller.user_id(),
        body.course_id,
        &body.name,
        body.description.as_deref(),
    )
    .await?;
    tx.commit().await?;

    Ok(ApiResponse::created(GroupRef { id }))
}

/// GET /group/:id
///
/// Expected Output:
/// ```json
/// {
///   "success": true,
///   "data": {
///     "group": { "id": 7, "course": "Systems", "owner_id": 1, "owner": "alice", "name": "Team", "description": null },
///     "members": [{ "id": 1, "name": "alice", "description": null }],
///     "in_group": true
///   }
/// }
/// ```
pub async fn group_get(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<GroupId>,
) -> ApiResult<GroupInfo> {
    let mut conn = state.db.acquire().await?;
    let info = group_service::info(&mut conn, caller.user_id(), id).await?;
    Ok(ApiResponse::success(info))
}

/// PATCH /group/:id - owner only; same body rules as PATCH /course/:id
pub async fn group_patch(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<GroupId>,
    ApiJson(body): ApiJson<UpdateGroupRequest>,
) -> ApiResult<GroupRef> {
    let mut conn = state.db.acquire().await?;
    group_service::update(&mut conn, caller.user_id(), id, body.name, body.description).await?;
    Ok(ApiResponse::success(GroupRef { id }))
}

/// POST /group/:id/join
pub async fn group_join(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<GroupId>,
) -> ApiResult<GroupRef> {
    let mut conn = state.db.acquire().await?;
    group_service::join(&mut conn, caller.user_id(), id).await?;
    Ok(ApiResponse::success(GroupRef { id }))
}

/// GET /group/:id/members?name=
pub async fn group_members(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<GroupId>,
    Query(query): Query<MemberQuery>,
) -> ApiResult<Vec<GroupMember>> {
    let mut conn = state.db.acquire().await?;
    let members = group_service::members(&mut conn, caller.user_id(), id, query.name.as_deref()).await?;
    Ok(ApiResponse::success(members))
}
