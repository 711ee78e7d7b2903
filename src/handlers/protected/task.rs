use axum::extract::{Extension, Path, Query, State};
use serde::{Deserialize, Serialize};

use crate::auth::CallerIdentity;
use crate::database::models::TaskSummary;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::task_service::{self, NewTask, TaskChanges, TaskDetail};
use crate::state::AppState;
use crate::types::{GroupId, TaskId};

#[derive(Debug, Deserialize)]
pub struct TaskQuery {
    pub group: GroupId,
    #[serde(default)]
    pub me: bool,
}

#[derive(Debug, Serialize)]
pub struct TaskRef {
    pub id: TaskId,
}

/// POST /task
///
/// Expected Input:
/// ```json
/// { "group_id": 7, "name": "Parser", "description": null, "assignee": 2, "reviewer": 1 }
/// ```
/// Assignee and reviewer, when given, must already be members of the group.
pub async fn task_post(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    ApiJson(body): ApiJson<NewTask>,
) -> ApiResult<TaskRef> {
    let mut conn = state.db.acquire().await?;
    let id = task_service::create(&mut conn, caller.user_id(), body).await?;
    Ok(ApiResponse::created(TaskRef { id }))
}

/// GET /task?group=7&me=true
pub async fn task_list(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Query(query): Query<TaskQuery>,
) -> ApiResult<Vec<TaskSummary>> {
    let mut conn = state.db.acquire().await?;
    let tasks = task_service::list(&mut conn, caller.user_id(), query.group, query.me).await?;
    Ok(ApiResponse::success(tasks))
}

/// GET /task/:id - the task and its commits
pub async fn task_get(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<TaskId>,
) -> ApiResult<TaskDetail> {
    let mut conn = state.db.acquire().await?;
    let detail = task_service::detail(&mut conn, caller.user_id(), id).await?;
    Ok(ApiResponse::success(detail))
}

/// PATCH /task/:id - creator only
///
/// Accepts any of `name`, `description`, `assignee_id`, `reviewer_id`,
/// `status` (`Todo` | `Doing` | `Review` | `Done`).
pub async fn task_patch(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<TaskId>,
    ApiJson(body): ApiJson<TaskChanges>,
) -> ApiResult<TaskRef> {
    let mut conn = state.db.acquire().await?;
    task_service::update(&mut conn, caller.user_id(), id, body).await?;
    Ok(ApiResponse::success(TaskRef { id }))
}
