use axum::extract::{Extension, Query, State};
use serde::{Deserialize, Serialize};

use crate::auth::CallerIdentity;
use crate::database::models::GroupCommit;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::commit_service::{self, NewCommit};
use crate::state::AppState;
use crate::types::GroupId;

#[derive(Debug, Deserialize)]
pub struct CommitQuery {
    pub group: GroupId,
}

#[derive(Debug, Serialize)]
pub struct CommitRef {
    pub id: i64,
}

/// POST /commit - record work on a task and move it to `Doing`
pub async fn commit_post(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    ApiJson(body): ApiJson<NewCommit>,
) -> ApiResult<CommitRef> {
    let mut tx = state.db.begin().await?;
    let id = commit_service::create(&mut tx, caller.user_id(), body).await?;
    tx.commit().await?;

    Ok(ApiResponse::created(CommitRef { id }))
}

/// GET /commit?group=7
pub async fn commit_list(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Query(query): Query<CommitQuery>,
) -> ApiResult<Vec<GroupCommit>> {
    let mut conn = state.db.acquire().await?;
    let commits = commit_service::for_group(&mut conn, caller.user_id(), query.group).await?;
    Ok(ApiResponse::success(commits))
}
