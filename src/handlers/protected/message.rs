use axum::extract::{Extension, Query, State};
use serde::{Deserialize, Serialize};

use crate::auth::CallerIdentity;
use crate::database::models::Message;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::message_service;
use crate::state::AppState;
use crate::types::TaskId;

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub task_id: TaskId,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub task: TaskId,
}

#[derive(Debug, Serialize)]
pub struct MessageRef {
    pub id: i64,
}

/// POST /message
pub async fn message_post(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    ApiJson(body): ApiJson<CreateMessageRequest>,
) -> ApiResult<MessageRef> {
    let mut conn = state.db.acquire().await?;
    let id = message_service::create(&mut conn, caller.user_id(), body.task_id, &body.description).await?;
    Ok(ApiResponse::created(MessageRef { id }))
}

/// GET /message?task=3
pub async fn message_list(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Query(query): Query<MessageQuery>,
) -> ApiResult<Vec<Message>> {
    let mut conn = state.db.acquire().await?;
    let messages = message_service::for_task(&mut conn, caller.user_id(), query.task).await?;
    Ok(ApiResponse::success(messages))
}
