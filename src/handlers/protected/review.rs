use std::collections::BTreeMap;

use axum::extract::{Extension, Path, Query, State};
use serde::{Deserialize, Serialize};

use crate::auth::CallerIdentity;
use crate::database::models::UserReview;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::review_service::{self, GroupReviews, ReviewInput};
use crate::state::AppState;
use crate::types::{GroupId, UserId};

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    pub user_id: Option<UserId>,
}

#[derive(Debug, Serialize)]
pub struct Submitted {
    pub reviewed: usize,
}

/// POST /review/group/:group_id - write or overwrite reviews of group members
///
/// Expected Input, keyed by the reviewed user's id:
/// ```json
/// { "2": { "content": "Kept the team on schedule", "rating": 4.5 } }
/// ```
/// Ratings run from 0 to 5 and are floored to half points.
pub async fn review_post(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(group_id): Path<GroupId>,
    ApiJson(body): ApiJson<BTreeMap<UserId, ReviewInput>>,
) -> ApiResult<Submitted> {
    let mut tx = state.db.begin().await?;
    let reviewed = review_service::submit(&mut tx, caller.user_id(), group_id, body).await?;
    tx.commit().await?;

    Ok(ApiResponse::success(Submitted { reviewed }))
}

/// GET /review/group/:group_id - members plus the reviews the caller wrote
pub async fn review_group_get(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(group_id): Path<GroupId>,
) -> ApiResult<GroupReviews> {
    let mut conn = state.db.acquire().await?;
    let page = review_service::for_group(&mut conn, caller.user_id(), group_id).await?;
    Ok(ApiResponse::success(page))
}

/// GET /review?user_id= - reviews received by a user (default: the caller)
pub async fn review_list(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Query(query): Query<ReviewQuery>,
) -> ApiResult<Vec<UserReview>> {
    let user_id = query.user_id.unwrap_or(caller.user_id());
    let mut conn = state.db.acquire().await?;
    let reviews = review_service::about_user(&mut conn, user_id).await?;
    Ok(ApiResponse::success(reviews))
}
