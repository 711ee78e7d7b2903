use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

use crate::types::UserId;

/// Review written by the caller, as shown on the group review page
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Review {
    pub id: i64,
    pub user_id: UserId,
    pub name: String,
    pub content: String,
    pub rating: f64,
    pub create_at: NaiveDateTime,
}

/// Review received by a user, labelled with the course it came from
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserReview {
    pub id: i64,
    pub content: String,
    pub rating: f64,
    pub course: String,
}
