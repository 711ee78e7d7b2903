use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

use crate::types::{TaskId, UserId};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Message {
    pub id: i64,
    pub task_id: TaskId,
    pub creator_id: UserId,
    pub user_name: String,
    pub description: String,
    pub create_at: NaiveDateTime,
}
