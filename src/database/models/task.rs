use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

use crate::types::{GroupId, TaskId, UserId};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Task {
    pub id: TaskId,
    pub group_id: GroupId,
    pub creator_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub assignee_id: Option<UserId>,
    pub reviewer_id: Option<UserId>,
    pub status: String,
    pub create_at: NaiveDateTime,
    pub close_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TaskSummary {
    pub id: TaskId,
    pub group_id: GroupId,
    pub name: String,
    pub status: String,
}
