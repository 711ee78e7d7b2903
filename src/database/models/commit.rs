use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

use crate::types::{TaskId, UserId};

/// A commit with its author's display name
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Commit {
    pub id: i64,
    pub task_id: TaskId,
    pub creator_id: UserId,
    pub username: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub reference_link: Option<String>,
    pub create_at: NaiveDateTime,
}

/// Commit listing row for a whole group: the task it belongs to plus the commit
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GroupCommit {
    pub task_id: TaskId,
    pub task_name: String,
    pub task_status: String,
    pub task_create: NaiveDateTime,
    pub commit_id: i64,
    pub title: Option<String>,
    pub user_name: String,
    pub commit_create: NaiveDateTime,
}
