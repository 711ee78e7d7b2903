use serde::Deserialize;
use sqlx::SqliteConnection;

use super::ServiceResult;
use crate::database::models::{Commit, GroupCommit};
use crate::database::{assert_member, ResourceKind};
use crate::types::{GroupId, TaskId, TaskStatus, UserId};

#[derive(Debug, Deserialize)]
pub struct NewCommit {
    pub task_id: TaskId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub reference_link: Option<String>,
}

/// Record a commit against a task and move the task to `Doing`, reopening it
/// if it was closed. Call inside a transaction.
pub async fn create(conn: &mut SqliteConnection, caller: UserId, commit: NewCommit) -> ServiceResult<i64> {
    assert_member(conn, caller, commit.task_id, ResourceKind::Task).await?;

    let id = sqlx::query(
        "INSERT INTO \"commit\" (task_id, creator_id, title, description, reference_link) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(commit.task_id)
    .bind(caller)
    .bind(&commit.title)
    .bind(&commit.description)
    .bind(&commit.reference_link)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    sqlx::query("UPDATE task SET status = ?, close_at = NULL WHERE id = ?")
        .bind(TaskStatus::Doing.as_str())
        .bind(commit.task_id)
        .execute(&mut *conn)
        .await?;

    tracing::info!("User {} committed {} on task {}", caller, id, commit.task_id);
    Ok(id)
}

/// Commits on one task, oldest first. Callers check task membership.
pub async fn for_task(conn: &mut SqliteConnection, task_id: TaskId) -> ServiceResult<Vec<Commit>> {
    let commits = sqlx::query_as(
        r#"
        SELECT c.id, c.task_id, c.creator_id, u.name AS username, c.title, c.description,
               c.reference_link, c.create_at
        FROM "commit" c
        INNER JOIN "user" u ON u.id = c.creator_id
        WHERE c.task_id = ?
        ORDER BY c.create_at, c.id
        "#,
    )
    .bind(task_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(commits)
}

/// Every commit in a group, each with the task it belongs to
pub async fn for_group(conn: &mut SqliteConnection, caller: UserId, group_id: GroupId) -> ServiceResult<Vec<GroupCommit>> {
    assert_member(conn, caller, group_id, ResourceKind::Group).await?;

    let commits = sqlx::query_as(
        r#"
        SELECT t.id AS task_id, t.name AS task_name, t.status AS task_status, t.create_at AS task_create,
               c.id AS commit_id, c.title, u.name AS user_name, c.create_at AS commit_create
        FROM task t
        INNER JOIN "commit" c ON c.task_id = t.id
        INNER JOIN "user" u ON u.id = c.creator_id
        WHERE t.group_id = ?
        ORDER BY c.create_at, c.id
        "#,
    )
    .bind(group_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(commits)
}
