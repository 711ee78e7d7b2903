use sqlx::SqliteConnection;

use super::{require_text, ServiceResult};
use crate::database::models::Message;
use crate::database::{assert_member, ResourceKind};
use crate::types::{TaskId, UserId};

/// Post a message on a task; the author is always the caller
pub async fn create(conn: &mut SqliteConnection, caller: UserId, task_id: TaskId, description: &str) -> ServiceResult<i64> {
    assert_member(conn, caller, task_id, ResourceKind::Task).await?;
    require_text("description", description)?;

    let id = sqlx::query("INSERT INTO message (task_id, creator_id, description) VALUES (?, ?, ?)")
        .bind(task_id)
        .bind(caller)
        .bind(description)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

    Ok(id)
}

pub async fn for_task(conn: &mut SqliteConnection, caller: UserId, task_id: TaskId) -> ServiceResult<Vec<Message>> {
    assert_member(conn, caller, task_id, ResourceKind::Task).await?;

    let messages = sqlx::query_as(
        r#"
        SELECT m.id, m.task_id, m.creator_id, u.name AS user_name, m.description, m.create_at
        FROM message m
        INNER JOIN "user" u ON u.id = m.creator_id
        WHERE m.task_id = ?
        ORDER BY m.create_at, m.id
        "#,
    )
    .bind(task_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(messages)
}
