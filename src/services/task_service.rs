use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::SqliteConnection;

use super::{commit_service, require_text, ServiceError, ServiceResult};
use crate::database::models::{Commit, Task, TaskSummary};
use crate::database::{assert_member, execute_update, is_member, AccessError, ResourceKind, Table, UpdateBuilder};
use crate::types::{GroupId, Patch, TaskId, TaskStatus, UserId};

#[derive(Debug, Deserialize)]
pub struct NewTask {
    pub group_id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub assignee: Option<UserId>,
    pub reviewer: Option<UserId>,
}

/// Partial update of a task. Missing keys are left alone; `null` clears the
/// nullable columns.
#[derive(Debug, Default, Deserialize)]
pub struct TaskChanges {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub assignee_id: Patch<UserId>,
    #[serde(default)]
    pub reviewer_id: Patch<UserId>,
    #[serde(default)]
    pub status: Patch<TaskStatus>,
}

#[derive(Debug, Serialize)]
pub struct TaskDetail {
    pub task: Task,
    pub commits: Vec<Commit>,
}

const TASK_COLUMNS: &str =
    "id, group_id, creator_id, name, description, assignee_id, reviewer_id, status, create_at, close_at";

pub async fn create(conn: &mut SqliteConnection, caller: UserId, task: NewTask) -> ServiceResult<TaskId> {
    assert_member(conn, caller, task.group_id, ResourceKind::Group).await?;
    require_text("name", &task.name)?;
    ensure_group_member(conn, task.group_id, task.assignee, "assignee").await?;
    ensure_group_member(conn, task.group_id, task.reviewer, "reviewer").await?;

    let id = sqlx::query(
        r#"
        INSERT INTO task (group_id, creator_id, name, description, assignee_id, reviewer_id)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(task.group_id)
    .bind(caller)
    .bind(&task.name)
    .bind(&task.description)
    .bind(task.assignee)
    .bind(task.reviewer)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    tracing::info!("User {} created task {} in group {}", caller, id, task.group_id);
    Ok(id)
}

/// Tasks of a group; with `mine` only those the caller assigns or reviews
pub async fn list(
    conn: &mut SqliteConnection,
    caller: UserId,
    group_id: GroupId,
    mine: bool,
) -> ServiceResult<Vec<TaskSummary>> {
    assert_member(conn, caller, group_id, ResourceKind::Group).await?;

    let tasks = if mine {
        sqlx::query_as(
            "SELECT id, group_id, name, status FROM task WHERE group_id = ? AND (assignee_id = ? OR reviewer_id = ?) ORDER BY id",
        )
        .bind(group_id)
        .bind(caller)
        .bind(caller)
        .fetch_all(&mut *conn)
        .await?
    } else {
        sqlx::query_as("SELECT id, group_id, name, status FROM task WHERE group_id = ? ORDER BY id")
            .bind(group_id)
            .fetch_all(&mut *conn)
            .await?
    };

    Ok(tasks)
}

pub async fn detail(conn: &mut SqliteConnection, caller: UserId, task_id: TaskId) -> ServiceResult<TaskDetail> {
    assert_member(conn, caller, task_id, ResourceKind::Task).await?;

    let task: Task = sqlx::query_as(&format!("SELECT {} FROM task WHERE id = ?", TASK_COLUMNS))
        .bind(task_id)
        .fetch_one(&mut *conn)
        .await?;
    let commits = commit_service::for_task(conn, task_id).await?;

    Ok(TaskDetail { task, commits })
}

/// Creator-only partial update. Moving to `Done` stamps `close_at`; any other
/// status clears it.
pub async fn update(
    conn: &mut SqliteConnection,
    caller: UserId,
    task_id: TaskId,
    changes: TaskChanges,
) -> ServiceResult<()> {
    assert_member(conn, caller, task_id, ResourceKind::Task).await?;

    let group_id: GroupId = sqlx::query_scalar("SELECT group_id FROM task WHERE id = ?")
        .bind(task_id)
        .fetch_one(&mut *conn)
        .await?;
    ensure_group_member(conn, group_id, changes.assignee_id.as_value().copied(), "assignee").await?;
    ensure_group_member(conn, group_id, changes.reviewer_id.as_value().copied(), "reviewer").await?;

    let close_at = changes.status.as_value().map(|status| match status {
        TaskStatus::Done => Value::String(Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string()),
        _ => Value::Null,
    });

    let sql = UpdateBuilder::new(Table::Task)
        .set("name", changes.name.required())
        .set("description", changes.description.nullable())
        .set("assignee_id", changes.assignee_id.nullable())
        .set("reviewer_id", changes.reviewer_id.nullable())
        .set("status", changes.status.required())
        .set("close_at", close_at)
        .owned_by(task_id, caller)
        .build()?;

    if execute_update(conn, &sql).await? == 0 {
        return Err(AccessError::NotAMember.into());
    }
    Ok(())
}

async fn ensure_group_member(
    conn: &mut SqliteConnection,
    group_id: GroupId,
    user_id: Option<UserId>,
    role: &str,
) -> ServiceResult<()> {
    let Some(user_id) = user_id else {
        return Ok(());
    };
    if is_member(conn, user_id, group_id, ResourceKind::Group).await? {
        Ok(())
    } else {
        Err(ServiceError::invalid(format!("{} must be a member of the group", role)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestContext;

    fn new_task(group_id: GroupId) -> NewTask {
        NewTask {
            group_id,
            name: "Parser".to_string(),
            description: None,
            assignee: None,
            reviewer: None,
        }
    }

    #[tokio::test]
    async fn create_checks_membership_of_everyone_named() {
        let ctx = TestContext::new().await.unwrap();
        let owner = ctx.create_user("owner").await.unwrap();
        let outsider = ctx.create_user("outsider").await.unwrap();
        let course = ctx.create_course(owner, "Systems").await.unwrap();
        let group = ctx.create_group(course, owner, "Team").await.unwrap();
        let mut conn = ctx.db.acquire().await.unwrap();

        assert!(matches!(
            create(&mut conn, outsider, new_task(group)).await,
            Err(ServiceError::Access(AccessError::NotAMember))
        ));

        let mut task = new_task(group);
        task.assignee = Some(outsider);
        assert!(matches!(create(&mut conn, owner, task).await, Err(ServiceError::Invalid(_))));

        let mut task = new_task(group);
        task.reviewer = Some(owner);
        let id = create(&mut conn, owner, task).await.unwrap();
        let detail = detail(&mut conn, owner, id).await.unwrap();
        assert_eq!(detail.task.status, "Todo");
        assert_eq!(detail.task.reviewer_id, Some(owner));
        assert!(detail.commits.is_empty());
    }

    #[tokio::test]
    async fn list_filters_to_callers_tasks() {
        let ctx = TestContext::new().await.unwrap();
        let owner = ctx.create_user("owner").await.unwrap();
        let course = ctx.create_course(owner, "Systems").await.unwrap();
        let group = ctx.create_group(course, owner, "Team").await.unwrap();
        let mut conn = ctx.db.acquire().await.unwrap();

        create(&mut conn, owner, new_task(group)).await.unwrap();
        let mut mine = new_task(group);
        mine.assignee = Some(owner);
        let mine = create(&mut conn, owner, mine).await.unwrap();

        assert_eq!(list(&mut conn, owner, group, false).await.unwrap().len(), 2);
        let filtered = list(&mut conn, owner, group, true).await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, mine);
    }

    #[tokio::test]
    async fn done_stamps_close_at_and_reopening_clears_it() {
        let ctx = TestContext::new().await.unwrap();
        let owner = ctx.create_user("owner").await.unwrap();
        let course = ctx.create_course(owner, "Systems").await.unwrap();
        let group = ctx.create_group(course, owner, "Team").await.unwrap();
        let task = ctx.create_task(group, owner, "Parser").await.unwrap();
        let mut conn = ctx.db.acquire().await.unwrap();

        let done = TaskChanges {
            status: Patch::Value(TaskStatus::Done),
            ..Default::default()
        };
        update(&mut conn, owner, task, done).await.unwrap();
        let closed = detail(&mut conn, owner, task).await.unwrap().task;
        assert_eq!(closed.status, "Done");
        assert!(closed.close_at.is_some());

        let reopen = TaskChanges {
            status: Patch::Value(TaskStatus::Doing),
            description: Patch::Value("again".into()),
            ..Default::default()
        };
        update(&mut conn, owner, task, reopen).await.unwrap();
        let reopened = detail(&mut conn, owner, task).await.unwrap().task;
        assert_eq!(reopened.status, "Doing");
        assert_eq!(reopened.close_at, None);
        assert_eq!(reopened.description.as_deref(), Some("again"));
    }

    #[tokio::test]
    async fn only_the_creator_may_update() {
        let ctx = TestContext::new().await.unwrap();
        let owner = ctx.create_user("owner").await.unwrap();
        let member = ctx.create_user("member").await.unwrap();
        let course = ctx.create_course(owner, "Systems").await.unwrap();
        let group = ctx.create_group(course, owner, "Team").await.unwrap();
        ctx.join_group(member, group).await.unwrap();
        let task = ctx.create_task(group, owner, "Parser").await.unwrap();
        let mut conn = ctx.db.acquire().await.unwrap();

        let rename = TaskChanges {
            name: Patch::Value("Mine now".into()),
            ..Default::default()
        };
        assert!(matches!(
            update(&mut conn, member, task, rename).await,
            Err(ServiceError::Access(AccessError::NotAMember))
        ));

        assert!(matches!(
            update(&mut conn, owner, task, TaskChanges::default()).await,
            Err(ServiceError::Access(AccessError::NoFieldsToUpdate))
        ));
    }

    #[tokio::test]
    async fn clearing_the_assignee_writes_null() {
        let ctx = TestContext::new().await.unwrap();
        let owner = ctx.create_user("owner").await.unwrap();
        let course = ctx.create_course(owner, "Systems").await.unwrap();
        let group = ctx.create_group(course, owner, "Team").await.unwrap();
        let task = ctx.create_task(group, owner, "Parser").await.unwrap();
        let mut conn = ctx.db.acquire().await.unwrap();

        let assign = TaskChanges {
            assignee_id: Patch::Value(owner),
            ..Default::default()
        };
        update(&mut conn, owner, task, assign).await.unwrap();
        assert_eq!(detail(&mut conn, owner, task).await.unwrap().task.assignee_id, Some(owner));

        let clear: TaskChanges = serde_json::from_str(r#"{"assignee_id": null}"#).unwrap();
        update(&mut conn, owner, task, clear).await.unwrap();
        assert_eq!(detail(&mut conn, owner, task).await.unwrap().task.assignee_id, None);
    }
}
