//! Membership checks that gate every read or write on a scoped resource.
//!
//! Each check is a single `SELECT EXISTS(...)` evaluated at call time. Nothing
//! is cached, so a membership inserted or removed by another request is seen by
//! the next check. The check and the write that follows it are separate
//! statements: a membership revoked in between does not stop the write.
//! Handlers that need both in one atomic step run them inside one transaction.

use sqlx::SqliteConnection;
use thiserror::Error;

use super::manager::DatabaseError;
use crate::types::UserId;

/// Failures of the access-scoped query layer
#[derive(Debug, Error)]
pub enum AccessError {
    /// Caller is not a member of the resource, or the resource does not exist.
    /// The two are deliberately indistinguishable.
    #[error("Access denied")]
    NotAMember,

    #[error("No fields to update")]
    NoFieldsToUpdate,

    /// Update named a column outside the table's allow-list or had no row scope
    #[error("Malformed update: {0}")]
    MalformedUpdate(String),

    #[error(transparent)]
    Storage(#[from] DatabaseError),
}

impl From<sqlx::Error> for AccessError {
    fn from(err: sqlx::Error) -> Self {
        AccessError::Storage(DatabaseError::Sqlx(err))
    }
}

/// Which membership relation a check runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Group,
    Course,
    /// Membership in the group that owns the task
    Task,
}

impl ResourceKind {
    /// Existence query; binds `user_id` then `resource_id`
    fn exists_sql(&self) -> &'static str {
        match self {
            ResourceKind::Group => {
                "SELECT EXISTS(SELECT 1 FROM group_member WHERE user_id = ? AND group_id = ?)"
            }
            ResourceKind::Course => {
                "SELECT EXISTS(SELECT 1 FROM course_member WHERE user_id = ? AND course_id = ?)"
            }
            ResourceKind::Task => {
                "SELECT EXISTS(SELECT 1 FROM task t INNER JOIN group_member gm ON gm.group_id = t.group_id WHERE gm.user_id = ? AND t.id = ?)"
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Group => "group",
            ResourceKind::Course => "course",
            ResourceKind::Task => "task",
        }
    }
}

/// Whether `user_id` belongs to `resource_id` right now
pub async fn is_member(
    conn: &mut SqliteConnection,
    user_id: UserId,
    resource_id: i64,
    kind: ResourceKind,
) -> Result<bool, DatabaseError> {
    let exists: i64 = sqlx::query_scalar(kind.exists_sql())
        .bind(user_id)
        .bind(resource_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(exists != 0)
}

/// Fail with `NotAMember` unless `user_id` belongs to `resource_id`
pub async fn assert_member(
    conn: &mut SqliteConnection,
    user_id: UserId,
    resource_id: i64,
    kind: ResourceKind,
) -> Result<(), AccessError> {
    if is_member(conn, user_id, resource_id, kind).await? {
        return Ok(());
    }

    tracing::warn!(
        "Membership check failed: user {} is not in {} {}",
        user_id,
        kind.as_str(),
        resource_id
    );
    Err(AccessError::NotAMember)
}
