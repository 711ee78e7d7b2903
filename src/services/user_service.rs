use sqlx::SqliteConnection;

use super::{require_text, ServiceError, ServiceResult};
use crate::auth::password::{hash_password_async, verify_password_async};
use crate::database::models::{JoinedCourse, PublicProfile, TaskSummary, User, UserProfile};
use crate::database::DatabaseError;
use crate::types::UserId;

/// Create an account; the password is stored as an argon2 hash
pub async fn register(
    conn: &mut SqliteConnection,
    account: &str,
    password: &str,
    name: &str,
) -> ServiceResult<UserId> {
    require_text("account", account)?;
    require_text("password", password)?;
    require_text("name", name)?;

    let hash = hash_password_async(password.to_string()).await?;

    let result = sqlx::query("INSERT INTO \"user\" (account, password, name) VALUES (?, ?, ?)")
        .bind(account)
        .bind(&hash)
        .bind(name)
        .execute(&mut *conn)
        .await
        .map_err(|e| DatabaseError::from_insert(e, "Account"))?;

    let id = result.last_insert_rowid();
    tracing::info!("Registered user {}", id);
    Ok(id)
}

/// Check credentials and return the user id. Unknown account and wrong
/// password fail the same way.
pub async fn login(conn: &mut SqliteConnection, account: &str, password: &str) -> ServiceResult<UserId> {
    let user: Option<User> = sqlx::query_as(
        "SELECT id, account, password, name, description, create_at FROM \"user\" WHERE account = ?",
    )
    .bind(account)
    .fetch_optional(&mut *conn)
    .await?;

    let verified = match &user {
        Some(user) => verify_password_async(password.to_string(), user.password.clone()).await,
        None => false,
    };

    match user {
        Some(user) if verified => Ok(user.id),
        _ => {
            tracing::debug!("Login rejected for an account");
            Err(ServiceError::InvalidCredentials)
        }
    }
}

pub async fn profile(conn: &mut SqliteConnection, user_id: UserId) -> ServiceResult<UserProfile> {
    sqlx::query_as("SELECT id, account, name, description FROM \"user\" WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(ServiceError::NotFound("User"))
}

pub async fn public_profile(conn: &mut SqliteConnection, user_id: UserId) -> ServiceResult<PublicProfile> {
    sqlx::query_as("SELECT id, name, description FROM \"user\" WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(ServiceError::NotFound("User"))
}

/// Courses the user joined, each with the user's group in it (if any)
pub async fn joined_courses(conn: &mut SqliteConnection, user_id: UserId) -> ServiceResult<Vec<JoinedCourse>> {
    let courses = sqlx::query_as(
        r#"
        SELECT c.id, c.name, c.year, c.semester, mg.id AS group_id, mg.name AS group_name
        FROM course_member cm
        INNER JOIN course c ON c.id = cm.course_id
        LEFT JOIN (
            SELECT g.id, g.name, g.course_id
            FROM "group" g
            INNER JOIN group_member gm ON gm.group_id = g.id
            WHERE gm.user_id = ?
        ) mg ON mg.course_id = c.id
        WHERE cm.user_id = ?
        ORDER BY c.year DESC, c.semester DESC, c.id
        "#,
    )
    .bind(user_id)
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(courses)
}

/// Open tasks the user is assigned to or reviewing, across all groups
pub async fn assigned_tasks(conn: &mut SqliteConnection, user_id: UserId) -> ServiceResult<Vec<TaskSummary>> {
    let tasks = sqlx::query_as(
        r#"
        SELECT id, group_id, name, status
        FROM task
        WHERE (assignee_id = ? OR reviewer_id = ?) AND status <> 'Done'
        ORDER BY create_at, id
        "#,
    )
    .bind(user_id)
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(tasks)
}
