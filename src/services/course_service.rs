use sqlx::SqliteConnection;

use super::{require_text, ServiceError, ServiceResult};
use crate::database::models::{Course, GroupSummary};
use crate::database::{assert_member, execute_update, AccessError, DatabaseError, ResourceKind, Table, UpdateBuilder};
use crate::types::{CourseId, Patch, UserId};

pub struct NewCourse<'a> {
    pub name: &'a str,
    pub year: i64,
    pub semester: i64,
    pub description: Option<&'a str>,
}

/// Insert a course and enrol its owner. Call inside a transaction.
pub async fn create(conn: &mut SqliteConnection, owner_id: UserId, course: NewCourse<'_>) -> ServiceResult<CourseId> {
    require_text("name", course.name)?;

    let id = sqlx::query(
        "INSERT INTO course (name, year, semester, description, owner_id) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(course.name)
    .bind(course.year)
    .bind(course.semester)
    .bind(course.description)
    .bind(owner_id)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    sqlx::query("INSERT INTO course_member (user_id, course_id) VALUES (?, ?)")
        .bind(owner_id)
        .bind(id)
        .execute(&mut *conn)
        .await?;

    tracing::info!("User {} created course {}", owner_id, id);
    Ok(id)
}

pub async fn list(conn: &mut SqliteConnection, offset: i64, limit: i64) -> ServiceResult<Vec<Course>> {
    let courses = sqlx::query_as(
        "SELECT id, name, year, semester, description, owner_id FROM course ORDER BY id LIMIT ? OFFSET ?",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(&mut *conn)
    .await?;

    Ok(courses)
}

pub async fn find(conn: &mut SqliteConnection, course_id: CourseId) -> ServiceResult<Course> {
    sqlx::query_as("SELECT id, name, year, semester, description, owner_id FROM course WHERE id = ?")
        .bind(course_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(ServiceError::NotFound("Course"))
}

/// Owner-only rename / redescribe
pub async fn update(
    conn: &mut SqliteConnection,
    caller: UserId,
    course_id: CourseId,
    name: Patch<String>,
    description: Patch<String>,
) -> ServiceResult<()> {
    assert_member(conn, caller, course_id, ResourceKind::Course).await?;

    let sql = UpdateBuilder::new(Table::Course)
        .set("name", name.required())
        .set("description", description.nullable())
        .owned_by(course_id, caller)
        .build()?;

    if execute_update(conn, &sql).await? == 0 {
        return Err(AccessError::NotAMember.into());
    }
    Ok(())
}

pub async fn join(conn: &mut SqliteConnection, caller: UserId, course_id: CourseId) -> ServiceResult<()> {
    find(conn, course_id).await?;

    sqlx::query("INSERT INTO course_member (user_id, course_id) VALUES (?, ?)")
        .bind(caller)
        .bind(course_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| DatabaseError::from_insert(e, "Course membership"))?;

    tracing::info!("User {} joined course {}", caller, course_id);
    Ok(())
}

/// Groups in a course, visible to course members only
pub async fn groups(conn: &mut SqliteConnection, caller: UserId, course_id: CourseId) -> ServiceResult<Vec<GroupSummary>> {
    assert_member(conn, caller, course_id, ResourceKind::Course).await?;

    let groups = sqlx::query_as(
        r#"
        SELECT g.id, g.name, g.description, u.name AS owner
        FROM "group" g
        INNER JOIN "user" u ON u.id = g.owner_id
        WHERE g.course_id = ?
        ORDER BY g.id
        "#,
    )
    .bind(course_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(groups)
}
