use serde::Serialize;
use sqlx::SqliteConnection;

use super::{require_text, ServiceResult};
use crate::database::models::{GroupDetail, GroupMember};
use crate::database::{
    assert_member, execute_update, is_member, AccessError, DatabaseError, ResourceKind, Table, UpdateBuilder,
};
use crate::types::{CourseId, GroupId, Patch, UserId};

#[derive(Debug, Serialize)]
pub struct GroupInfo {
    pub group: GroupDetail,
    pub members: Vec<GroupMember>,
    pub in_group: bool,
}

/// Create a group in a course the caller belongs to, with the caller as its
/// owner and first member. Call inside a transaction.
pub async fn create(
    conn: &mut SqliteConnection,
    caller: UserId,
    course_id: CourseId,
    name: &str,
    description: Option<&str>,
) -> ServiceResult<GroupId> {
    assert_member(conn, caller, course_id, ResourceKind::Course).await?;
    require_text("name", name)?;

    let id = sqlx::query("INSERT INTO \"group\" (course_id, owner_id, name, description) VALUES (?, ?, ?, ?)")
        .bind(course_id)
        .bind(caller)
        .bind(name)
        .bind(description)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

    sqlx::query("INSERT INTO group_member (user_id, group_id) VALUES (?, ?)")
        .bind(caller)
        .bind(id)
        .execute(&mut *conn)
        .await?;

    tracing::info!("User {} created group {} in course {}", caller, id, course_id);
    Ok(id)
}

/// Group header, member list and whether the caller is one of them.
/// An unknown group is reported as access denied.
pub async fn info(conn: &mut SqliteConnection, caller: UserId, group_id: GroupId) -> ServiceResult<GroupInfo> {
    let group: GroupDetail = sqlx::query_as(
        r#"
        SELECT g.id, c.name AS course, g.owner_id, u.name AS owner, g.name, g.description
        FROM "group" g
        INNER JOIN "user" u ON u.id = g.owner_id
        INNER JOIN course c ON c.id = g.course_id
        WHERE g.id = ?
        "#,
    )
    .bind(group_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(AccessError::NotAMember)?;

    let members = list_members(conn, group_id, None).await?;
    let in_group = is_member(conn, caller, group_id, ResourceKind::Group).await?;

    Ok(GroupInfo { group, members, in_group })
}

/// Owner-only rename / redescribe
pub async fn update(
    conn: &mut SqliteConnection,
    caller: UserId,
    group_id: GroupId,
    name: Patch<String>,
    description: Patch<String>,
) -> ServiceResult<()> {
    assert_member(conn, caller, group_id, ResourceKind::Group).await?;

    let sql = UpdateBuilder::new(Table::Group)
        .set("name", name.required())
        .set("description", description.nullable())
        .owned_by(group_id, caller)
        .build()?;

    if execute_update(conn, &sql).await? == 0 {
        return Err(AccessError::NotAMember.into());
    }
    Ok(())
}

/// Join a group; only members of the group's course may
pub async fn join(conn: &mut SqliteConnection, caller: UserId, group_id: GroupId) -> ServiceResult<()> {
    let course_id: CourseId = sqlx::query_scalar("SELECT course_id FROM \"group\" WHERE id = ?")
        .bind(group_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(AccessError::NotAMember)?;

    assert_member(conn, caller, course_id, ResourceKind::Course).await?;

    sqlx::query("INSERT INTO group_member (user_id, group_id) VALUES (?, ?)")
        .bind(caller)
        .bind(group_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| DatabaseError::from_insert(e, "Group membership"))?;

    tracing::info!("User {} joined group {}", caller, group_id);
    Ok(())
}

/// Members of a group, optionally filtered by a name substring
pub async fn members(
    conn: &mut SqliteConnection,
    caller: UserId,
    group_id: GroupId,
    name: Option<&str>,
) -> ServiceResult<Vec<GroupMember>> {
    assert_member(conn, caller, group_id, ResourceKind::Group).await?;
    Ok(list_members(conn, group_id, name).await?)
}

async fn list_members(
    conn: &mut SqliteConnection,
    group_id: GroupId,
    name: Option<&str>,
) -> Result<Vec<GroupMember>, DatabaseError> {
    let pattern = format!("%{}%", escape_like(name.unwrap_or_default()));

    let members = sqlx::query_as(
        r#"
        SELECT u.id, u.name, u.description
        FROM group_member gm
        INNER JOIN "user" u ON u.id = gm.user_id
        WHERE gm.group_id = ? AND u.name LIKE ? ESCAPE '\'
        ORDER BY u.id
        "#,
    )
    .bind(group_id)
    .bind(pattern)
    .fetch_all(&mut *conn)
    .await?;

    Ok(members)
}

/// Make `%`, `_` and `\` match literally inside a LIKE pattern
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceError;
    use crate::testing::TestContext;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[tokio::test]
    async fn create_requires_course_membership() {
        let ctx = TestContext::new().await.unwrap();
        let owner = ctx.create_user("owner").await.unwrap();
        let outsider = ctx.create_user("outsider").await.unwrap();
        let course = ctx.create_course(owner, "Systems").await.unwrap();

        let mut tx = ctx.db.begin().await.unwrap();
        let result = create(&mut tx, outsider, course, "Team", None).await;
        assert!(matches!(result, Err(ServiceError::Access(AccessError::NotAMember))));
        drop(tx);

        let mut tx = ctx.db.begin().await.unwrap();
        let group = create(&mut tx, owner, course, "Team", Some("first")).await.unwrap();
        tx.commit().await.unwrap();

        let mut conn = ctx.db.acquire().await.unwrap();
        assert!(is_member(&mut conn, owner, group, ResourceKind::Group).await.unwrap());
    }

    #[tokio::test]
    async fn info_reports_membership_and_hides_unknown_groups() {
        let ctx = TestContext::new().await.unwrap();
        let owner = ctx.create_user("owner").await.unwrap();
        let visitor = ctx.create_user("visitor").await.unwrap();
        let course = ctx.create_course(owner, "Systems").await.unwrap();
        let group = ctx.create_group(course, owner, "Team").await.unwrap();
        let mut conn = ctx.db.acquire().await.unwrap();

        let seen = info(&mut conn, visitor, group).await.unwrap();
        assert!(!seen.in_group);
        assert_eq!(seen.group.course, "Systems");
        assert_eq!(seen.members.len(), 1);
        assert!(info(&mut conn, owner, group).await.unwrap().in_group);

        assert!(matches!(
            info(&mut conn, owner, 9_999).await,
            Err(ServiceError::Access(AccessError::NotAMember))
        ));
    }

    #[tokio::test]
    async fn join_needs_course_membership_once() {
        let ctx = TestContext::new().await.unwrap();
        let owner = ctx.create_user("owner").await.unwrap();
        let student = ctx.create_user("student").await.unwrap();
        let course = ctx.create_course(owner, "Systems").await.unwrap();
        let group = ctx.create_group(course, owner, "Team").await.unwrap();

        let mut conn = ctx.db.acquire().await.unwrap();
        assert!(matches!(
            join(&mut conn, student, group).await,
            Err(ServiceError::Access(AccessError::NotAMember))
        ));
        drop(conn);

        ctx.join_course(student, course).await.unwrap();
        let mut conn = ctx.db.acquire().await.unwrap();
        join(&mut conn, student, group).await.unwrap();
        assert!(matches!(
            join(&mut conn, student, group).await,
            Err(ServiceError::Access(AccessError::Storage(DatabaseError::Conflict(_))))
        ));
    }

    #[tokio::test]
    async fn member_search_treats_wildcards_literally() {
        let ctx = TestContext::new().await.unwrap();
        let owner = ctx.create_user("owner").await.unwrap();
        let percent = ctx.create_user("100% done").await.unwrap();
        let course = ctx.create_course(owner, "Systems").await.unwrap();
        let group = ctx.create_group(course, owner, "Team").await.unwrap();
        ctx.join_group(percent, group).await.unwrap();

        let mut conn = ctx.db.acquire().await.unwrap();
        assert_eq!(members(&mut conn, owner, group, None).await.unwrap().len(), 2);

        let found = members(&mut conn, owner, group, Some("%")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, percent);

        assert!(members(&mut conn, owner, group, Some("_wn")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_by_non_owner_changes_nothing() {
        let ctx = TestContext::new().await.unwrap();
        let owner = ctx.create_user("owner").await.unwrap();
        let member = ctx.create_user("member").await.unwrap();
        let course = ctx.create_course(owner, "Systems").await.unwrap();
        let group = ctx.create_group(course, owner, "Team").await.unwrap();
        ctx.join_group(member, group).await.unwrap();

        let mut conn = ctx.db.acquire().await.unwrap();
        assert!(matches!(
            update(&mut conn, member, group, Patch::Value("Mine".into()), Patch::Missing).await,
            Err(ServiceError::Access(AccessError::NotAMember))
        ));
        update(&mut conn, owner, group, Patch::Value("Ok".into()), Patch::Missing)
            .await
            .unwrap();
        assert_eq!(info(&mut conn, owner, group).await.unwrap().group.name, "Ok");
    }

    #[tokio::test]
    async fn outsider_is_denied_before_fields_are_checked() {
        let ctx = TestContext::new().await.unwrap();
        let owner = ctx.create_user("owner").await.unwrap();
        let outsider = ctx.create_user("outsider").await.unwrap();
        let course = ctx.create_course(owner, "Systems").await.unwrap();
        let group = ctx.create_group(course, owner, "Team").await.unwrap();

        let mut conn = ctx.db.acquire().await.unwrap();
        assert!(matches!(
            update(&mut conn, outsider, group, Patch::Null, Patch::Missing).await,
            Err(ServiceError::Access(AccessError::NotAMember))
        ));
        assert!(matches!(
            update(&mut conn, owner, group, Patch::Null, Patch::Missing).await,
            Err(ServiceError::Access(AccessError::NoFieldsToUpdate))
        ));
    }
}
