//! Fixtures for unit tests: a private in-memory database with the schema
//! applied, plus shortcuts for the rows most tests need.

use crate::database::schema::migrate;
use crate::database::DatabaseManager;
use crate::types::{CourseId, GroupId, TaskId, UserId};

/// Stored in place of a real hash; fixture users never log in
const FIXTURE_PASSWORD: &str = "fixture-password-not-a-hash";

pub struct TestContext {
    pub db: DatabaseManager,
}

impl TestContext {
    pub async fn new() -> anyhow::Result<Self> {
        let db = DatabaseManager::in_memory().await?;
        migrate(&db).await?;
        Ok(Self { db })
    }

    /// User whose account and display name are both `name`
    pub async fn create_user(&self, name: &str) -> anyhow::Result<UserId> {
        let id = sqlx::query("INSERT INTO \"user\" (account, password, name) VALUES (?, ?, ?)")
            .bind(name)
            .bind(FIXTURE_PASSWORD)
            .bind(name)
            .execute(self.db.pool())
            .await?
            .last_insert_rowid();
        Ok(id)
    }

    /// Course owned by `owner`, who is also enrolled
    pub async fn create_course(&self, owner: UserId, name: &str) -> anyhow::Result<CourseId> {
        let id = sqlx::query("INSERT INTO course (name, year, semester, owner_id) VALUES (?, 2024, 1, ?)")
            .bind(name)
            .bind(owner)
            .execute(self.db.pool())
            .await?
            .last_insert_rowid();
        self.join_course(owner, id).await?;
        Ok(id)
    }

    /// Group owned by `owner`, who is also its first member
    pub async fn create_group(&self, course: CourseId, owner: UserId, name: &str) -> anyhow::Result<GroupId> {
        let id = sqlx::query("INSERT INTO \"group\" (course_id, owner_id, name) VALUES (?, ?, ?)")
            .bind(course)
            .bind(owner)
            .bind(name)
            .execute(self.db.pool())
            .await?
            .last_insert_rowid();
        self.join_group(owner, id).await?;
        Ok(id)
    }

    pub async fn create_task(&self, group: GroupId, creator: UserId, name: &str) -> anyhow::Result<TaskId> {
        let id = sqlx::query("INSERT INTO task (group_id, creator_id, name) VALUES (?, ?, ?)")
            .bind(group)
            .bind(creator)
            .bind(name)
            .execute(self.db.pool())
            .await?
            .last_insert_rowid();
        Ok(id)
    }

    pub async fn join_course(&self, user: UserId, course: CourseId) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO course_member (user_id, course_id) VALUES (?, ?)")
            .bind(user)
            .bind(course)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    pub async fn join_group(&self, user: UserId, group: GroupId) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO group_member (user_id, group_id) VALUES (?, ?)")
            .bind(user)
            .bind(group)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixtures_link_owners_as_members() {
        let ctx = TestContext::new().await.unwrap();
        let owner = ctx.create_user("owner").await.unwrap();
        let course = ctx.create_course(owner, "Systems").await.unwrap();
        let group = ctx.create_group(course, owner, "Team").await.unwrap();

        let members: i64 = sqlx::query_scalar(
            "SELECT (SELECT COUNT(*) FROM course_member WHERE user_id = ?) + (SELECT COUNT(*) FROM group_member WHERE group_id = ?)",
        )
        .bind(owner)
        .bind(group)
        .fetch_one(ctx.db.pool())
        .await
        .unwrap();
        assert_eq!(members, 2);
    }
}
