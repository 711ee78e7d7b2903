//! Table definitions, applied idempotently at startup and by `meet-team-api migrate`.

use super::manager::{DatabaseError, DatabaseManager};

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS "user" (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        account     TEXT     NOT NULL UNIQUE,
        password    TEXT     NOT NULL,
        name        TEXT     NOT NULL,
        description TEXT,
        create_at   DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS course (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT     NOT NULL,
        year        INTEGER  NOT NULL,
        semester    INTEGER  NOT NULL,
        description TEXT,
        owner_id    INTEGER  NOT NULL REFERENCES "user"(id),
        create_at   DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS course_member (
        user_id   INTEGER NOT NULL REFERENCES "user"(id),
        course_id INTEGER NOT NULL REFERENCES course(id),
        PRIMARY KEY (user_id, course_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "group" (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        course_id   INTEGER NOT NULL REFERENCES course(id),
        owner_id    INTEGER NOT NULL REFERENCES "user"(id),
        name        TEXT    NOT NULL,
        description TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS group_member (
        user_id  INTEGER NOT NULL REFERENCES "user"(id),
        group_id INTEGER NOT NULL REFERENCES "group"(id),
        PRIMARY KEY (user_id, group_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS task (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        group_id    INTEGER  NOT NULL REFERENCES "group"(id),
        creator_id  INTEGER  NOT NULL REFERENCES "user"(id),
        name        TEXT     NOT NULL,
        description TEXT,
        assignee_id INTEGER  REFERENCES "user"(id),
        reviewer_id INTEGER  REFERENCES "user"(id),
        status      TEXT     NOT NULL DEFAULT 'Todo',
        create_at   DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        close_at    DATETIME
    )
    "#,
    r#"CREATE INDEX IF NOT EXISTS task_group_id ON task (group_id)"#,
    r#"
    CREATE TABLE IF NOT EXISTS "commit" (
        id             INTEGER PRIMARY KEY AUTOINCREMENT,
        task_id        INTEGER  NOT NULL REFERENCES task(id),
        creator_id     INTEGER  NOT NULL REFERENCES "user"(id),
        title          TEXT,
        description    TEXT,
        reference_link TEXT,
        create_at      DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"CREATE INDEX IF NOT EXISTS commit_task_id ON "commit" (task_id)"#,
    r#"
    CREATE TABLE IF NOT EXISTS review (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        group_id    INTEGER  NOT NULL REFERENCES "group"(id),
        reviewer_id INTEGER  NOT NULL REFERENCES "user"(id),
        user_id     INTEGER  NOT NULL REFERENCES "user"(id),
        content     TEXT     NOT NULL,
        rating      REAL     NOT NULL,
        create_at   DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE (group_id, reviewer_id, user_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS message (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        task_id     INTEGER  NOT NULL REFERENCES task(id),
        creator_id  INTEGER  NOT NULL REFERENCES "user"(id),
        description TEXT     NOT NULL,
        create_at   DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
];

/// Create any missing tables and indexes
pub async fn migrate(db: &DatabaseManager) -> Result<(), DatabaseError> {
    let mut conn = db.acquire().await?;
    for statement in STATEMENTS {
        sqlx::query(statement).execute(&mut *conn).await?;
    }
    tracing::info!("Schema up to date ({} statements)", STATEMENTS.len());
    Ok(())
}
