use serde_json::Value;
use sqlx::sqlite::{Sqlite, SqliteArguments};
use sqlx::SqliteConnection;

use super::access::AccessError;
use super::manager::DatabaseError;
use crate::types::UserId;

/// Parameterized statement plus its bind values, in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}

/// Tables that accept partial updates. Identifiers and column allow-lists are
/// fixed here; nothing about them is taken from a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Course,
    Group,
    Task,
}

impl Table {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Table::Course => "course",
            Table::Group => "\"group\"",
            Table::Task => "task",
        }
    }

    /// Column holding the id of the user allowed to update a row
    pub fn owner_column(&self) -> &'static str {
        match self {
            Table::Course | Table::Group => "owner_id",
            Table::Task => "creator_id",
        }
    }

    pub fn updatable_columns(&self) -> &'static [&'static str] {
        match self {
            Table::Course | Table::Group => &["name", "description"],
            Table::Task => &["name", "description", "assignee_id", "reviewer_id", "status", "close_at"],
        }
    }
}

/// Row filter for a partial update: the row id plus the user who must own it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnedBy {
    pub id: i64,
    pub owner_column: &'static str,
    pub owner_id: UserId,
}

impl OwnedBy {
    pub fn row(table: Table, id: i64, owner_id: UserId) -> Self {
        Self {
            id,
            owner_column: table.owner_column(),
            owner_id,
        }
    }
}

/// Assemble `UPDATE <table> SET ... WHERE id = ? AND <owner> = ?`.
///
/// Columns are walked in order. A candidate of `None` leaves the column out of
/// the SET list; `Some(Value::Null)` sets it to NULL. Values only ever travel
/// as bind parameters, and column names must be on the table's allow-list.
pub fn build_update(
    table: Table,
    columns: &[(&'static str, Option<Value>)],
    scope: OwnedBy,
) -> Result<SqlResult, AccessError> {
    let allowed = table.updatable_columns();
    let mut assignments = Vec::new();
    let mut params = Vec::new();

    for (column, candidate) in columns {
        if !allowed.contains(column) {
            return Err(AccessError::MalformedUpdate(format!(
                "column '{}' is not updatable on {}",
                column,
                table.as_sql()
            )));
        }
        if let Some(value) = candidate {
            assignments.push(format!("{} = ?", column));
            params.push(value.clone());
        }
    }

    if assignments.is_empty() {
        return Err(AccessError::NoFieldsToUpdate);
    }

    params.push(Value::from(scope.id));
    params.push(Value::from(scope.owner_id));

    let query = format!(
        "UPDATE {} SET {} WHERE id = ? AND {} = ?",
        table.as_sql(),
        assignments.join(", "),
        scope.owner_column
    );

    Ok(SqlResult { query, params })
}

/// Chained front end to [`build_update`] used by the services
pub struct UpdateBuilder {
    table: Table,
    columns: Vec<(&'static str, Option<Value>)>,
    scope: Option<OwnedBy>,
}

impl UpdateBuilder {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            columns: Vec::new(),
            scope: None,
        }
    }

    pub fn set(mut self, column: &'static str, candidate: Option<Value>) -> Self {
        self.columns.push((column, candidate));
        self
    }

    /// Restrict the update to row `id` owned by `owner_id`
    pub fn owned_by(mut self, id: i64, owner_id: UserId) -> Self {
        self.scope = Some(OwnedBy::row(self.table, id, owner_id));
        self
    }

    pub fn build(self) -> Result<SqlResult, AccessError> {
        let scope = self
            .scope
            .ok_or_else(|| AccessError::MalformedUpdate("partial update requires an id and owner scope".to_string()))?;
        build_update(self.table, &self.columns, scope)
    }
}

/// Run a built statement; returns the number of rows changed
pub async fn execute_update(
    conn: &mut SqliteConnection,
    sql: &SqlResult,
) -> Result<u64, DatabaseError> {
    let mut q = sqlx::query(&sql.query);
    for p in sql.params.iter() {
        q = bind_param(q, p);
    }
    let result = q.execute(&mut *conn).await?;
    Ok(result.rows_affected())
}

pub fn bind_param<'q>(
    q: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    v: &'q Value,
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        // Stored as JSON text
        Value::Array(_) | Value::Object(_) => q.bind(v.to_string()),
    }
}
