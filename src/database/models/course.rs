use serde::Serialize;
use sqlx::FromRow;

use crate::types::{CourseId, UserId};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub year: i64,
    pub semester: i64,
    pub description: Option<String>,
    pub owner_id: UserId,
}

/// A course on the caller's dashboard, with the caller's group in it if any
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JoinedCourse {
    pub id: CourseId,
    pub name: String,
    pub year: i64,
    pub semester: i64,
    pub group_id: Option<i64>,
    pub group_name: Option<String>,
}
