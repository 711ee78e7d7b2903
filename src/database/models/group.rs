use serde::Serialize;
use sqlx::FromRow;

use crate::types::{CourseId, GroupId, UserId};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Group {
    pub id: GroupId,
    pub course_id: CourseId,
    pub owner_id: UserId,
    pub name: String,
    pub description: Option<String>,
}

/// Group header joined with course and owner names
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GroupDetail {
    pub id: GroupId,
    pub course: String,
    pub owner_id: UserId,
    pub owner: String,
    pub name: String,
    pub description: Option<String>,
}

/// Row in a course's group listing
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GroupSummary {
    pub id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub owner: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GroupMember {
    pub id: UserId,
    pub name: String,
    pub description: Option<String>,
}
