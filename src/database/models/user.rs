use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

use crate::types::UserId;

/// Full `user` row, including the password hash. Never serialized.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: UserId,
    pub account: String,
    pub password: String,
    pub name: String,
    pub description: Option<String>,
    pub create_at: NaiveDateTime,
}

/// What a user sees about themselves
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserProfile {
    pub id: UserId,
    pub account: String,
    pub name: String,
    pub description: Option<String>,
}

/// What other users see
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PublicProfile {
    pub id: UserId,
    pub name: String,
    pub description: Option<String>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            account: user.account,
            name: user.name,
            description: user.description,
        }
    }
}
