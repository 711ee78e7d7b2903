//! Domain operations. Each function takes the request's single connection
//! (or transaction) and runs the membership check before anything else.

use thiserror::Error;

use crate::auth::password::PasswordError;
use crate::database::{AccessError, DatabaseError};

pub mod commit_service;
pub mod course_service;
pub mod group_service;
pub mod message_service;
pub mod review_service;
pub mod task_service;
pub mod user_service;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Request is well-formed JSON but semantically invalid
    #[error("{0}")]
    Invalid(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Invalid account or password")]
    InvalidCredentials,

    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl ServiceError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ServiceError::Invalid(message.into())
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        ServiceError::Access(AccessError::Storage(err))
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Access(AccessError::from(err))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Reject empty or whitespace-only text fields
pub(crate) fn require_text(field: &str, value: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::invalid(format!("{} must not be empty", field)));
    }
    Ok(())
}
