//! Shared types used across the codebase

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub type UserId = i64;
pub type CourseId = i64;
pub type GroupId = i64;
pub type TaskId = i64;

/// A field in a partial-update request body.
///
/// JSON gives three states for an optional field and they mean different
/// things: the key can be missing, present with `null`, or present with a
/// value. Fields of this type must be annotated with `#[serde(default)]` so a
/// missing key becomes `Patch::Missing`.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    Missing,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Missing
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        })
    }
}

impl<T: Into<Value>> Patch<T> {
    /// Candidate for a NOT NULL column: an explicit null is treated as absent
    pub fn required(self) -> Option<Value> {
        match self {
            Patch::Value(v) => Some(v.into()),
            Patch::Missing | Patch::Null => None,
        }
    }

    /// Candidate for a nullable column: an explicit null clears the column
    pub fn nullable(self) -> Option<Value> {
        match self {
            Patch::Value(v) => Some(v.into()),
            Patch::Null => Some(Value::Null),
            Patch::Missing => None,
        }
    }
}

impl<T> Patch<T> {
    pub fn as_value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// Task workflow states, stored as text in `task.status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Todo,
    Doing,
    Review,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "Todo",
            TaskStatus::Doing => "Doing",
            TaskStatus::Review => "Review",
            TaskStatus::Done => "Done",
        }
    }
}

impl From<TaskStatus> for Value {
    fn from(status: TaskStatus) -> Self {
        Value::String(status.as_str().to_string())
    }
}
