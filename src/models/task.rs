use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::image::ImageMeta;
use crate::error::AppError;

/// Represents a task row as stored in the database.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Task {
    /// Auto-incrementing identifier; listing orders by it.
    pub id: i64,
    pub title: String,
    pub description: String,
    pub completed: bool,
    /// Identifier of the user who owns the task.
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for `POST /tasks`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewTask {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Maximum length of 1000 characters. Defaults to empty.
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: String,

    #[serde(default)]
    pub completed: bool,
}

/// Payload for `PATCH /tasks/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TaskPatch {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub completed: Option<bool>,
}

/// Query parameters for `GET /tasks`.
///
/// `completed` is kept as the raw string so that an unparseable value can be reported
/// as a validation error rather than a generic query deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct TaskQuery {
    pub completed: Option<String>,
}

impl TaskQuery {
    /// Resolves the `completed` filter. An empty value means no filter.
    pub fn completed_filter(&self) -> Result<Option<bool>, AppError> {
        match self.completed.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => parse_bool(raw).map(Some).ok_or_else(|| {
                AppError::Validation(
                    "Invalid value for 'completed' parameter. Use true or false.".into(),
                )
            }),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// A task as returned by the API, with the metadata of its attached images.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub user_id: i64,
    pub images: Vec<ImageMeta>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskResponse {
    pub fn new(task: Task, images: Vec<ImageMeta>) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            completed: task.completed,
            user_id: task.user_id,
            images,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}
