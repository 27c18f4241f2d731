use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;

/// Largest accepted image payload: 10 MiB.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

pub const ALLOWED_CONTENT_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// A full image row, payload included.
#[derive(Debug, Clone, FromRow)]
pub struct Image {
    pub id: i64,
    pub task_id: i64,
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

/// Image metadata as exposed by the API. Never carries the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ImageMeta {
    pub id: i64,
    #[serde(skip)]
    pub task_id: i64,
    pub filename: String,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

impl From<Image> for ImageMeta {
    fn from(image: Image) -> Self {
        Self {
            id: image.id,
            task_id: image.task_id,
            filename: image.filename,
            content_type: image.content_type,
            created_at: image.created_at,
        }
    }
}

/// A file received from a multipart upload, not yet persisted.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl ImageUpload {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.data.is_empty() {
            return Err(AppError::Validation("No file uploaded".into()));
        }
        if self.data.len() > MAX_IMAGE_BYTES {
            return Err(AppError::Validation("File exceeds 10 MB limit".into()));
        }
        if !ALLOWED_CONTENT_TYPES.contains(&self.content_type.as_str()) {
            return Err(AppError::Validation(
                "Invalid image format, only JPEG and PNG are allowed".into(),
            ));
        }
        Ok(())
    }
}
