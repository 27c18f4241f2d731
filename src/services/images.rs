use std::sync::Arc;

use crate::error::AppError;
use crate::models::{Image, ImageMeta, ImageUpload};
use crate::repository::Repository;

const IMAGE_NOT_FOUND: &str = "Image not found";

/// Image attachments. Every operation is limited to images on the caller's own tasks.
pub struct ImageService {
    repo: Arc<dyn Repository>,
}

impl ImageService {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    pub async fn upload(
        &self,
        owner_id: i64,
        task_id: i64,
        upload: ImageUpload,
    ) -> Result<ImageMeta, AppError> {
        if self.repo.find_task(owner_id, task_id).await?.is_none() {
            return Err(AppError::NotFound("Task not found".into()));
        }
        upload.validate()?;

        let size = upload.data.len();
        let image = self
            .repo
            .create_image(task_id, upload.filename, upload.content_type, upload.data)
            .await?;
        log::info!(
            "Stored image {} ({} bytes) on task {}",
            image.id,
            size,
            task_id
        );
        Ok(image)
    }

    pub async fn get(&self, owner_id: i64, image_id: i64) -> Result<Image, AppError> {
        self.repo
            .find_image(owner_id, image_id)
            .await?
            .ok_or_else(|| AppError::NotFound(IMAGE_NOT_FOUND.into()))
    }

    pub async fn delete(&self, owner_id: i64, image_id: i64) -> Result<ImageMeta, AppError> {
        self.repo
            .delete_image(owner_id, image_id)
            .await?
            .ok_or_else(|| AppError::NotFound(IMAGE_NOT_FOUND.into()))
    }
}
