//! Persistence boundary.
//!
//! Services talk to storage only through [`Repository`], which is constructed once at
//! startup and handed to each service as an `Arc<dyn Repository>`. The production
//! implementation is [`PgRepository`].
//!
//! Every task and image lookup takes the caller's user id: a row owned by someone else
//! comes back as `None`, exactly like a row that does not exist.

pub mod postgres;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{Image, ImageMeta, NewTask, NewUser, Task, TaskPatch, User};

pub use postgres::PgRepository;

#[async_trait]
pub trait Repository: Send + Sync {
    /// Inserts a user. A duplicate email fails with `AppError::Validation`.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    async fn create_task(&self, owner_id: i64, task: NewTask) -> Result<Task, AppError>;
    /// Tasks owned by `owner_id`, ordered by id ascending.
    async fn list_tasks(&self, owner_id: i64, completed: Option<bool>)
        -> Result<Vec<Task>, AppError>;
    async fn find_task(&self, owner_id: i64, task_id: i64) -> Result<Option<Task>, AppError>;
    async fn update_task(
        &self,
        owner_id: i64,
        task_id: i64,
        patch: TaskPatch,
    ) -> Result<Option<Task>, AppError>;
    /// Deletes the task and, through the cascade, its images.
    async fn delete_task(&self, owner_id: i64, task_id: i64) -> Result<Option<Task>, AppError>;

    /// Metadata of every image attached to the given tasks, ordered by id ascending.
    async fn list_images(&self, task_ids: &[i64]) -> Result<Vec<ImageMeta>, AppError>;
    async fn create_image(
        &self,
        task_id: i64,
        filename: String,
        content_type: String,
        data: Vec<u8>,
    ) -> Result<ImageMeta, AppError>;
    async fn find_image(&self, owner_id: i64, image_id: i64) -> Result<Option<Image>, AppError>;
    async fn delete_image(&self, owner_id: i64, image_id: i64)
        -> Result<Option<ImageMeta>, AppError>;
}
