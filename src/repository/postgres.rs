use async_trait::async_trait;
use sqlx::PgPool;

use super::Repository;
use crate::error::AppError;
use crate::models::{Image, ImageMeta, NewTask, NewUser, Task, TaskPatch, User};

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at, updated_at";
const TASK_COLUMNS: &str = "id, title, description, completed, user_id, created_at, updated_at";
const IMAGE_META_COLUMNS: &str = "id, task_id, filename, content_type, created_at";

/// `Repository` backed by a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user =
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user =
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user)
    }

    async fn create_task(&self, owner_id: i64, task: NewTask) -> Result<Task, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (title, description, completed, user_id) VALUES ($1, $2, $3, $4) \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(task.title)
        .bind(task.description)
        .bind(task.completed)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(task)
    }

    async fn list_tasks(
        &self,
        owner_id: i64,
        completed: Option<bool>,
    ) -> Result<Vec<Task>, AppError> {
        // A NULL filter matches every row.
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks \
             WHERE user_id = $1 AND ($2::BOOLEAN IS NULL OR completed = $2) \
             ORDER BY id"
        ))
        .bind(owner_id)
        .bind(completed)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn find_task(&self, owner_id: i64, task_id: i64) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2"
        ))
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn update_task(
        &self,
        owner_id: i64,
        task_id: i64,
        patch: TaskPatch,
    ) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET \
                 title = COALESCE($3, title), \
                 description = COALESCE($4, description), \
                 completed = COALESCE($5, completed), \
                 updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(task_id)
        .bind(owner_id)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.completed)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn delete_task(&self, owner_id: i64, task_id: i64) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "DELETE FROM tasks WHERE id = $1 AND user_id = $2 RETURNING {TASK_COLUMNS}"
        ))
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn list_images(&self, task_ids: &[i64]) -> Result<Vec<ImageMeta>, AppError> {
        if task_ids.is_empty() {
            return Ok(Vec::new());
        }
        let images = sqlx::query_as::<_, ImageMeta>(&format!(
            "SELECT {IMAGE_META_COLUMNS} FROM images WHERE task_id = ANY($1) ORDER BY id"
        ))
        .bind(task_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(images)
    }

    async fn create_image(
        &self,
        task_id: i64,
        filename: String,
        content_type: String,
        data: Vec<u8>,
    ) -> Result<ImageMeta, AppError> {
        let image = sqlx::query_as::<_, ImageMeta>(&format!(
            "INSERT INTO images (task_id, filename, content_type, data) VALUES ($1, $2, $3, $4) \
             RETURNING {IMAGE_META_COLUMNS}"
        ))
        .bind(task_id)
        .bind(filename)
        .bind(content_type)
        .bind(data)
        .fetch_one(&self.pool)
        .await?;
        Ok(image)
    }

    async fn find_image(&self, owner_id: i64, image_id: i64) -> Result<Option<Image>, AppError> {
        let image = sqlx::query_as::<_, Image>(
            "SELECT i.id, i.task_id, i.filename, i.content_type, i.data, i.created_at \
             FROM images i JOIN tasks t ON t.id = i.task_id \
             WHERE i.id = $1 AND t.user_id = $2",
        )
        .bind(image_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(image)
    }

    async fn delete_image(
        &self,
        owner_id: i64,
        image_id: i64,
    ) -> Result<Option<ImageMeta>, AppError> {
        let image = sqlx::query_as::<_, ImageMeta>(
            "DELETE FROM images i USING tasks t \
             WHERE i.id = $1 AND t.id = i.task_id AND t.user_id = $2 \
             RETURNING i.id, i.task_id, i.filename, i.content_type, i.created_at",
        )
        .bind(image_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(image)
    }
}
