use std::collections::HashMap;
use std::sync::Arc;
use validator::Validate;

use crate::error::AppError;
use crate::models::{ImageMeta, NewTask, Task, TaskPatch, TaskQuery, TaskResponse};
use crate::repository::Repository;

const TASK_NOT_FOUND: &str = "Task not found";

/// CRUD over tasks, always scoped to the owner passed in by the caller.
pub struct TaskService {
    repo: Arc<dyn Repository>,
}

impl TaskService {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, owner_id: i64, input: NewTask) -> Result<TaskResponse, AppError> {
        input.validate()?;
        let task = self.repo.create_task(owner_id, input).await?;
        log::debug!("User {} created task {}", owner_id, task.id);
        Ok(TaskResponse::new(task, Vec::new()))
    }

    /// Lists the owner's tasks by ascending id, each with its image metadata.
    pub async fn list(&self, owner_id: i64, query: &TaskQuery) -> Result<Vec<TaskResponse>, AppError> {
        let completed = query.completed_filter()?;
        let tasks = self.repo.list_tasks(owner_id, completed).await?;
        self.with_images(tasks).await
    }

    pub async fn get(&self, owner_id: i64, task_id: i64) -> Result<TaskResponse, AppError> {
        let task = self.find_owned(owner_id, task_id).await?;
        self.with_images_one(task).await
    }

    pub async fn update(
        &self,
        owner_id: i64,
        task_id: i64,
        patch: TaskPatch,
    ) -> Result<TaskResponse, AppError> {
        patch.validate()?;
        let task = self
            .repo
            .update_task(owner_id, task_id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound(TASK_NOT_FOUND.into()))?;
        self.with_images_one(task).await
    }

    /// Deletes the task and its images, returning the task as it was.
    pub async fn delete(&self, owner_id: i64, task_id: i64) -> Result<TaskResponse, AppError> {
        let task = self.find_owned(owner_id, task_id).await?;
        let images = self.repo.list_images(&[task.id]).await?;

        let deleted = self
            .repo
            .delete_task(owner_id, task_id)
            .await?
            .ok_or_else(|| AppError::NotFound(TASK_NOT_FOUND.into()))?;

        log::debug!("User {} deleted task {}", owner_id, deleted.id);
        Ok(TaskResponse::new(deleted, images))
    }

    /// Returns the task if it exists and belongs to `owner_id`.
    pub async fn find_owned(&self, owner_id: i64, task_id: i64) -> Result<Task, AppError> {
        self.repo
            .find_task(owner_id, task_id)
            .await?
            .ok_or_else(|| AppError::NotFound(TASK_NOT_FOUND.into()))
    }

    async fn with_images_one(&self, task: Task) -> Result<TaskResponse, AppError> {
        let images = self.repo.list_images(&[task.id]).await?;
        Ok(TaskResponse::new(task, images))
    }

    async fn with_images(&self, tasks: Vec<Task>) -> Result<Vec<TaskResponse>, AppError> {
        let ids: Vec<i64> = tasks.iter().map(|task| task.id).collect();
        let mut by_task: HashMap<i64, Vec<ImageMeta>> = HashMap::new();
        for image in self.repo.list_images(&ids).await? {
            by_task.entry(image.task_id).or_default().push(image);
        }

        Ok(tasks
            .into_iter()
            .map(|task| {
                let images = by_task.remove(&task.id).unwrap_or_default();
                TaskResponse::new(task, images)
            })
            .collect())
    }
}
