use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{NewTask, TaskPatch, TaskQuery},
    routes::images::read_image_upload,
    services::{ImageService, TaskService},
};
use actix_multipart::Multipart;
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};

/// Retrieves the authenticated user's tasks.
///
/// Tasks are ordered by id (creation order) and each carries the metadata of its
/// attached images.
///
/// ## Query Parameters:
/// - `completed` (optional): `true` or `false` (also `1`/`0`, `t`/`f`).
///
/// ## Responses:
/// - `200 OK`: JSON array of tasks.
/// - `400 Bad Request`: `completed` is not a boolean.
/// - `401 Unauthorized`: missing or invalid token.
#[get("")]
pub async fn get_tasks(
    tasks: web::Data<TaskService>,
    query_params: web::Query<TaskQuery>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = tasks.list(user.0, &query_params).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task owned by the authenticated user.
///
/// ## Request Body:
/// - `title`: 1 to 200 characters (required).
/// - `description` (optional): up to 1000 characters, defaults to empty.
/// - `completed` (optional): defaults to `false`.
///
/// ## Responses:
/// - `201 Created`: the new task.
/// - `400 Bad Request`: malformed body or failed validation.
#[post("")]
pub async fn create_task(
    tasks: web::Data<TaskService>,
    task_data: web::Json<NewTask>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = tasks.create(user.0, task_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a single task with its images.
///
/// A task owned by someone else is reported exactly like a missing one (`404`).
#[get("/{id}")]
pub async fn get_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<i64>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = tasks.get(user.0, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Partially updates a task. Fields absent from the body keep their value.
///
/// ## Responses:
/// - `200 OK`: the updated task.
/// - `400 Bad Request`: failed validation.
/// - `404 Not Found`: no such task for this user.
#[patch("/{id}")]
pub async fn update_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<i64>,
    task_data: web::Json<TaskPatch>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = tasks
        .update(user.0, task_id.into_inner(), task_data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task together with its images and returns what was deleted.
#[delete("/{id}")]
pub async fn delete_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<i64>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = tasks.delete(user.0, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Attaches an image to a task.
///
/// Expects `multipart/form-data` with the file in the `image` field. Only JPEG and
/// PNG up to 10 MB are accepted.
///
/// ## Responses:
/// - `200 OK`: the stored image's metadata.
/// - `400 Bad Request`: no file, file too large, or unsupported format.
/// - `404 Not Found`: no such task for this user.
#[post("/{task_id}/images")]
pub async fn upload_image(
    images: web::Data<ImageService>,
    task_id: web::Path<i64>,
    payload: Multipart,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let upload = read_image_upload(payload).await?;
    let image = images.upload(user.0, task_id.into_inner(), upload).await?;
    Ok(HttpResponse::Ok().json(image))
}
