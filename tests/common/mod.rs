#![allow(dead_code)]

use actix_http::Request;
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::{header, StatusCode},
    test, App, Error,
};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use taskshelf::{
    auth::TokenManager,
    models::{Image, ImageMeta, NewTask, NewUser, Task, TaskPatch, User},
    repository::Repository,
    AppError, AppState,
};

pub const TEST_SECRET: &str = "integration_test_secret";

/// bcrypt's lowest accepted cost, so registration stays fast in tests.
pub const TEST_BCRYPT_COST: u32 = 4;

/// Process-local stand-in for `PgRepository` with the same ownership and cascade rules.
#[derive(Default)]
pub struct MemoryRepository {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    next_id: i64,
    users: Vec<User>,
    tasks: Vec<Task>,
    images: Vec<Image>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn owns(&self, owner_id: i64, task_id: i64) -> bool {
        self.tasks
            .iter()
            .any(|task| task.id == task_id && task.user_id == owner_id)
    }
}

impl MemoryRepository {
    pub fn image_count(&self) -> usize {
        self.state.lock().unwrap().images.len()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut state = self.state.lock().unwrap();
        if state.users.iter().any(|existing| existing.email == user.email) {
            return Err(AppError::Validation("Email already registered".into()));
        }
        let now = Utc::now();
        let user = User {
            id: state.next_id(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|user| user.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|user| user.id == id).cloned())
    }

    async fn create_task(&self, owner_id: i64, task: NewTask) -> Result<Task, AppError> {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        let task = Task {
            id: state.next_id(),
            title: task.title,
            description: task.description,
            completed: task.completed,
            user_id: owner_id,
            created_at: now,
            updated_at: now,
        };
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn list_tasks(
        &self,
        owner_id: i64,
        completed: Option<bool>,
    ) -> Result<Vec<Task>, AppError> {
        let state = self.state.lock().unwrap();
        let mut tasks: Vec<Task> = state
            .tasks
            .iter()
            .filter(|task| task.user_id == owner_id)
            .filter(|task| completed.map_or(true, |wanted| task.completed == wanted))
            .cloned()
            .collect();
        tasks.sort_by_key(|task| task.id);
        Ok(tasks)
    }

    async fn find_task(&self, owner_id: i64, task_id: i64) -> Result<Option<Task>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .tasks
            .iter()
            .find(|task| task.id == task_id && task.user_id == owner_id)
            .cloned())
    }

    async fn update_task(
        &self,
        owner_id: i64,
        task_id: i64,
        patch: TaskPatch,
    ) -> Result<Option<Task>, AppError> {
        let mut state = self.state.lock().unwrap();
        let task = match state
            .tasks
            .iter_mut()
            .find(|task| task.id == task_id && task.user_id == owner_id)
        {
            Some(task) => task,
            None => return Ok(None),
        };
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, owner_id: i64, task_id: i64) -> Result<Option<Task>, AppError> {
        let mut state = self.state.lock().unwrap();
        let position = match state
            .tasks
            .iter()
            .position(|task| task.id == task_id && task.user_id == owner_id)
        {
            Some(position) => position,
            None => return Ok(None),
        };
        let task = state.tasks.remove(position);
        state.images.retain(|image| image.task_id != task.id);
        Ok(Some(task))
    }

    async fn list_images(&self, task_ids: &[i64]) -> Result<Vec<ImageMeta>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .images
            .iter()
            .filter(|image| task_ids.contains(&image.task_id))
            .cloned()
            .map(ImageMeta::from)
            .collect())
    }

    async fn create_image(
        &self,
        task_id: i64,
        filename: String,
        content_type: String,
        data: Vec<u8>,
    ) -> Result<ImageMeta, AppError> {
        let mut state = self.state.lock().unwrap();
        let image = Image {
            id: state.next_id(),
            task_id,
            filename,
            content_type,
            data,
            created_at: Utc::now(),
        };
        state.images.push(image.clone());
        Ok(image.into())
    }

    async fn find_image(&self, owner_id: i64, image_id: i64) -> Result<Option<Image>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .images
            .iter()
            .find(|image| image.id == image_id && state.owns(owner_id, image.task_id))
            .cloned())
    }

    async fn delete_image(
        &self,
        owner_id: i64,
        image_id: i64,
    ) -> Result<Option<ImageMeta>, AppError> {
        let mut state = self.state.lock().unwrap();
        let position = state
            .images
            .iter()
            .position(|image| image.id == image_id && state.owns(owner_id, image.task_id));
        Ok(position.map(|position| state.images.remove(position).into()))
    }
}

pub fn test_state(repo: Arc<MemoryRepository>) -> AppState {
    AppState::new(repo, TokenManager::new(TEST_SECRET), TEST_BCRYPT_COST)
}

/// Builds the full application over a fresh in-memory repository.
pub async fn init_app(
    repo: Arc<MemoryRepository>,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = Error> {
    let state = test_state(repo);
    test::init_service(App::new().configure(move |cfg| state.configure(cfg))).await
}

/// Sends a request and returns the status and body, whether the service answered
/// with a response or rejected the request with an error (as the auth middleware does).
pub async fn send<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    match test::try_call_service(app, req).await {
        Ok(resp) => {
            let status = resp.status();
            let body = test::read_body(resp).await;
            let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
            (status, json)
        }
        Err(err) => {
            let resp = err.error_response();
            let status = resp.status();
            let body = actix_web::body::to_bytes(resp.into_body())
                .await
                .unwrap_or_default();
            let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
            (status, json)
        }
    }
}

pub async fn register_and_login<S, B>(app: &S, username: &str, email: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({ "username": username, "email": email, "password": "Password123!" }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": email, "password": "Password123!" }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["token"]
        .as_str()
        .expect("login response carries a token")
        .to_string()
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

pub async fn create_task<S, B>(app: &S, token: &str, body: Value) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(bearer(token))
        .set_json(body)
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "create task failed: {}", body);
    body
}

pub const BOUNDARY: &str = "----taskshelf-test-boundary";

/// Encodes a single-file `multipart/form-data` body.
pub fn multipart_body(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 256);
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn upload_request(token: &str, task_id: i64, body: Vec<u8>) -> Request {
    test::TestRequest::post()
        .uri(&format!("/tasks/{}/images", task_id))
        .insert_header(bearer(token))
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(body)
        .to_request()
}
