use actix_web::{web, HttpRequest};
use std::sync::Arc;

use crate::{
    auth::TokenManager,
    error::AppError,
    repository::Repository,
    routes,
    services::{CredentialService, ImageService, TaskService},
};

/// The services shared by every worker, built once from a repository and a token manager.
#[derive(Clone)]
pub struct AppState {
    pub credentials: web::Data<CredentialService>,
    pub tasks: web::Data<TaskService>,
    pub images: web::Data<ImageService>,
    pub tokens: web::Data<TokenManager>,
}

impl AppState {
    pub fn new(repo: Arc<dyn Repository>, tokens: TokenManager, bcrypt_cost: u32) -> Self {
        let tokens = Arc::new(tokens);
        Self {
            credentials: web::Data::new(CredentialService::new(
                repo.clone(),
                tokens.clone(),
                bcrypt_cost,
            )),
            tasks: web::Data::new(TaskService::new(repo.clone())),
            images: web::Data::new(ImageService::new(repo)),
            tokens: web::Data::from(tokens),
        }
    }

    /// Registers app data, extractor error handlers and all routes.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.credentials.clone())
            .app_data(self.tasks.clone())
            .app_data(self.images.clone())
            .app_data(self.tokens.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, req| bad_request(err, req)))
            .app_data(web::QueryConfig::default().error_handler(|err, req| bad_request(err, req)))
            .app_data(web::PathConfig::default().error_handler(|err, req| bad_request(err, req)));
        routes::config(cfg);
    }
}

// Extractor rejections become 400s with the usual JSON error body.
fn bad_request<E: std::fmt::Display>(err: E, req: &HttpRequest) -> actix_web::Error {
    log::debug!("Rejected input for {}: {}", req.path(), err);
    AppError::Validation(err.to_string()).into()
}
