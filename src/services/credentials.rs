use actix_web::web;
use std::sync::Arc;
use validator::Validate;

use crate::auth::{hash_password, verify_password, LoginRequest, RegisterRequest, TokenManager};
use crate::error::AppError;
use crate::models::{NewUser, UserResponse};
use crate::repository::Repository;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Registration, login and identity lookup.
pub struct CredentialService {
    repo: Arc<dyn Repository>,
    tokens: Arc<TokenManager>,
    hash_cost: u32,
}

impl CredentialService {
    pub fn new(repo: Arc<dyn Repository>, tokens: Arc<TokenManager>, hash_cost: u32) -> Self {
        Self {
            repo,
            tokens,
            hash_cost,
        }
    }

    /// Creates a user account. Fails with a validation error if the email is taken.
    pub async fn register(&self, request: RegisterRequest) -> Result<UserResponse, AppError> {
        request.validate()?;

        if self.repo.find_user_by_email(&request.email).await?.is_some() {
            return Err(AppError::Validation("Email already registered".into()));
        }

        let cost = self.hash_cost;
        let password = request.password;
        let password_hash = web::block(move || hash_password(&password, cost)).await??;

        let user = self
            .repo
            .create_user(NewUser {
                username: request.username,
                email: request.email,
                password_hash,
            })
            .await?;

        log::info!("Registered user {}", user.id);
        Ok(user.into())
    }

    /// Checks the credentials and returns a freshly signed token.
    ///
    /// An unknown email is `NotFound` and a wrong password is `Unauthorized`, but both
    /// carry the same message.
    pub async fn login(&self, request: LoginRequest) -> Result<String, AppError> {
        request.validate()?;

        let user = match self.repo.find_user_by_email(&request.email).await? {
            Some(user) => user,
            None => return Err(AppError::NotFound(INVALID_CREDENTIALS.into())),
        };

        let password = request.password;
        let hash = user.password_hash.clone();
        if !web::block(move || verify_password(&password, &hash)).await?? {
            log::warn!("Failed login attempt for user {}", user.id);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        log::info!("User {} logged in", user.id);
        self.tokens.issue(user.id)
    }

    pub async fn current_user(&self, user_id: i64) -> Result<UserResponse, AppError> {
        self.repo
            .find_user_by_id(user_id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }
}
