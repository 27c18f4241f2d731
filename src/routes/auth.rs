use crate::{
    auth::{AuthenticatedUser, LoginRequest, MessageResponse, RegisterRequest, TokenResponse},
    error::AppError,
    services::CredentialService,
};
use actix_web::{post, web, HttpResponse, Responder};

/// Register a new user
///
/// Creates a new user account. The response only acknowledges the registration;
/// the client logs in separately to obtain a token.
#[post("/register")]
pub async fn register(
    credentials: web::Data<CredentialService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    credentials.register(register_data.into_inner()).await?;

    Ok(HttpResponse::Created().json(MessageResponse {
        message: "User registered successfully".into(),
    }))
}

/// Login user
///
/// Authenticates a user and returns a bearer token valid for seven days.
#[post("/login")]
pub async fn login(
    credentials: web::Data<CredentialService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let token = credentials.login(login_data.into_inner()).await?;

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// Current user
///
/// Returns the profile of the user the bearer token was issued to.
pub async fn me(
    credentials: web::Data<CredentialService>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let profile = credentials.current_user(user.0).await?;

    Ok(HttpResponse::Ok().json(profile))
}
