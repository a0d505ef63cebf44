//! Authentication handlers.

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use taskwell_core::domain::NewUser;
use taskwell_core::ports::{AuthError, PasswordService, TokenService};
use taskwell_shared::ApiResponse;
use taskwell_shared::dto::{
    LoginRequest, RefreshRequest, RegisterRequest, RegisterResponse, TokenPairResponse,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /v1/auth/register
pub async fn register(
    state: web::Data<AppState>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Validate input
    if req.username.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest(
            "username, email and password are required".to_string(),
        ));
    }

    // Hash password
    let password_hash = password_service
        .hash(&req.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    // Create user - the store enforces username/email uniqueness atomically
    let user = state
        .users
        .create(NewUser {
            username: req.username,
            email: req.email,
            password_hash,
        })
        .await?;

    tracing::debug!(user_id = user.id, "user registered");

    Ok(HttpResponse::Created().json(ApiResponse::ok(
        "user created",
        RegisterResponse { id: user.id },
    )))
}

/// POST /v1/auth/login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Unknown user and wrong password produce the same error, so the
    // response never confirms whether a username exists.
    let invalid = || AppError::from(AuthError::InvalidCredentials);

    let user = state
        .users
        .find_by_username(&req.username)
        .await?
        .ok_or_else(invalid)?;

    let valid = password_service
        .verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        return Err(invalid());
    }

    // A signing failure here is a server fault, not an auth failure.
    let pair = token_service
        .issue(user.id)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        "login successful",
        TokenPairResponse::from(pair),
    )))
}

/// POST /v1/auth/refresh
pub async fn refresh(
    token_service: web::Data<Arc<dyn TokenService>>,
    body: web::Json<RefreshRequest>,
) -> AppResult<HttpResponse> {
    let pair = token_service.refresh(&body.refresh_token)?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        "token refreshed",
        TokenPairResponse::from(pair),
    )))
}

/// POST /v1/auth/logout - Protected route
pub async fn logout(
    identity: Identity,
    token_service: web::Data<Arc<dyn TokenService>>,
) -> AppResult<HttpResponse> {
    token_service.revoke(&identity.token)?;

    tracing::debug!(user_id = identity.user_id, "user logged out");

    Ok(HttpResponse::Ok().json(ApiResponse::empty("logged out")))
}
