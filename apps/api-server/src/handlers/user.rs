//! User profile handlers.

use actix_web::{HttpResponse, web};

use taskwell_shared::ApiResponse;
use taskwell_shared::dto::ProfileResponse;

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /v1/user/profile - Protected route
pub async fn profile(identity: Identity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        "profile retrieved",
        ProfileResponse {
            id: user.id,
            username: user.username,
            email: user.email,
        },
    )))
}
