use axum::{extract::State, http::StatusCode, Extension, Json};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    service::UserService,
    types::{UserCredentialsRequest, UserResponse},
};
use crate::auth::AuthenticatedUser;
use crate::shared::{AppError, AppJson, AppState};

/// HTTP handler for registering a user
///
/// POST /api/users
#[instrument(name = "create_user", skip(state, request))]
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(request): AppJson<UserCredentialsRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let service = UserService::new(Arc::clone(&state.user_repository));
    let user = service.create_user(request).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// HTTP handler for changing the caller's password
///
/// PUT /api/users (authenticated)
#[instrument(name = "update_user", skip(state, request))]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    AppJson(request): AppJson<UserCredentialsRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let service = UserService::new(Arc::clone(&state.user_repository));
    let user = service.update_user(caller.user_id, request).await?;

    Ok(Json(user))
}

/// HTTP handler wiping every user along with their posts and refresh tokens
///
/// POST /admin/reset (dev platform only)
#[instrument(name = "reset_users", skip(state))]
pub async fn reset_users(State(state): State<AppState>) -> Result<Json<String>, AppError> {
    if !state.config.is_dev() {
        warn!(platform = %state.config.platform, "Reset attempted outside dev platform");
        return Err(AppError::Forbidden(
            "Access is allowed only in the development environment.".to_string(),
        ));
    }

    let tokens = state
        .refresh_token_repository
        .delete_all_refresh_tokens()
        .await?;
    let posts = state.post_repository.delete_all_posts().await?;
    let users = UserService::new(Arc::clone(&state.user_repository))
        .delete_all_users()
        .await?;

    info!(users, posts, tokens, "Development reset completed");
    Ok(Json(
        "All Users have been deleted successfully".to_string(),
    ))
}
