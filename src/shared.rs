use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, warn};

use crate::auth::repository::{InMemoryRefreshTokenRepository, RefreshTokenRepository};
use crate::auth::token::TokenConfig;
use crate::config::AppConfig;
use crate::post::repository::{InMemoryPostRepository, PostRepository};
use crate::user::repository::{InMemoryUserRepository, UserRepository};

/// Message returned for every 5xx; the underlying cause only goes to the log
pub const INTERNAL_ERROR_MESSAGE: &str = "An error occurred while processing your request.";

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub token_config: TokenConfig,
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    pub post_repository: Arc<dyn PostRepository + Send + Sync>,
    pub refresh_token_repository: Arc<dyn RefreshTokenRepository + Send + Sync>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        post_repository: Arc<dyn PostRepository + Send + Sync>,
        refresh_token_repository: Arc<dyn RefreshTokenRepository + Send + Sync>,
    ) -> Self {
        let token_config = TokenConfig::new(config.jwt_secret.clone());

        Self {
            config: Arc::new(config),
            token_config,
            user_repository,
            post_repository,
            refresh_token_repository,
        }
    }

    /// State backed entirely by in-memory repositories
    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryPostRepository::new()),
            Arc::new(InMemoryRefreshTokenRepository::new()),
        )
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::DatabaseError(msg) => {
                error!(error = %msg, "Database failure while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
            AppError::Internal(msg) => {
                error!(error = %msg, "Internal failure while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(rejection = %rejection.body_text(), "Rejected request body");
        AppError::BadRequest("Invalid JSON format.".to_string())
    }
}

/// JSON body extractor whose rejections render as `{"error": ...}`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
