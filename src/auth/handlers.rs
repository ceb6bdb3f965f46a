use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    header::extract_bearer_token,
    service::AuthService,
    types::{LoginRequest, LoginResponse, RefreshResponse},
};
use crate::shared::{AppError, AppJson, AppState};

fn auth_service(state: &AppState) -> AuthService {
    AuthService::new(
        Arc::clone(&state.user_repository),
        Arc::clone(&state.refresh_token_repository),
        state.token_config.clone(),
    )
}

/// Pulls the refresh token out of the Bearer header
fn refresh_token_from(headers: &HeaderMap) -> Result<String, AppError> {
    extract_bearer_token(headers).map_err(|e| {
        warn!(error = %e, "Refresh token header missing");
        AppError::Unauthorized("Invalid or missing refresh token.".to_string())
    })
}

/// HTTP handler for password login
///
/// POST /api/login
/// Returns the user profile with an access token and a refresh token
#[instrument(name = "login", skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), AppError> {
    let response = auth_service(&state).login(request).await?;

    info!(user_id = %response.id, "Issued tokens");
    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// POST /api/refresh with `Authorization: Bearer <refresh token>`
#[instrument(name = "refresh", skip(state, headers))]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<RefreshResponse>), AppError> {
    let refresh_token = refresh_token_from(&headers)?;
    let response = auth_service(&state).refresh(&refresh_token).await?;

    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// POST /api/revoke with `Authorization: Bearer <refresh token>`
#[instrument(name = "revoke", skip(state, headers))]
pub async fn revoke(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let refresh_token = refresh_token_from(&headers)?;
    auth_service(&state).revoke(&refresh_token).await?;

    Ok(StatusCode::NO_CONTENT)
}
