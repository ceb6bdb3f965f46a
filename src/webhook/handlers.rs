use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::types::WebhookRequest;
use crate::auth::extract_api_key;
use crate::shared::{AppError, AppJson, AppState};
use crate::user::service::UserService;

/// HTTP handler for payment-provider events
///
/// POST /api/upgrade-premium/webhooks with `Authorization: ApiKey <key>`.
/// The key is checked before the body is looked at.
#[instrument(name = "upgrade_premium", skip_all)]
pub async fn upgrade_premium(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<AppJson<WebhookRequest>, AppError>,
) -> Result<StatusCode, AppError> {
    match extract_api_key(&headers) {
        Ok(key) if key == state.config.upgrade_premium_key => {}
        _ => {
            warn!("Webhook call with missing or wrong API key");
            return Err(AppError::Unauthorized("Access denied".to_string()));
        }
    }

    let AppJson(request) = payload?;

    if !request.is_upgrade() {
        debug!(event = %request.event, "Ignoring webhook event");
        return Ok(StatusCode::NO_CONTENT);
    }

    let data = request
        .upgrade_data()
        .ok_or_else(|| AppError::BadRequest("Invalid JSON format.".to_string()))?;

    UserService::new(Arc::clone(&state.user_repository))
        .upgrade_to_premium(data.user_id)
        .await?;

    info!(user_id = %data.user_id, "Premium upgrade applied");
    Ok(StatusCode::NO_CONTENT)
}
