use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::{errors::AuthError, header::extract_bearer_token, token::TokenConfig};
use crate::shared::{AppError, AppState};

/// Identity resolved by the auth gate, available to handlers as
/// `Extension<AuthenticatedUser>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

/// Resolves the caller from the request headers in a single pass:
/// extract the bearer token, validate it, and yield the subject.
pub fn authorize(headers: &HeaderMap, token_config: &TokenConfig) -> Result<AuthenticatedUser, AuthError> {
    let token = extract_bearer_token(headers)?;
    let user_id = token_config.validate_access_token(&token)?;
    Ok(AuthenticatedUser { user_id })
}

/// JWT authentication middleware - validates the Authorization Bearer header and adds
/// AuthenticatedUser to the request.
/// Usage: .route_layer(middleware::from_fn_with_state(app_state.clone(), auth::require_auth))
#[instrument(skip(state, req, next), fields(uri = %req.uri()))]
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authorize(req.headers(), &state.token_config).map_err(|e| {
        warn!(error = %e, "Rejected unauthenticated request");
        AppError::Unauthorized("Unauthorized".to_string())
    })?;

    debug!(user_id = %user.user_id, "Request authenticated");
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::{send, AppStateBuilder};
    use axum::{
        body::Body,
        http::{header::AUTHORIZATION, HeaderValue, StatusCode},
        middleware,
        routing::get,
        Extension, Router,
    };
    use chrono::{Duration, Utc};

    async fn whoami(Extension(user): Extension<AuthenticatedUser>) -> String {
        user.user_id.to_string()
    }

    fn protected_router(state: AppState) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
            .with_state(state)
    }

    fn request_with(header: Option<&str>) -> axum::http::Request<Body> {
        let mut builder = axum::http::Request::builder().uri("/whoami");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_authorize_resolves_subject() {
        let config = TokenConfig::new("secret");
        let user_id = Uuid::new_v4();
        let token = config.create_access_token(user_id).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );

        assert_eq!(authorize(&headers, &config).unwrap().user_id, user_id);
    }

    #[test]
    fn test_authorize_stops_at_missing_header() {
        let config = TokenConfig::new("secret");
        assert_eq!(
            authorize(&HeaderMap::new(), &config),
            Err(AuthError::MissingToken)
        );
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let state = AppStateBuilder::new().build();
        let user_id = Uuid::new_v4();
        let token = state.token_config.create_access_token(user_id).unwrap();

        let (status, body) = send(
            protected_router(state),
            request_with(Some(&format!("Bearer {token}"))),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(String::from_utf8(body).unwrap(), user_id.to_string());
    }

    #[tokio::test]
    async fn test_rejections_are_unauthorized() {
        let state = AppStateBuilder::new().build();
        let expired = state
            .token_config
            .create_access_token_at(Uuid::new_v4(), Utc::now() - Duration::hours(2))
            .unwrap();
        let foreign = TokenConfig::new("other-secret")
            .create_access_token(Uuid::new_v4())
            .unwrap();

        let cases = vec![
            None,
            Some("Basic abc".to_string()),
            Some("Bearer".to_string()),
            Some("Bearer not.a.jwt".to_string()),
            Some(format!("Bearer {expired}")),
            Some(format!("Bearer {foreign}")),
        ];

        for header in cases {
            let (status, body) =
                send(protected_router(state.clone()), request_with(header.as_deref())).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "header {header:?}");
            let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(error["error"], "Unauthorized");
        }
    }
}
