// Library crate for the chirpy API server
// This file exposes the public API for integration tests

pub mod auth;
pub mod config;
pub mod post;
pub mod shared;
pub mod user;
pub mod webhook;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

// Re-export commonly used types for easier access in tests
pub use config::AppConfig;
pub use shared::{AppError, AppState};

/// Builds the application router. Routes behind the auth gate receive the
/// caller as `Extension<auth::AuthenticatedUser>`.
pub fn build_router(state: AppState) -> Router {
    let auth_gate = middleware::from_fn_with_state(state.clone(), auth::require_auth);

    Router::new()
        .route("/api/healthz", get(|| async { "OK" }))
        // Users
        .route("/api/users", post(user::create_user))
        .route(
            "/api/users",
            put(user::update_user).route_layer(auth_gate.clone()),
        )
        .route("/admin/reset", post(user::reset_users))
        // Sessions
        .route("/api/login", post(auth::login))
        .route("/api/refresh", post(auth::refresh))
        .route("/api/revoke", post(auth::revoke))
        // Posts
        .route("/api/posts", get(post::list_posts))
        .route(
            "/api/posts",
            post(post::create_post).route_layer(auth_gate.clone()),
        )
        .route("/api/posts/:post_id", get(post::get_post))
        .route(
            "/api/posts/:post_id",
            delete(post::delete_post).route_layer(auth_gate),
        )
        // Webhooks
        .route(
            "/api/upgrade-premium/webhooks",
            post(webhook::upgrade_premium),
        )
        .with_state(state)
}
