use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;

use super::{
    service::PostService,
    types::{CreatePostRequest, ListPostsQuery, PostResponse},
};
use crate::auth::AuthenticatedUser;
use crate::shared::{AppError, AppJson, AppState};

fn post_service(state: &AppState) -> PostService {
    PostService::new(
        Arc::clone(&state.post_repository),
        Arc::clone(&state.user_repository),
    )
}

/// POST /api/posts (authenticated)
#[instrument(name = "create_post", skip(state, request))]
pub async fn create_post(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    AppJson(request): AppJson<CreatePostRequest>,
) -> Result<Json<PostResponse>, AppError> {
    let post = post_service(&state)
        .create_post(caller.user_id, request)
        .await?;
    Ok(Json(post))
}

/// GET /api/posts?author_id=<uuid>&sort=asc|desc
#[instrument(name = "list_posts", skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let posts = post_service(&state).list_posts(query).await?;
    Ok(Json(posts))
}

/// GET /api/posts/:post_id
#[instrument(name = "get_post", skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<PostResponse>, AppError> {
    let post = post_service(&state).get_post(&post_id).await?;
    Ok(Json(post))
}

/// DELETE /api/posts/:post_id (authenticated, author only)
#[instrument(name = "delete_post", skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(post_id): Path<String>,
) -> Result<StatusCode, AppError> {
    post_service(&state)
        .delete_post(caller.user_id, &post_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
