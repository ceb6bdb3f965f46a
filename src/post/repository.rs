use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::models::PostModel;
use crate::shared::AppError;

/// Trait for post repository operations
#[async_trait]
pub trait PostRepository {
    async fn create_post(&self, post: &PostModel) -> Result<(), AppError>;
    async fn get_post(&self, post_id: Uuid) -> Result<Option<PostModel>, AppError>;

    /// Posts ordered by creation time, oldest first, optionally for one author
    async fn list_posts(&self, author_id: Option<Uuid>) -> Result<Vec<PostModel>, AppError>;

    /// Fails with `AppError::NotFound` if the post does not exist
    async fn delete_post(&self, post_id: Uuid) -> Result<(), AppError>;

    async fn delete_all_posts(&self) -> Result<u64, AppError>;
}

/// In-memory implementation of PostRepository for development and testing.
/// Posts are kept in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryPostRepository {
    posts: RwLock<Vec<PostModel>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    #[instrument(skip(self, post))]
    async fn create_post(&self, post: &PostModel) -> Result<(), AppError> {
        debug!(post_id = %post.id, user_id = %post.user_id, "Creating post in memory");

        let mut posts = self.posts.write().await;
        if posts.iter().any(|existing| existing.id == post.id) {
            return Err(AppError::DatabaseError("Post already exists".to_string()));
        }
        posts.push(post.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_post(&self, post_id: Uuid) -> Result<Option<PostModel>, AppError> {
        let posts = self.posts.read().await;
        Ok(posts.iter().find(|post| post.id == post_id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_posts(&self, author_id: Option<Uuid>) -> Result<Vec<PostModel>, AppError> {
        let posts = self.posts.read().await;
        let mut listed: Vec<PostModel> = posts
            .iter()
            .filter(|post| author_id.map_or(true, |author| post.user_id == author))
            .cloned()
            .collect();
        listed.sort_by_key(|post| post.created_at);
        Ok(listed)
    }

    #[instrument(skip(self))]
    async fn delete_post(&self, post_id: Uuid) -> Result<(), AppError> {
        let mut posts = self.posts.write().await;
        let index = posts
            .iter()
            .position(|post| post.id == post_id)
            .ok_or_else(|| {
                warn!(post_id = %post_id, "Post not found for deletion in memory");
                AppError::NotFound("Post not found.".to_string())
            })?;
        posts.remove(index);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_all_posts(&self) -> Result<u64, AppError> {
        let mut posts = self.posts.write().await;
        let removed = posts.len() as u64;
        posts.clear();
        Ok(removed)
    }
}

/// PostgreSQL implementation of post repository
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    #[instrument(skip(self, post))]
    async fn create_post(&self, post: &PostModel) -> Result<(), AppError> {
        debug!(post_id = %post.id, user_id = %post.user_id, "Creating post in database");

        sqlx::query(
            "INSERT INTO posts (id, created_at, updated_at, body, user_id) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(post.id)
        .bind(post.created_at)
        .bind(post.updated_at)
        .bind(&post.body)
        .bind(post.user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create post in database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_post(&self, post_id: Uuid) -> Result<Option<PostModel>, AppError> {
        sqlx::query_as::<_, PostModel>(
            "SELECT id, created_at, updated_at, body, user_id FROM posts WHERE id = $1",
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, post_id = %post_id, "Failed to fetch post from database");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn list_posts(&self, author_id: Option<Uuid>) -> Result<Vec<PostModel>, AppError> {
        sqlx::query_as::<_, PostModel>(
            "SELECT id, created_at, updated_at, body, user_id FROM posts WHERE ($1::uuid IS NULL OR user_id = $1) ORDER BY created_at ASC",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list posts from database");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn delete_post(&self, post_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, post_id = %post_id, "Failed to delete post from database");
                AppError::DatabaseError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Post not found.".to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_all_posts(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM posts")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to delete posts");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(result.rows_affected())
    }
}
