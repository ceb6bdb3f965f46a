use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::RefreshTokenModel;
use crate::shared::AppError;

/// Trait for refresh token persistence
#[async_trait]
pub trait RefreshTokenRepository {
    /// Stores a new record; fails if the token already exists
    async fn create_refresh_token(&self, record: &RefreshTokenModel) -> Result<(), AppError>;

    /// Fails with `AppError::NotFound` if the token is unknown
    async fn get_refresh_token(&self, token: &str) -> Result<RefreshTokenModel, AppError>;

    /// Marks the token revoked. Revoking an already revoked token re-stamps it.
    async fn revoke_refresh_token(
        &self,
        token: &str,
        revoked_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    async fn delete_all_refresh_tokens(&self) -> Result<u64, AppError>;
}

/// In-memory implementation of RefreshTokenRepository for development and testing
#[derive(Debug, Default)]
pub struct InMemoryRefreshTokenRepository {
    tokens: RwLock<HashMap<String, RefreshTokenModel>>,
}

impl InMemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
        }
    }

    pub async fn token_count(&self) -> usize {
        self.tokens.read().await.len()
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    #[instrument(skip(self, record))]
    async fn create_refresh_token(&self, record: &RefreshTokenModel) -> Result<(), AppError> {
        debug!(user_id = %record.user_id, "Storing refresh token in memory");

        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(&record.token) {
            warn!(user_id = %record.user_id, "Refresh token already exists in memory");
            return Err(AppError::DatabaseError(
                "Refresh token already exists".to_string(),
            ));
        }
        tokens.insert(record.token.clone(), record.clone());
        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn get_refresh_token(&self, token: &str) -> Result<RefreshTokenModel, AppError> {
        let tokens = self.tokens.read().await;
        tokens.get(token).cloned().ok_or_else(|| {
            debug!("Refresh token not found in memory");
            AppError::NotFound("Refresh token not found".to_string())
        })
    }

    #[instrument(skip(self, token))]
    async fn revoke_refresh_token(
        &self,
        token: &str,
        revoked_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut tokens = self.tokens.write().await;
        let record = tokens.get_mut(token).ok_or_else(|| {
            warn!("Refresh token not found for revocation in memory");
            AppError::NotFound("Refresh token not found".to_string())
        })?;

        record.revoked_at = Some(revoked_at);
        record.updated_at = updated_at;

        debug!(user_id = %record.user_id, "Refresh token revoked in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_all_refresh_tokens(&self) -> Result<u64, AppError> {
        let mut tokens = self.tokens.write().await;
        let removed = tokens.len() as u64;
        tokens.clear();
        Ok(removed)
    }
}

/// PostgreSQL implementation of refresh token repository
pub struct PostgresRefreshTokenRepository {
    pool: PgPool,
}

impl PostgresRefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for PostgresRefreshTokenRepository {
    #[instrument(skip(self, record))]
    async fn create_refresh_token(&self, record: &RefreshTokenModel) -> Result<(), AppError> {
        debug!(user_id = %record.user_id, "Storing refresh token in database");

        sqlx::query(
            "INSERT INTO refresh_tokens (token, created_at, updated_at, user_id, expires_at, revoked_at) VALUES ($1, $2, $3, $4, $5, $6)"
        )
        .bind(&record.token)
        .bind(record.created_at)
        .bind(record.updated_at)
        .bind(record.user_id)
        .bind(record.expires_at)
        .bind(record.revoked_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to store refresh token in database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn get_refresh_token(&self, token: &str) -> Result<RefreshTokenModel, AppError> {
        sqlx::query_as::<_, RefreshTokenModel>(
            "SELECT token, user_id, created_at, updated_at, expires_at, revoked_at FROM refresh_tokens WHERE token = $1"
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch refresh token from database");
            AppError::DatabaseError(e.to_string())
        })?
        .ok_or_else(|| {
            debug!("Refresh token not found in database");
            AppError::NotFound("Refresh token not found".to_string())
        })
    }

    #[instrument(skip(self, token))]
    async fn revoke_refresh_token(
        &self,
        token: &str,
        revoked_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = $2, updated_at = $3 WHERE token = $1",
        )
        .bind(token)
        .bind(revoked_at)
        .bind(updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to revoke refresh token in database");
            AppError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            warn!("Refresh token not found for revocation");
            return Err(AppError::NotFound("Refresh token not found".to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_all_refresh_tokens(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM refresh_tokens")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to delete refresh tokens");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(result.rows_affected())
    }
}
