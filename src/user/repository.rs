use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::models::UserModel;
use crate::shared::AppError;

const USER_COLUMNS: &str = "id, created_at, updated_at, email, hashed_password, is_premium";

/// Trait for user repository operations
#[async_trait]
pub trait UserRepository {
    /// Fails with `AppError::Conflict` if the email is already taken
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError>;
    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<UserModel>, AppError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError>;

    /// Replaces email and password hash, returning the updated user
    async fn update_credentials(
        &self,
        user_id: Uuid,
        email: &str,
        hashed_password: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<UserModel, AppError>;

    /// Sets the premium flag, returning the updated user
    async fn upgrade_to_premium(
        &self,
        user_id: Uuid,
        updated_at: DateTime<Utc>,
    ) -> Result<UserModel, AppError>;

    async fn delete_all_users(&self) -> Result<u64, AppError>;
}

/// In-memory implementation of UserRepository for development and testing
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, UserModel>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.id, email = %user.email, "Creating user in memory");

        let mut users = self.users.write().await;
        if users.values().any(|existing| existing.email == user.email) {
            warn!(email = %user.email, "Email already taken in memory");
            return Err(AppError::Conflict("Email already exists.".to_string()));
        }
        if users.contains_key(&user.id) {
            return Err(AppError::DatabaseError("User already exists".to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<UserModel>, AppError> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    #[instrument(skip(self))]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.email == email).cloned())
    }

    #[instrument(skip(self, hashed_password))]
    async fn update_credentials(
        &self,
        user_id: Uuid,
        email: &str,
        hashed_password: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<UserModel, AppError> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|existing| existing.email == email && existing.id != user_id)
        {
            return Err(AppError::Conflict("Email already exists.".to_string()));
        }

        let user = users.get_mut(&user_id).ok_or_else(|| {
            warn!(user_id = %user_id, "User not found for update in memory");
            AppError::NotFound("User not found".to_string())
        })?;
        user.email = email.to_string();
        user.hashed_password = hashed_password.to_string();
        user.updated_at = updated_at;

        Ok(user.clone())
    }

    #[instrument(skip(self))]
    async fn upgrade_to_premium(
        &self,
        user_id: Uuid,
        updated_at: DateTime<Utc>,
    ) -> Result<UserModel, AppError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&user_id).ok_or_else(|| {
            warn!(user_id = %user_id, "User not found for upgrade in memory");
            AppError::NotFound("User not found".to_string())
        })?;
        user.is_premium = true;
        user.updated_at = updated_at;

        Ok(user.clone())
    }

    #[instrument(skip(self))]
    async fn delete_all_users(&self) -> Result<u64, AppError> {
        let mut users = self.users.write().await;
        let removed = users.len() as u64;
        users.clear();

        debug!(removed, "Deleted all users from memory");
        Ok(removed)
    }
}

/// PostgreSQL implementation of user repository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Turns a unique-constraint violation into a Conflict, anything else into a DatabaseError
fn map_write_error(e: sqlx::Error) -> AppError {
    if let Some(db_error) = e.as_database_error() {
        if db_error.is_unique_violation() {
            warn!("Email uniqueness violated at insert time");
            return AppError::Conflict("Email already exists.".to_string());
        }
    }
    warn!(error = %e, "Failed to write user to database");
    AppError::DatabaseError(e.to_string())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.id, email = %user.email, "Creating user in database");

        sqlx::query(
            "INSERT INTO users (id, created_at, updated_at, email, hashed_password, is_premium) VALUES ($1, $2, $3, $4, $5, $6)"
        )
        .bind(user.id)
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(&user.email)
        .bind(&user.hashed_password)
        .bind(user.is_premium)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<UserModel>, AppError> {
        sqlx::query_as::<_, UserModel>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, user_id = %user_id, "Failed to fetch user from database");
                AppError::DatabaseError(e.to_string())
            })
    }

    #[instrument(skip(self))]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        sqlx::query_as::<_, UserModel>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch user by email from database");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self, hashed_password))]
    async fn update_credentials(
        &self,
        user_id: Uuid,
        email: &str,
        hashed_password: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<UserModel, AppError> {
        sqlx::query_as::<_, UserModel>(&format!(
            "UPDATE users SET email = $2, hashed_password = $3, updated_at = $4 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(email)
        .bind(hashed_password)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    #[instrument(skip(self))]
    async fn upgrade_to_premium(
        &self,
        user_id: Uuid,
        updated_at: DateTime<Utc>,
    ) -> Result<UserModel, AppError> {
        sqlx::query_as::<_, UserModel>(&format!(
            "UPDATE users SET is_premium = TRUE, updated_at = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %user_id, "Failed to upgrade user in database");
            AppError::DatabaseError(e.to_string())
        })?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    #[instrument(skip(self))]
    async fn delete_all_users(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM users")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to delete users");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(result.rows_affected())
    }
}
