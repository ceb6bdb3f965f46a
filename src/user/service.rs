use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{
    models::UserModel,
    repository::UserRepository,
    types::{UserCredentialsRequest, UserResponse},
};
use crate::auth::hash_password;
use crate::shared::AppError;

const INVALID_CREDENTIALS_MESSAGE: &str = "Unauthorized: Invalid credentials.";

/// Service for handling user business logic
pub struct UserService {
    repository: Arc<dyn UserRepository + Send + Sync>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Registers a new user.
    ///
    /// The email check and the insert are separate steps, so two concurrent
    /// signups with the same email can both pass the check. Only a store-level
    /// uniqueness constraint turns the second insert into a Conflict.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create_user(
        &self,
        request: UserCredentialsRequest,
    ) -> Result<UserResponse, AppError> {
        let hashed_password = hash_password(&request.password)?;

        if self
            .repository
            .get_user_by_email(&request.email)
            .await?
            .is_some()
        {
            warn!("Email already registered");
            return Err(AppError::Conflict("Email already exists.".to_string()));
        }

        let user = UserModel::new(request.email, hashed_password);
        self.repository.create_user(&user).await?;

        info!(user_id = %user.id, "User created");
        Ok(user.into())
    }

    /// Replaces the password of the calling user. The submitted email must
    /// match the one on record.
    #[instrument(skip(self, request))]
    pub async fn update_user(
        &self,
        user_id: Uuid,
        request: UserCredentialsRequest,
    ) -> Result<UserResponse, AppError> {
        let user = self
            .repository
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| {
                warn!("Authenticated user no longer exists");
                AppError::Unauthorized(INVALID_CREDENTIALS_MESSAGE.to_string())
            })?;

        if user.email != request.email {
            warn!("Submitted email does not match the caller");
            return Err(AppError::Unauthorized(
                INVALID_CREDENTIALS_MESSAGE.to_string(),
            ));
        }

        let hashed_password = hash_password(&request.password)?;
        let updated = self
            .repository
            .update_credentials(user_id, &request.email, &hashed_password, Utc::now())
            .await?;

        info!("User credentials updated");
        Ok(updated.into())
    }

    /// Sets the premium flag on a user
    #[instrument(skip(self))]
    pub async fn upgrade_to_premium(&self, user_id: Uuid) -> Result<UserResponse, AppError> {
        let user = self
            .repository
            .upgrade_to_premium(user_id, Utc::now())
            .await?;

        info!("User upgraded to premium");
        Ok(user.into())
    }

    #[instrument(skip(self))]
    pub async fn delete_all_users(&self) -> Result<u64, AppError> {
        let removed = self.repository.delete_all_users().await?;
        debug!(removed, "All users deleted");
        Ok(removed)
    }
}
