use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::UserModel;

/// Request payload for creating or updating a user
#[derive(Debug, Deserialize)]
pub struct UserCredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user; the password hash is never included
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub is_premium: bool,
}

impl From<UserModel> for UserResponse {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            created_at: user.created_at,
            updated_at: user.updated_at,
            email: user.email,
            is_premium: user.is_premium,
        }
    }
}
