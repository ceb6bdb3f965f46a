use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for users table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct UserModel {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub hashed_password: String, // bcrypt, never leaves the server
    pub is_premium: bool,
}

impl UserModel {
    /// Creates a new non-premium user with generated ID and timestamps
    pub fn new(email: String, hashed_password: String) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            email,
            hashed_password,
            is_premium: false,
        }
    }
}
