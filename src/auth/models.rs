use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the refresh_tokens table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct RefreshTokenModel {
    pub token: String, // 64 hex chars, primary key
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenModel {
    /// Creates a new, unrevoked refresh token record expiring `ttl_days` from now
    pub fn new(token: String, user_id: Uuid, ttl_days: i64) -> Self {
        let now = Utc::now();

        Self {
            token,
            user_id,
            created_at: now,
            updated_at: now,
            expires_at: now + Duration::days(ttl_days),
            revoked_at: None,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// A token can mint access tokens only while unexpired and unrevoked
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired_at(now) && !self.is_revoked()
    }
}
