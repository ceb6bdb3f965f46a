use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessClaims {
    pub iss: String,
    pub sub: String, // User id
    pub iat: i64,
    pub exp: i64,
}

/// Request payload for the login endpoint
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login: the user profile plus both tokens
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub token: String,
    pub refresh_token: String,
    pub is_premium: bool,
}

/// Response for the refresh endpoint
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RefreshResponse {
    pub token: String,
}
