use thiserror::Error;

use crate::shared::AppError;

/// Failures raised by the credential and token primitives
#[derive(Error, Debug, PartialEq)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("password exceeds {0} bytes")]
    PasswordTooLong(usize),

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("random source failed: {0}")]
    Randomness(String),

    #[error("authorization header is missing or malformed")]
    MissingToken,
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidToken(_) | AuthError::MissingToken => {
                AppError::Unauthorized("Unauthorized".to_string())
            }
            AuthError::PasswordTooLong(limit) => {
                AppError::BadRequest(format!("Password must be at most {limit} bytes."))
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}
