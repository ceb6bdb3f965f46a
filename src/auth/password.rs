use tracing::{debug, instrument};

use super::errors::AuthError;

/// bcrypt work factor for every stored password hash
pub const HASH_COST: u32 = 10;

/// Longest password bcrypt reads in full
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hashes a password with a fresh random salt.
///
/// Passwords longer than bcrypt's 72-byte input are rejected rather than
/// silently truncated.
#[instrument(skip(password))]
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::non_truncating_hash(password, HASH_COST).map_err(|e| match e {
        bcrypt::BcryptError::Truncation(_) => AuthError::PasswordTooLong(MAX_PASSWORD_BYTES),
        other => {
            debug!(error = %other, "Failed to hash password");
            AuthError::Hashing(other.to_string())
        }
    })
}

/// Checks a password against a stored hash. A malformed hash never matches.
#[instrument(skip(hash, password))]
pub fn verify_password(hash: &str, password: &str) -> bool {
    match bcrypt::non_truncating_verify(password, hash) {
        Ok(matches) => matches,
        Err(e) => {
            debug!(error = %e, "Password verification failed");
            false
        }
    }
}
