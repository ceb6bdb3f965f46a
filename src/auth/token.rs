use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, TryRngCore};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::errors::AuthError;
use super::types::AccessClaims;

/// Fixed `iss` claim of every access token
pub const ISSUER: &str = "chirpy";

/// Access token lifetime
pub const ACCESS_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Refresh token lifetime, counted from creation
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 60;

const REFRESH_TOKEN_BYTES: usize = 32;

/// Signing configuration for access tokens
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Creates an access token for the user, issued now
    pub fn create_access_token(&self, user_id: Uuid) -> Result<String, AuthError> {
        self.create_access_token_at(user_id, Utc::now())
    }

    /// Creates an access token as if issued at `issued_at`
    #[instrument(skip(self))]
    pub fn create_access_token_at(
        &self,
        user_id: Uuid,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let exp = (issued_at + Duration::seconds(ACCESS_TOKEN_TTL_SECS)).timestamp();

        let claims = AccessClaims {
            iss: ISSUER.to_string(),
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp,
        };

        debug!(exp_timestamp = exp, "Creating access token");

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode access token");
            AuthError::Signing(e.to_string())
        })
    }

    /// Validates signature, issuer and expiry, then returns the subject user id
    #[instrument(skip(self, token))]
    pub fn validate_access_token(&self, token: &str) -> Result<Uuid, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let data = decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &validation,
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to decode access token");
            AuthError::InvalidToken(e.to_string())
        })?;

        Uuid::parse_str(&data.claims.sub).map_err(|e| {
            debug!(subject = %data.claims.sub, "Access token subject is not a user id");
            AuthError::InvalidToken(e.to_string())
        })
    }
}

/// Generates an opaque refresh token: 32 bytes from the OS random source, hex-encoded
pub fn generate_refresh_token() -> Result<String, AuthError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AuthError::Randomness(e.to_string()))?;
    Ok(hex::encode(bytes))
}
