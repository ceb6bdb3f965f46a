use axum::http::{header::AUTHORIZATION, HeaderMap};
use strum_macros::{Display, EnumString};
use tracing::debug;

use super::errors::AuthError;

/// Scheme keyword of an `Authorization` header, matched case-insensitively
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum AuthScheme {
    Bearer,
    ApiKey,
}

/// Extracts the credential from an `Authorization: <Scheme> <token>` header.
///
/// The header must split into exactly two whitespace-separated parts and the
/// first must name `scheme`.
pub fn extract_authorization(headers: &HeaderMap, scheme: AuthScheme) -> Result<String, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| {
            debug!("Missing Authorization header");
            AuthError::MissingToken
        })?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(keyword), Some(token), None) => match keyword.parse::<AuthScheme>() {
            Ok(found) if found == scheme => Ok(token.to_string()),
            _ => {
                debug!(expected = %scheme, "Unexpected Authorization scheme");
                Err(AuthError::MissingToken)
            }
        },
        _ => {
            debug!("Malformed Authorization header");
            Err(AuthError::MissingToken)
        }
    }
}

/// `Authorization: Bearer <token>`
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    extract_authorization(headers, AuthScheme::Bearer)
}

/// `Authorization: ApiKey <key>`
pub fn extract_api_key(headers: &HeaderMap) -> Result<String, AuthError> {
    extract_authorization(headers, AuthScheme::ApiKey)
}
