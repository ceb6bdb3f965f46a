use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::RefreshTokenModel,
    password::verify_password,
    repository::RefreshTokenRepository,
    token::{generate_refresh_token, TokenConfig, REFRESH_TOKEN_TTL_DAYS},
    types::{LoginRequest, LoginResponse, RefreshResponse},
};
use crate::shared::AppError;
use crate::user::repository::UserRepository;

pub const LOGIN_FAILED_MESSAGE: &str = "Incorrect email or password";
pub const UNKNOWN_REFRESH_TOKEN_MESSAGE: &str = "Invalid refresh token.";
pub const UNUSABLE_REFRESH_TOKEN_MESSAGE: &str = "Refresh token is no longer valid.";

/// Login, refresh and revoke flows over the user and refresh token stores
pub struct AuthService {
    users: Arc<dyn UserRepository + Send + Sync>,
    refresh_tokens: Arc<dyn RefreshTokenRepository + Send + Sync>,
    token_config: TokenConfig,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository + Send + Sync>,
        refresh_tokens: Arc<dyn RefreshTokenRepository + Send + Sync>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            token_config,
        }
    }

    /// Verifies credentials and issues an access token plus a persisted refresh token.
    ///
    /// An unknown email, a failed lookup and a wrong password all produce the
    /// same Unauthorized error.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        let user = match self.users.get_user_by_email(&request.email).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!("Login for unknown email");
                return Err(AppError::Unauthorized(LOGIN_FAILED_MESSAGE.to_string()));
            }
            Err(e) => {
                warn!(error = %e, "User lookup failed during login");
                return Err(AppError::Unauthorized(LOGIN_FAILED_MESSAGE.to_string()));
            }
        };

        if !verify_password(&user.hashed_password, &request.password) {
            warn!(user_id = %user.id, "Login with wrong password");
            return Err(AppError::Unauthorized(LOGIN_FAILED_MESSAGE.to_string()));
        }

        let token = self.token_config.create_access_token(user.id)?;

        let refresh_token = generate_refresh_token()?;
        let record = RefreshTokenModel::new(refresh_token.clone(), user.id, REFRESH_TOKEN_TTL_DAYS);
        self.refresh_tokens.create_refresh_token(&record).await?;

        info!(user_id = %user.id, "Login succeeded");

        Ok(LoginResponse {
            id: user.id,
            created_at: user.created_at,
            updated_at: user.updated_at,
            email: user.email,
            token,
            refresh_token,
            is_premium: user.is_premium,
        })
    }

    /// Exchanges a usable refresh token for a new access token. The refresh
    /// token itself is left untouched.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, AppError> {
        let record = self.lookup(refresh_token).await?;

        if !record.is_usable_at(Utc::now()) {
            warn!(
                user_id = %record.user_id,
                revoked = record.is_revoked(),
                "Refresh token expired or revoked"
            );
            return Err(AppError::Unauthorized(
                UNUSABLE_REFRESH_TOKEN_MESSAGE.to_string(),
            ));
        }

        let token = self.token_config.create_access_token(record.user_id)?;
        info!(user_id = %record.user_id, "Access token refreshed");

        Ok(RefreshResponse { token })
    }

    /// Marks a refresh token revoked. Revoking twice just moves the timestamp.
    #[instrument(skip(self, refresh_token))]
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AppError> {
        let record = self.lookup(refresh_token).await?;

        let now = Utc::now();
        self.refresh_tokens
            .revoke_refresh_token(&record.token, now, now)
            .await?;

        info!(user_id = %record.user_id, "Refresh token revoked");
        Ok(())
    }

    async fn lookup(&self, refresh_token: &str) -> Result<RefreshTokenModel, AppError> {
        self.refresh_tokens
            .get_refresh_token(refresh_token)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => {
                    warn!("Unknown refresh token presented");
                    AppError::Unauthorized(UNKNOWN_REFRESH_TOKEN_MESSAGE.to_string())
                }
                other => other,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{hash_password, repository::InMemoryRefreshTokenRepository};
    use crate::user::{models::UserModel, repository::InMemoryUserRepository};
    use chrono::Duration;

    struct Fixture {
        service: AuthService,
        tokens: Arc<InMemoryRefreshTokenRepository>,
        token_config: TokenConfig,
        user: UserModel,
    }

    async fn fixture() -> Fixture {
        let users = Arc::new(InMemoryUserRepository::new());
        let user = UserModel::new("a@x.com".to_string(), hash_password("pw").unwrap());
        users.create_user(&user).await.unwrap();

        let tokens = Arc::new(InMemoryRefreshTokenRepository::new());
        let token_config = TokenConfig::new("secret");
        let service = AuthService::new(users, tokens.clone(), token_config.clone());

        Fixture {
            service,
            tokens,
            token_config,
            user,
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn unauthorized_message(result: Result<impl std::fmt::Debug, AppError>) -> String {
        match result {
            Err(AppError::Unauthorized(msg)) => msg,
            other => panic!("Expected Unauthorized, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login_issues_both_tokens() {
        let f = fixture().await;

        let response = f.service.login(login_request("a@x.com", "pw")).await.unwrap();

        assert_eq!(response.id, f.user.id);
        assert_eq!(response.email, "a@x.com");
        assert_eq!(
            f.token_config.validate_access_token(&response.token).unwrap(),
            f.user.id
        );
        assert_eq!(response.refresh_token.len(), 64);

        let stored = f.tokens.get_refresh_token(&response.refresh_token).await.unwrap();
        assert_eq!(stored.user_id, f.user.id);
        assert!(stored.is_usable_at(Utc::now()));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let f = fixture().await;

        let unknown = f.service.login(login_request("nobody@x.com", "pw")).await;
        let wrong = f.service.login(login_request("a@x.com", "nope")).await;

        assert_eq!(unauthorized_message(unknown), LOGIN_FAILED_MESSAGE);
        assert_eq!(unauthorized_message(wrong), LOGIN_FAILED_MESSAGE);
        assert_eq!(f.tokens.token_count().await, 0);
    }

    #[tokio::test]
    async fn test_refresh_does_not_rotate() {
        let f = fixture().await;
        let login = f.service.login(login_request("a@x.com", "pw")).await.unwrap();

        let first = f.service.refresh(&login.refresh_token).await.unwrap();
        let second = f.service.refresh(&login.refresh_token).await.unwrap();

        assert_eq!(
            f.token_config.validate_access_token(&first.token).unwrap(),
            f.user.id
        );
        assert!(f.token_config.validate_access_token(&second.token).is_ok());
        assert_eq!(f.tokens.token_count().await, 1);
    }

    #[tokio::test]
    async fn test_refresh_unknown_token() {
        let f = fixture().await;

        let result = f.service.refresh("deadbeef").await;
        assert_eq!(unauthorized_message(result), UNKNOWN_REFRESH_TOKEN_MESSAGE);
    }

    #[tokio::test]
    async fn test_refresh_expired_token() {
        let f = fixture().await;
        let mut record = RefreshTokenModel::new("expired".to_string(), f.user.id, 60);
        record.expires_at = Utc::now() - Duration::seconds(1);
        f.tokens.create_refresh_token(&record).await.unwrap();

        let result = f.service.refresh("expired").await;
        assert_eq!(unauthorized_message(result), UNUSABLE_REFRESH_TOKEN_MESSAGE);
    }

    #[tokio::test]
    async fn test_revoke_then_refresh() {
        let f = fixture().await;
        let login = f.service.login(login_request("a@x.com", "pw")).await.unwrap();

        f.service.revoke(&login.refresh_token).await.unwrap();

        let result = f.service.refresh(&login.refresh_token).await;
        assert_eq!(unauthorized_message(result), UNUSABLE_REFRESH_TOKEN_MESSAGE);
    }

    #[tokio::test]
    async fn test_revoke_twice_succeeds() {
        let f = fixture().await;
        let login = f.service.login(login_request("a@x.com", "pw")).await.unwrap();

        f.service.revoke(&login.refresh_token).await.unwrap();
        f.service.revoke(&login.refresh_token).await.unwrap();

        let record = f.tokens.get_refresh_token(&login.refresh_token).await.unwrap();
        assert!(record.is_revoked());
    }

    #[tokio::test]
    async fn test_revoke_unknown_token() {
        let f = fixture().await;

        let result = f.service.revoke("deadbeef").await;
        assert_eq!(unauthorized_message(result), UNKNOWN_REFRESH_TOKEN_MESSAGE);
    }
}
