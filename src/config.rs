use thiserror::Error;
use tracing::{debug, warn};

const DEFAULT_PORT: u16 = 8080;

/// Platform value that unlocks the development-only endpoints
pub const DEV_PLATFORM: &str = "dev";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{name} is invalid: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Immutable application configuration, built once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub upgrade_premium_key: String,
    pub platform: String,
    pub database_url: Option<String>,
    pub port: u16,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// `JWT_SECRET` and `API_KEY_UPGRADE_PREMIUM` are required. `PLATFORM`,
    /// `DB_URL` and `PORT` are optional; without `DB_URL` the server runs on
    /// in-memory repositories.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let jwt_secret = required("JWT_SECRET")?;
        let upgrade_premium_key = required("API_KEY_UPGRADE_PREMIUM")?;
        let platform = lookup("PLATFORM").unwrap_or_default();
        let database_url = lookup("DB_URL").filter(|url| !url.is_empty());

        let port = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        if database_url.is_none() {
            warn!("DB_URL is not set, falling back to in-memory repositories");
        }
        debug!(platform = %platform, port, "Configuration loaded");

        Ok(Self {
            jwt_secret,
            upgrade_premium_key,
            platform,
            database_url,
            port,
        })
    }

    /// Whether development-only endpoints are enabled
    pub fn is_dev(&self) -> bool {
        self.platform == DEV_PLATFORM
    }
}
