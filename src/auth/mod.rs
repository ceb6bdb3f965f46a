// Public API - what other modules can use
pub use errors::AuthError;
pub use handlers::{login, refresh, revoke};
pub use header::{extract_api_key, extract_bearer_token, AuthScheme};
pub use middleware::{authorize, require_auth, AuthenticatedUser};
pub use password::{hash_password, verify_password};
pub use token::{generate_refresh_token, TokenConfig};

// Internal modules
mod errors;
mod handlers;
pub mod header;
mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;
pub mod types;
