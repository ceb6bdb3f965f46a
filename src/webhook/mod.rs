// Public API - what other modules can use
pub use handlers::upgrade_premium;

// Internal modules
mod handlers;
pub mod types;
