use axum::Router;

use chirpy::{build_router, AppConfig, AppState};

pub const TEST_SECRET: &str = "integration-secret";
pub const TEST_API_KEY: &str = "integration-api-key";

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub struct TestAppBuilder {
    platform: String,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            platform: String::new(),
        }
    }

    pub fn dev(mut self) -> Self {
        self.platform = "dev".to_string();
        self
    }

    pub fn build(self) -> TestApp {
        let config = AppConfig {
            jwt_secret: TEST_SECRET.to_string(),
            upgrade_premium_key: TEST_API_KEY.to_string(),
            platform: self.platform,
            database_url: None,
            port: 0,
        };
        let state = AppState::in_memory(config);

        TestApp {
            router: build_router(state.clone()),
            state,
        }
    }
}
