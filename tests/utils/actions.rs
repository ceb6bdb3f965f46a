use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use super::setup::TestApp;

pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn error_message(&self) -> String {
        let value: Value = self.json();
        value["error"].as_str().unwrap().to_string()
    }
}

// ============================================================================
// Action Helpers
// ============================================================================

impl TestApp {
    /// Send a request with an optional JSON body and Authorization header
    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        authorization: Option<String>,
        body: Option<Value>,
    ) -> ApiResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header("authorization", value);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();

        ApiResponse { status, body }
    }

    pub async fn create_user(&self, email: &str, password: &str) -> ApiResponse {
        self.call(
            "POST",
            "/api/users",
            None,
            Some(json!({"email": email, "password": password})),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResponse {
        self.call(
            "POST",
            "/api/login",
            None,
            Some(json!({"email": email, "password": password})),
        )
        .await
    }

    pub async fn create_post(&self, access_token: &str, body: &str) -> ApiResponse {
        self.call(
            "POST",
            "/api/posts",
            Some(format!("Bearer {access_token}")),
            Some(json!({"body": body})),
        )
        .await
    }

    /// Register then log in, returning the login response body
    pub async fn signed_in_user(&self, email: &str, password: &str) -> Value {
        let created = self.create_user(email, password).await;
        assert_eq!(created.status, StatusCode::CREATED);

        let login = self.login(email, password).await;
        assert_eq!(login.status, StatusCode::ACCEPTED);
        login.json()
    }
}
