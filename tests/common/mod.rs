//! Shared harness for HTTP-level tests.
//!
//! Each `TestApp` owns its own in-memory SQLite database with the full
//! migration set applied, and drives the real router in-process.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use account_service::api::{create_router, AppState};
use account_service::config::Config;
use account_service::domain::{Password, User, UserRole};
use account_service::infra::{Database, NewUser, UserRepository, UserStore};

pub const TEST_JWT_SECRET: &str = "test-secret-key-for-testing-only-32chars";
pub const TEST_BASE_URL: &str = "http://accounts.test";

pub struct TestApp {
    pub router: Router,
    pub database: Arc<Database>,
    pub users: UserStore,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let mut config = Config::new("sqlite::memory:", TEST_JWT_SECRET);
        // Every pooled SQLite memory connection is a separate database.
        config.database_max_connections = 1;
        config.app_base_url = TEST_BASE_URL.to_string();

        let database = Arc::new(
            Database::connect(&config)
                .await
                .expect("failed to set up test database"),
        );
        let users = UserStore::new(database.get_connection());
        let router = create_router(AppState::from_config(database.clone(), config));

        Self {
            router,
            database,
            users,
        }
    }

    /// Insert a user directly, bypassing the HTTP layer.
    pub async fn create_user(&self, email: &str, password: &str, role: UserRole) -> User {
        self.users
            .create(NewUser {
                email: email.to_string(),
                password_hash: Password::new(password).unwrap().into_string(),
                name: "Test User".to_string(),
                role,
            })
            .await
            .expect("failed to create user")
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Log in and return the bearer token, panicking on failure.
    pub async fn token_for(&self, email: &str, password: &str) -> String {
        let response = self.login(email, password).await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
        response.body["data"]["access_token"]
            .as_str()
            .expect("access_token missing")
            .to_string()
    }

    /// Create a plain user and log them in.
    pub async fn user_with_token(&self, email: &str, password: &str) -> (User, String) {
        let user = self.create_user(email, password, UserRole::User).await;
        let token = self.token_for(email, password).await;
        (user, token)
    }

    pub async fn deactivate(&self, token: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/users/deactivation",
            Some(token),
            Some(json!({ "reason": "Taking a break", "confirmation": true })),
        )
        .await
    }

    pub async fn delete_user(&self, id: &str, token: &str) -> TestResponse {
        self.request(Method::DELETE, &format!("/users/{}", id), Some(token), None)
            .await
    }

    pub async fn find_any(&self, id: Uuid) -> Option<User> {
        self.users.find_by_id_with_deleted(id).await.unwrap()
    }
}

/// Pull the token query parameter out of a reactivation link.
pub fn token_from_link(link: &str) -> String {
    link.split("token=")
        .nth(1)
        .expect("link has no token parameter")
        .to_string()
}
