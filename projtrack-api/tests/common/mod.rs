//! Common test utilities for integration tests
//!
//! Builds the full router over a fresh [`MemoryStore`] with a fixed "today"
//! and cheap password hashing, and wraps request/response plumbing so each
//! test reads as a sequence of HTTP calls.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use projtrack_api::app::{build_router, AppState};
use projtrack_api::config::{ApiConfig, CalendarConfig, Config, JwtConfig, StoreBackend, StoreConfig};
use projtrack_shared::auth::password::HashParams;
use projtrack_shared::status::FixedClock;
use projtrack_shared::store::{MemoryStore, ResourceStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-secret-key-at-least-32-bytes-long";
pub const TEST_PASSWORD: &str = "dottle-nouveau-pavilion";

/// The date every test treats as today
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2016, 10, 5).expect("valid date")
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            production: false,
            cors_origins: Vec::new(),
        },
        store: StoreConfig {
            backend: StoreBackend::Memory,
            database_url: None,
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
        },
        calendar: CalendarConfig { utc_offset_hours: 0 },
    }
}

/// A signed-up user and their access token
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// Decoded response
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

/// Test context containing the app and its store
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: Router,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), test_config())
            .with_clock(Arc::new(FixedClock::new(today())))
            .with_hash_params(HashParams::fast());

        Self {
            store,
            app: build_router(state),
        }
    }

    /// Sends a request, optionally authenticated and with a JSON body
    pub async fn send(
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
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let header_string = |name: header::HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let location = header_string(header::LOCATION);
        let content_type = header_string(header::CONTENT_TYPE);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            location,
            content_type,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::DELETE, uri, token, None).await
    }

    /// Signs up a new user through the API
    pub async fn sign_up(&self, first_name: &str, last_name: &str) -> TestUser {
        let email = format!("{}-{}@example.com", first_name.to_lowercase(), Uuid::new_v4());
        let response = self
            .post(
                "/users/sign_up",
                None,
                json!({
                    "first_name": first_name,
                    "last_name": last_name,
                    "email": email,
                    "password": TEST_PASSWORD,
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "sign up failed: {:?}", response.body);

        TestUser {
            id: response.body["user"]["id"].as_str().unwrap().parse().unwrap(),
            email,
            access_token: response.body["access_token"].as_str().unwrap().to_string(),
            refresh_token: response.body["refresh_token"].as_str().unwrap().to_string(),
        }
    }

    /// Creates a project through the API, returning its id
    pub async fn create_project(&self, user: &TestUser, body: Value) -> Uuid {
        let response = self.post("/projects", Some(&user.access_token), body).await;
        assert_eq!(response.status, StatusCode::CREATED, "create failed: {:?}", response.body);

        response.body["project"]["id"].as_str().unwrap().parse().unwrap()
    }

    /// Creates a task through the API, returning its id
    pub async fn create_task(&self, user: &TestUser, project_id: Uuid, name: &str) -> Uuid {
        let response = self
            .post(
                &format!("/projects/{}/tasks", project_id),
                Some(&user.access_token),
                json!({ "name": name }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "create failed: {:?}", response.body);

        response.body["task"]["id"].as_str().unwrap().parse().unwrap()
    }

    pub async fn project_count(&self, user: &TestUser) -> i64 {
        self.store.count_projects(user.id).await.unwrap()
    }
}

/// Asserts a redirect to the sign-in page
pub fn assert_sign_in_redirect(response: &TestResponse) {
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location.as_deref(), Some("/users/sign_in"));
    assert_eq!(
        response.body["notice"],
        "You need to sign in or sign up before continuing."
    );
}

/// Asserts a redirect to the dashboard
pub fn assert_root_redirect(response: &TestResponse) {
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location.as_deref(), Some("/"));
    assert_eq!(
        response.body["alert"],
        "You are not authorized to access that project."
    );
}
