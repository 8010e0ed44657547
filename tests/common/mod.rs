//! Shared helpers for the database-backed scenario tests.
//!
//! These tests need a disposable Postgres database named by
//! `TEST_DATABASE_URL` and are `#[ignore]`d by default:
//!
//! ```text
//! TEST_DATABASE_URL=postgresql://localhost/beyond_house_test cargo test -- --ignored
//! ```

#![allow(dead_code)]

use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{Request, StatusCode};
use axum::Router;
use beyond_house_backend::config::{ChatConfig, MediaConfig};
use beyond_house_backend::db::{self, models::AppRole, models::User, DbConfig};
use serde_json::Value;
use std::net::SocketAddr;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub media: tempfile::TempDir,
}

/// Connects, migrates and builds the app. `None` when no test database is configured.
pub async fn setup() -> Option<TestApp> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = db::init_pool(Some(DbConfig {
        url,
        ..DbConfig::default()
    }))
    .await
    .expect("connect to TEST_DATABASE_URL");
    db::run_migrations(&pool).await.expect("run migrations");

    let media = tempfile::tempdir().expect("tempdir");
    let router = beyond_house_backend::build_app(
        MediaConfig {
            root: media.path().to_path_buf(),
            public_base_url: "http://localhost:3001/media".to_string(),
        },
        ChatConfig {
            api_url: "http://127.0.0.1:9/chat/completions".to_string(),
            api_key: None,
            model: "test-model".to_string(),
        },
    )
    .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))));

    Some(TestApp { router, media })
}

impl TestApp {
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, bytes) = self.send(method, uri, token, body).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    /// Posts one file as `multipart/form-data` to the media upload route.
    pub async fn upload(
        &self,
        folder: &str,
        token: &str,
        file_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> (StatusCode, Value) {
        const BOUNDARY: &str = "beyondhouse-test-boundary";
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::post(format!("/api/admin/media?folder={}", folder))
            .header("authorization", format!("Bearer {}", token))
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    /// Signs up a fresh account, grants it the admin role and signs in again
    /// so the returned access token belongs to an admin.
    pub async fn admin_token(&self) -> String {
        let email = format!("admin-{}@example.com", uuid::Uuid::new_v4());
        let credentials = serde_json::json!({ "email": email, "password": "correct-horse" });

        let (status, _) = self
            .json("POST", "/api/auth/signup", None, Some(credentials.clone()))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let pool = db::get_pool().expect("pool");
        let user = User::find_by_email(&pool, &email)
            .await
            .unwrap()
            .expect("user exists");
        User::grant_role(&pool, user.id, AppRole::Admin).await.unwrap();

        let (status, body) = self
            .json("POST", "/api/auth/login", None, Some(credentials))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isAdmin"], true);
        body["accessToken"].as_str().unwrap().to_string()
    }
}
