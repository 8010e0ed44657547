/**
 * Health Routes
 * Liveness and readiness probes for the site backend
 */
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::storage::MediaStore;

lazy_static::lazy_static! {
    static ref BOOTED_AT: Instant = Instant::now();
}

/// Pin the uptime clock to process start rather than the first probe.
pub fn init_start_time() {
    lazy_static::initialize(&BOOTED_AT);
}

fn uptime_secs() -> u64 {
    BOOTED_AT.elapsed().as_secs()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeState {
    Healthy,
    Unhealthy,
}

/// Outcome of probing one dependency.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Probe {
    pub status: ProbeState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Probe {
    fn passed(took: Duration) -> Self {
        Self {
            status: ProbeState::Healthy,
            response_time: Some(took.as_millis() as u64),
            error: None,
        }
    }

    fn failed(reason: impl Display) -> Self {
        Self {
            status: ProbeState::Unhealthy,
            response_time: None,
            error: Some(reason.to_string()),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == ProbeState::Healthy
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Dependencies {
    pub database: Probe,
    pub media: Probe,
}

impl Dependencies {
    async fn probe(media_root: &Path) -> Self {
        let (database, media) = tokio::join!(probe_database(), probe_media(media_root));
        Self { database, media }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Liveness {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DetailedReport {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub uptime: u64,
    pub checks: Dependencies,
}

/// Readiness summary. `degraded` means the public site is running on
/// built-in content because the database is unreachable.
#[derive(Debug, Serialize, Deserialize)]
pub struct Readiness {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub uptime: u64,
    pub database: ProbeState,
    pub media: ProbeState,
}

async fn probe_database() -> Probe {
    match crate::db::health_check().await {
        Ok(took) => Probe::passed(took),
        Err(e) => Probe::failed(e),
    }
}

/// The directory uploads are written to must exist and be a directory.
/// Read-only: the server creates it at start-up.
async fn probe_media(root: &Path) -> Probe {
    let start = Instant::now();
    match tokio::fs::metadata(root).await {
        Ok(meta) if meta.is_dir() => Probe::passed(start.elapsed()),
        Ok(_) => Probe::failed(format!("{} is not a directory", root.display())),
        Err(e) => Probe::failed(e),
    }
}

/// Probe routes, checking the same media directory the upload route uses.
pub fn health_routes(store: MediaStore) -> Router {
    Router::new()
        .route("/health", get(health_ping))
        .route("/health/detailed", get(health_detailed))
        .route("/health/database", get(health_database))
        .route("/health/ready", get(health_ready))
        .with_state(store)
}

/// GET /health
pub async fn health_ping() -> Json<Liveness> {
    Json(Liveness {
        status: "ok".to_string(),
    })
}

/// GET /health/detailed
///
/// Public pages fall back to built-in content, so this stays "ok" while the
/// database is down; the per-dependency checks carry the detail.
pub async fn health_detailed(State(store): State<MediaStore>) -> Json<DetailedReport> {
    Json(DetailedReport {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        uptime: uptime_secs(),
        checks: Dependencies::probe(store.root()).await,
    })
}

/// GET /health/database
pub async fn health_database() -> Json<Probe> {
    Json(probe_database().await)
}

/// GET /health/ready - 503 only when uploads cannot be written.
pub async fn health_ready(State(store): State<MediaStore>) -> (StatusCode, Json<Readiness>) {
    let checks = Dependencies::probe(store.root()).await;

    let (code, status) = match (checks.media.is_healthy(), checks.database.is_healthy()) {
        (false, _) => (StatusCode::SERVICE_UNAVAILABLE, "not_ready"),
        (true, false) => (StatusCode::OK, "degraded"),
        (true, true) => (StatusCode::OK, "ready"),
    };
    if code != StatusCode::OK {
        tracing::warn!(error = ?checks.media.error, "media directory unavailable");
    }

    (
        code,
        Json(Readiness {
            status: status.to_string(),
            timestamp: Utc::now(),
            uptime: uptime_secs(),
            database: checks.database.status,
            media: checks.media.status,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MediaConfig;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn probes(media_root: &Path) -> Router {
        health_routes(MediaStore::new(MediaConfig {
            root: media_root.to_path_buf(),
            public_base_url: "http://localhost:3001/media".to_string(),
        }))
    }

    async fn fetch(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let req = Request::get(uri).body(Body::empty()).unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn test_failed_probe_omits_response_time() {
        let json = serde_json::to_value(Probe::failed("connection refused")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "status": "unhealthy", "error": "connection refused" })
        );

        let json = serde_json::to_value(Probe::passed(Duration::from_millis(12))).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "healthy", "responseTime": 12 }));
    }

    #[tokio::test]
    async fn test_media_probe_does_not_create_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("media");
        assert!(!probe_media(&root).await.is_healthy());
        assert!(!root.exists());

        std::fs::create_dir(&root).unwrap();
        assert!(probe_media(&root).await.is_healthy());
    }

    #[tokio::test]
    async fn test_media_probe_rejects_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("media");
        std::fs::write(&root, b"not a dir").unwrap();
        let probe = probe_media(&root).await;
        assert_eq!(probe.status, ProbeState::Unhealthy);
        assert!(probe.error.is_some());
    }

    #[tokio::test]
    async fn test_ping_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = fetch(probes(dir.path()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_database_probe_without_pool_is_unhealthy() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = fetch(probes(dir.path()), "/health/database").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "unhealthy");
    }

    #[tokio::test]
    async fn test_detailed_stays_ok_without_database() {
        init_start_time();
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = fetch(probes(dir.path()), "/health/detailed").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["checks"]["database"]["status"], "unhealthy");
        assert_eq!(body["checks"]["media"]["status"], "healthy");
        assert!(body["uptime"].is_u64());
    }

    #[tokio::test]
    async fn test_readiness_follows_the_configured_media_root() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = fetch(probes(dir.path()), "/health/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["media"], "healthy");

        let missing = dir.path().join("not-created");
        let (status, body) = fetch(probes(&missing), "/health/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "not_ready");
        assert!(!missing.exists());
    }
}
