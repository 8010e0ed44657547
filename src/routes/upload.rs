use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use crate::routes::session::AdminSession;
use crate::routes::{ApiError, ApiResult};
use crate::storage::{MediaStore, StorageError, StoredMedia, DEFAULT_FOLDER, MAX_FILE_SIZE};

/// Request bodies may exceed the image limit so oversize files get the
/// friendly 400 instead of a bare 413.
const BODY_LIMIT: usize = 2 * MAX_FILE_SIZE;

#[derive(Debug, Default, Deserialize)]
pub struct MediaQuery {
    pub folder: Option<String>,
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        if e.is_rejection() {
            ApiError::BadRequest(e.to_string())
        } else {
            ApiError::Internal(e.to_string())
        }
    }
}

pub fn media_routes(store: MediaStore) -> Router {
    Router::new()
        .route("/api/admin/media", post(upload_media))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(store)
}

/// POST /api/admin/media?folder=portfolio
pub async fn upload_media(
    AdminSession(admin): AdminSession,
    State(store): State<MediaStore>,
    Query(query): Query<MediaQuery>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let folder = query
        .folder
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| DEFAULT_FOLDER.to_string());

    let stored = receive_upload(&store, &folder, multipart).await?;
    tracing::info!(path = %stored.path, admin = %admin.email, "media uploaded");

    Ok((StatusCode::CREATED, Json(stored)))
}

/// Takes the first file part of the form and hands it to the store.
async fn receive_upload(
    store: &MediaStore,
    folder: &str,
    mut multipart: Multipart,
) -> ApiResult<StoredMedia> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(ApiError::BadRequest("No file provided".to_string())),
            Err(e) => {
                tracing::warn!(error = %e, "multipart error");
                return Err(ApiError::BadRequest("Invalid multipart data".to_string()));
            }
        };

        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let bytes = field.bytes().await.map_err(|e| {
            tracing::warn!(error = %e, "failed to read upload bytes");
            ApiError::BadRequest("Failed to read file data".to_string())
        })?;

        return Ok(store.store(folder, &file_name, &content_type, &bytes).await?);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MediaConfig;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;
    use tower::ServiceExt;

    const BOUNDARY: &str = "XBOUNDARYX";
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

    fn multipart_body(file_name: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"caption\"\r\n\r\nhello\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn request(body: Vec<u8>) -> Request<Body> {
        Request::post("/api/admin/media")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn multipart(body: Vec<u8>) -> Multipart {
        Multipart::from_request(request(body), &()).await.unwrap()
    }

    fn store(dir: &std::path::Path) -> MediaStore {
        MediaStore::new(MediaConfig {
            root: dir.to_path_buf(),
            public_base_url: "http://localhost:3001/media".to_string(),
        })
    }

    #[tokio::test]
    async fn test_upload_skips_text_fields_and_stores_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let stored = receive_upload(
            &store,
            "services",
            multipart(multipart_body("ceiling.jpeg", "image/jpeg", JPEG)).await,
        )
        .await
        .unwrap();

        assert!(stored.path.starts_with("services/"));
        assert!(stored.path.ends_with(".jpeg"));
        assert!(stored.url.starts_with("http://localhost:3001/media/services/"));
        assert!(dir.path().join(&stored.path).exists());
    }

    #[tokio::test]
    async fn test_non_image_is_rejected_with_message() {
        let dir = tempfile::tempdir().unwrap();
        let err = receive_upload(
            &store(dir.path()),
            DEFAULT_FOLDER,
            multipart(multipart_body("notes.pdf", "application/pdf", b"%PDF-1.4")).await,
        )
        .await
        .unwrap_err();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Please upload an image file");
        assert!(!dir.path().join(DEFAULT_FOLDER).exists());
    }

    #[tokio::test]
    async fn test_oversize_image_is_rejected_with_message() {
        let dir = tempfile::tempdir().unwrap();
        let app = Router::new()
            .route(
                "/api/admin/media",
                post(|State(store): State<MediaStore>, multipart: Multipart| async move {
                    receive_upload(&store, DEFAULT_FOLDER, multipart).await.map(Json)
                }),
            )
            .layer(DefaultBodyLimit::max(BODY_LIMIT))
            .with_state(store(dir.path()));

        let mut big = JPEG.to_vec();
        big.resize(MAX_FILE_SIZE + 1, 0);
        let res = app
            .oneshot(request(multipart_body("big.jpg", "image/jpeg", &big)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Image must be less than 5MB");
    }

    #[tokio::test]
    async fn test_form_without_file_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"caption\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
        );
        let err = receive_upload(
            &store(dir.path()),
            DEFAULT_FOLDER,
            multipart(body.into_bytes()).await,
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "No file provided");
    }

    #[tokio::test]
    async fn test_upload_route_requires_admin() {
        let dir = tempfile::tempdir().unwrap();
        let app = media_routes(store(dir.path()));
        let res = app
            .oneshot(request(multipart_body("a.jpg", "image/jpeg", JPEG)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
