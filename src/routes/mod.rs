/**
 * Routes Module
 * API route handlers and the error type they share
 */
pub mod auth;
pub mod chat;
pub mod health;
pub mod pages;
pub mod portfolio;
pub mod services;
pub mod session;
pub mod settings;
pub mod submissions;
pub mod testimonials;
pub mod upload;

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;

use crate::content::access::Denial;
use crate::content::ordering::{arrange, Ordered};
use crate::content::validation::ValidationError;
use crate::db::{self, ordering::OrderedTable};
use uuid::Uuid;

/// Error body returned by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Client-side route to navigate to after an authorization failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
            redirect: None,
        }
    }
}

/// Success response (for delete / logout)
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Drag-and-drop drop event: `active_id` was dropped onto `over_id`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub active_id: Uuid,
    pub over_id: Uuid,
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Denied(#[from] Denial),
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("Too many requests. Please try again later.")]
    RateLimited,
    #[error("Database not available")]
    DatabaseUnavailable,
    #[error("Database error")]
    Database(#[source] sqlx::Error),
    #[error("{0}")]
    Internal(String),
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => Self::NotFound("Record"),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::Conflict("A record with this value already exists".to_string())
            }
            _ => Self::Database(e),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Denied(Denial::SignInRequired) | Self::InvalidToken | Self::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            Self::Denied(Denial::AccessDenied) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::DatabaseUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn redirect(&self) -> Option<&'static str> {
        match self {
            Self::Denied(denial) => Some(denial.redirect()),
            Self::InvalidToken => Some(Denial::SignInRequired.redirect()),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Database(e) => tracing::error!(error = %e, "database error"),
            Self::Internal(e) => tracing::error!(error = %e, "internal error"),
            _ if status.is_server_error() => tracing::warn!(error = %self, "request failed"),
            _ => {}
        }

        let body = ErrorResponse {
            error: self.to_string(),
            message: None,
            redirect: self.redirect().map(str::to_string),
        };
        (status, Json(body)).into_response()
    }
}

/// The shared pool, or 503 when the service runs without a database.
pub fn require_pool() -> ApiResult<Arc<PgPool>> {
    db::get_pool().ok_or(ApiError::DatabaseUnavailable)
}

/// Applies a drop inside one locked transaction and returns the list in its
/// new order.
pub async fn persist_reorder<T>(
    pool: &PgPool,
    table: OrderedTable,
    request: ReorderRequest,
    what: &'static str,
) -> ApiResult<Vec<T>>
where
    T: Ordered + for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
{
    let (rows, plan) = db::ordering::reorder::<T>(pool, table, request.active_id, request.over_id)
        .await?
        .ok_or(ApiError::NotFound(what))?;

    if !plan.is_noop() {
        tracing::info!(
            table = ?table,
            active_id = %request.active_id,
            over_id = %request.over_id,
            changed = plan.changes.len(),
            "list reordered"
        );
    }
    Ok(arrange(rows, &plan))
}

/// Public list with the built-in fallback. Defaults stand in only for a
/// table that has no rows at all; rows an admin hid stay hidden.
pub fn visible_or_defaults<T>(
    visible: Vec<T>,
    total_rows: i64,
    defaults: impl FnOnce() -> Vec<T>,
) -> Vec<T> {
    if visible.is_empty() && total_rows == 0 {
        defaults()
    } else {
        visible
    }
}

/// Extract bearer token from Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
