/**
 * Form Submission Routes
 * Public contact/quote/consultation capture and the admin inbox
 */
use axum::{
    extract::{Path, Query},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::export::{export_filename, submissions_csv};
use crate::content::forms::SubmissionForm;
use crate::db::models::{FormSource, FormSubmission, PortfolioItem, SubmissionStatus};
use crate::db::submissions::{SubmissionCounts, SubmissionFilter};
use crate::routes::session::AdminSession;
use crate::routes::{require_pool, ApiError, ApiResult, SuccessResponse};

const RECENT_LIMIT: i64 = 5;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmittedResponse {
    pub success: bool,
    pub id: Uuid,
}

/// Query parameters for the inbox and export; `all` or absent means no filter.
#[derive(Debug, Default, Deserialize)]
pub struct SubmissionsQuery {
    pub status: Option<String>,
    pub form_source: Option<String>,
}

impl SubmissionsQuery {
    fn filter(&self) -> Result<SubmissionFilter, ApiError> {
        Ok(SubmissionFilter {
            status: parse_filter(self.status.as_deref())?,
            form_source: parse_filter(self.form_source.as_deref())?,
        })
    }
}

fn parse_filter<T: std::str::FromStr<Err = String>>(raw: Option<&str>) -> ApiResult<Option<T>> {
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(ApiError::BadRequest),
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: SubmissionStatus,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    #[serde(flatten)]
    pub submissions: SubmissionCounts,
    pub portfolio: i64,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub stats: DashboardStats,
    pub recent: Vec<FormSubmission>,
}

// ============================================================================
// Public Handlers
// ============================================================================

/// POST /api/forms/{source}
pub async fn submit_form(
    Path(source): Path<String>,
    Json(form): Json<SubmissionForm>,
) -> ApiResult<impl IntoResponse> {
    let source: FormSource = source.parse().map_err(|_| ApiError::NotFound("Form"))?;
    let submission = form.validate(source)?;
    let pool = require_pool()?;

    let saved = FormSubmission::insert(&pool, &submission).await?;
    tracing::info!(submission_id = %saved.id, form_source = %source, "form submitted");

    Ok((
        StatusCode::CREATED,
        Json(SubmittedResponse {
            success: true,
            id: saved.id,
        }),
    ))
}

// ============================================================================
// Admin Handlers
// ============================================================================

/// GET /api/admin/dashboard
pub async fn dashboard(_admin: AdminSession) -> ApiResult<Json<DashboardResponse>> {
    let pool = require_pool()?;
    let (counts, portfolio, recent) = tokio::try_join!(
        FormSubmission::counts(&pool),
        PortfolioItem::count(&pool),
        FormSubmission::recent(&pool, RECENT_LIMIT),
    )?;

    Ok(Json(DashboardResponse {
        stats: DashboardStats {
            submissions: counts,
            portfolio,
        },
        recent,
    }))
}

/// GET /api/admin/submissions?status=&form_source=
pub async fn list_submissions(
    _admin: AdminSession,
    Query(query): Query<SubmissionsQuery>,
) -> ApiResult<Json<Vec<FormSubmission>>> {
    let filter = query.filter()?;
    let pool = require_pool()?;
    Ok(Json(FormSubmission::list(&pool, filter).await?))
}

/// GET /api/admin/submissions/{id} - opening an unread submission marks it read
pub async fn get_submission(
    _admin: AdminSession,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FormSubmission>> {
    let pool = require_pool()?;
    let submission = FormSubmission::open(&pool, id)
        .await?
        .ok_or(ApiError::NotFound("Submission"))?;
    Ok(Json(submission))
}

/// PATCH /api/admin/submissions/{id}
pub async fn update_submission_status(
    _admin: AdminSession,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> ApiResult<Json<FormSubmission>> {
    let pool = require_pool()?;
    let updated = FormSubmission::set_status(&pool, id, payload.status)
        .await?
        .ok_or(ApiError::NotFound("Submission"))?;
    tracing::info!(submission_id = %id, status = %updated.status, "submission status changed");
    Ok(Json(updated))
}

/// DELETE /api/admin/submissions/{id}
pub async fn delete_submission(
    _admin: AdminSession,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SuccessResponse>> {
    let pool = require_pool()?;
    if !FormSubmission::delete(&pool, id).await? {
        return Err(ApiError::NotFound("Submission"));
    }
    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/admin/submissions/export - CSV of the filtered inbox
pub async fn export_submissions(
    AdminSession(admin): AdminSession,
    Query(query): Query<SubmissionsQuery>,
) -> ApiResult<impl IntoResponse> {
    let filter = query.filter()?;
    let pool = require_pool()?;
    let rows = FormSubmission::list(&pool, filter).await?;

    let csv = submissions_csv(&rows).map_err(|e| ApiError::Internal(e.to_string()))?;
    let filename = export_filename(Utc::now().date_naive());
    tracing::info!(rows = rows.len(), admin = %admin.email, "submissions exported");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        csv,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::{get, post};
    use axum::Router;
    use tower::ServiceExt;

    fn router() -> Router {
        Router::new()
            .route("/api/forms/{source}", post(submit_form))
            .route("/api/admin/submissions", get(list_submissions))
            .route("/api/admin/submissions/export", get(export_submissions))
    }

    fn form_request(source: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(format!("/api/forms/{}", source))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn test_filter_treats_all_and_blank_as_unfiltered() {
        let query = SubmissionsQuery {
            status: Some("all".to_string()),
            form_source: Some(String::new()),
        };
        assert_eq!(query.filter().unwrap(), SubmissionFilter::default());

        let query = SubmissionsQuery {
            status: Some("contacted".to_string()),
            form_source: Some("quote".to_string()),
        };
        let filter = query.filter().unwrap();
        assert_eq!(filter.status, Some(SubmissionStatus::Contacted));
        assert_eq!(filter.form_source, Some(FormSource::Quote));

        let query = SubmissionsQuery {
            status: Some("archived".to_string()),
            form_source: None,
        };
        assert_eq!(query.filter().unwrap_err().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_dashboard_stats_flatten_counts() {
        let stats = DashboardStats {
            submissions: SubmissionCounts {
                total: 7,
                unread: 2,
                quote: 3,
                consultation: 1,
            },
            portfolio: 12,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "total": 7, "unread": 2, "quote": 3, "consultation": 1, "portfolio": 12
            })
        );
    }

    #[tokio::test]
    async fn test_unknown_form_source_is_not_found() {
        let req = form_request(
            "newsletter",
            serde_json::json!({ "full_name": "A", "email": "a@example.com" }),
        );
        let res = router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_quote_is_rejected_before_database() {
        let req = form_request(
            "quote",
            serde_json::json!({
                "full_name": "Amina",
                "email": "amina@example.com",
                "phone": "0791 996448",
                "message": "Kitchen refit",
            }),
        );
        let res = router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Service is required");
    }

    #[tokio::test]
    async fn test_valid_contact_without_database_is_unavailable() {
        let req = form_request(
            "contact",
            serde_json::json!({
                "name": "Brian Otieno",
                "email": "brian@example.com",
                "phone": "0700 000000",
                "message": "Please call me back",
            }),
        );
        let res = router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_inbox_and_export_require_admin() {
        for uri in ["/api/admin/submissions?status=all", "/api/admin/submissions/export"] {
            let req = Request::get(uri).body(Body::empty()).unwrap();
            let res = router().oneshot(req).await.unwrap();
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        }
    }
}
