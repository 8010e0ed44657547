/**
 * Service Routes
 * Public service list and the admin service manager
 */
use axum::{extract::Path, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::benefits::{benefits_text, BenefitsInput};
use crate::content::defaults;
use crate::content::ordering::next_display_order;
use crate::content::validation::{blank_to_none, is_valid_slug, required_text, ValidationError};
use crate::db::{self, models::Service, ordering::OrderedTable, services::ServiceDraft};
use crate::routes::session::AdminSession;
use crate::routes::{
    persist_reorder, require_pool, visible_or_defaults, ApiError, ApiResult, ReorderRequest,
    SuccessResponse,
};

const MAX_TITLE_LEN: usize = 200;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateServiceRequest {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub benefits: Option<BenefitsInput>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub display_order: Option<i32>,
    #[serde(default)]
    pub is_visible: Option<bool>,
}

/// Every field optional; an empty string clears a nullable column.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateServiceRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub benefits: Option<BenefitsInput>,
    pub image_url: Option<String>,
    pub display_order: Option<i32>,
    pub is_visible: Option<bool>,
}

/// Admin listing row: the service plus its benefits as editor text, one
/// benefit per line.
#[derive(Debug, Serialize)]
pub struct AdminService {
    #[serde(flatten)]
    pub service: Service,
    pub benefits_text: String,
}

impl From<Service> for AdminService {
    fn from(service: Service) -> Self {
        let benefits_text = benefits_text(&service.benefits.0);
        Self {
            service,
            benefits_text,
        }
    }
}

// ============================================================================
// Validation
// ============================================================================

fn checked_slug(slug: &str) -> Result<String, ValidationError> {
    let slug = slug.trim();
    if !is_valid_slug(slug) {
        return Err(ValidationError::new(
            "Slug must be lowercase letters, numbers and single hyphens",
        ));
    }
    Ok(slug.to_string())
}

impl CreateServiceRequest {
    fn into_draft(self, existing_rows: i64) -> Result<ServiceDraft, ValidationError> {
        Ok(ServiceDraft {
            title: required_text("Title", &self.title, MAX_TITLE_LEN)?,
            slug: checked_slug(&self.slug)?,
            description: blank_to_none(self.description),
            benefits: self.benefits.map(BenefitsInput::into_list).unwrap_or_default(),
            image_url: blank_to_none(self.image_url),
            display_order: self
                .display_order
                .unwrap_or_else(|| next_display_order(existing_rows)),
            is_visible: self.is_visible.unwrap_or(true),
        })
    }
}

impl UpdateServiceRequest {
    fn apply(self, mut draft: ServiceDraft) -> Result<ServiceDraft, ValidationError> {
        if let Some(title) = self.title {
            draft.title = required_text("Title", &title, MAX_TITLE_LEN)?;
        }
        if let Some(slug) = self.slug {
            draft.slug = checked_slug(&slug)?;
        }
        if self.description.is_some() {
            draft.description = blank_to_none(self.description);
        }
        if let Some(benefits) = self.benefits {
            draft.benefits = benefits.into_list();
        }
        if self.image_url.is_some() {
            draft.image_url = blank_to_none(self.image_url);
        }
        if let Some(order) = self.display_order {
            draft.display_order = order;
        }
        if let Some(visible) = self.is_visible {
            draft.is_visible = visible;
        }
        Ok(draft)
    }
}

// ============================================================================
// Public Handlers
// ============================================================================

/// GET /api/services - visible services in display order
///
/// Falls back to the built-in catalogue when the database is missing or
/// failing, or the table has no rows. Hiding every service empties the list.
pub async fn list_services() -> Json<Vec<Service>> {
    let Some(pool) = db::get_pool() else {
        return Json(defaults::services());
    };

    let loaded = tokio::try_join!(Service::list_visible(&pool), Service::count(&pool));
    match loaded {
        Ok((visible, total)) => Json(visible_or_defaults(visible, total, defaults::services)),
        Err(e) => {
            tracing::warn!(error = %e, "failed to load services, serving defaults");
            Json(defaults::services())
        }
    }
}

// ============================================================================
// Admin Handlers
// ============================================================================

/// GET /api/admin/services
pub async fn admin_list_services(_admin: AdminSession) -> ApiResult<Json<Vec<AdminService>>> {
    let pool = require_pool()?;
    let services = Service::list_all(&pool).await?;
    Ok(Json(services.into_iter().map(AdminService::from).collect()))
}

/// POST /api/admin/services
pub async fn create_service(
    AdminSession(admin): AdminSession,
    Json(payload): Json<CreateServiceRequest>,
) -> ApiResult<impl IntoResponse> {
    let pool = require_pool()?;
    let existing = Service::count(&pool).await?;
    let draft = payload.into_draft(existing)?;

    let service = Service::insert(&pool, &draft).await.map_err(slug_conflict)?;
    tracing::info!(service_id = %service.id, slug = %service.slug, admin = %admin.email, "service created");

    Ok((StatusCode::CREATED, Json(service)))
}

/// PATCH /api/admin/services/{id}
pub async fn update_service(
    _admin: AdminSession,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateServiceRequest>,
) -> ApiResult<Json<Service>> {
    let pool = require_pool()?;
    let current = Service::find(&pool, id)
        .await?
        .ok_or(ApiError::NotFound("Service"))?;

    let draft = payload.apply(ServiceDraft::from(&current))?;
    let updated = Service::update(&pool, id, &draft)
        .await
        .map_err(slug_conflict)?
        .ok_or(ApiError::NotFound("Service"))?;

    Ok(Json(updated))
}

/// DELETE /api/admin/services/{id}
pub async fn delete_service(
    _admin: AdminSession,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SuccessResponse>> {
    let pool = require_pool()?;
    if !Service::delete(&pool, id).await? {
        return Err(ApiError::NotFound("Service"));
    }
    tracing::info!(service_id = %id, "service deleted");
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/admin/services/reorder
pub async fn reorder_services(
    _admin: AdminSession,
    Json(request): Json<ReorderRequest>,
) -> ApiResult<Json<Vec<Service>>> {
    let pool = require_pool()?;
    let reordered = persist_reorder(&pool, OrderedTable::Services, request, "Service").await?;
    Ok(Json(reordered))
}

fn slug_conflict(e: sqlx::Error) -> ApiError {
    match ApiError::from(e) {
        ApiError::Conflict(_) => {
            ApiError::Conflict("A service with this slug already exists".to_string())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::{get, patch, post};
    use axum::Router;
    use tower::ServiceExt;

    fn create_request(json: serde_json::Value) -> CreateServiceRequest {
        serde_json::from_value(json).unwrap()
    }

    fn draft() -> ServiceDraft {
        ServiceDraft {
            title: "Ceiling Design".to_string(),
            slug: "ceiling".to_string(),
            description: Some("Gypsum ceilings".to_string()),
            benefits: vec!["LED lighting".to_string()],
            image_url: Some("https://cdn.example.com/ceiling.jpg".to_string()),
            display_order: 0,
            is_visible: true,
        }
    }

    #[test]
    fn test_create_parses_benefits_text_and_appends_order() {
        let draft = create_request(serde_json::json!({
            "title": "  Custom Cabinetry ",
            "slug": "cabinetry",
            "benefits": "Kitchen cabinets\n\n  Wardrobes  \n",
        }))
        .into_draft(4)
        .unwrap();

        assert_eq!(draft.title, "Custom Cabinetry");
        assert_eq!(draft.benefits, vec!["Kitchen cabinets", "Wardrobes"]);
        assert_eq!(draft.display_order, 4);
        assert!(draft.is_visible);
    }

    #[test]
    fn test_create_accepts_benefits_list() {
        let draft = create_request(serde_json::json!({
            "title": "Floors",
            "slug": "floors",
            "benefits": ["Tiles", " ", "Hardwood"],
            "display_order": 9,
        }))
        .into_draft(2)
        .unwrap();
        assert_eq!(draft.benefits, vec!["Tiles", "Hardwood"]);
        assert_eq!(draft.display_order, 9);
    }

    #[test]
    fn test_create_rejects_bad_slug_and_blank_title() {
        let err = create_request(serde_json::json!({ "title": "Walls", "slug": "Walls & Decor" }))
            .into_draft(0)
            .unwrap_err();
        assert!(err.0.starts_with("Slug"));

        let err = create_request(serde_json::json!({ "title": " ", "slug": "walls" }))
            .into_draft(0)
            .unwrap_err();
        assert_eq!(err.0, "Title is required");
    }

    #[test]
    fn test_patch_toggles_visibility_and_clears_image() {
        let patch = UpdateServiceRequest {
            is_visible: Some(false),
            image_url: Some(String::new()),
            ..Default::default()
        };
        let updated = patch.apply(draft()).unwrap();
        assert!(!updated.is_visible);
        assert_eq!(updated.image_url, None);
        assert_eq!(updated.title, "Ceiling Design");
        assert_eq!(updated.description.as_deref(), Some("Gypsum ceilings"));
    }

    #[test]
    fn test_admin_listing_carries_benefits_as_text() {
        let service = defaults::services().remove(0);
        let json = serde_json::to_value(AdminService::from(service)).unwrap();
        assert_eq!(json["slug"], "ceiling");
        assert_eq!(json["benefits"][0], "Custom gypsum ceiling designs");
        let text = json["benefits_text"].as_str().unwrap();
        assert!(text.starts_with("Custom gypsum ceiling designs\nLED strip"));
        assert_eq!(text.lines().count(), 6);
    }

    #[test]
    fn test_empty_patch_changes_nothing() {
        assert_eq!(UpdateServiceRequest::default().apply(draft()).unwrap(), draft());
    }

    fn test_router() -> Router {
        Router::new()
            .route("/api/services", get(list_services))
            .route(
                "/api/admin/services",
                get(admin_list_services).post(create_service),
            )
            .route("/api/admin/services/{id}", patch(update_service))
            .route("/api/admin/services/reorder", post(reorder_services))
    }

    #[tokio::test]
    async fn test_public_services_fall_back_to_defaults_without_database() {
        let req = Request::get("/api/services").body(Body::empty()).unwrap();
        let res = test_router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let services: Vec<Service> = serde_json::from_slice(&body).unwrap();
        let slugs: Vec<&str> = services.iter().map(|s| s.slug.as_str()).collect();
        assert_eq!(slugs, vec!["ceiling", "cabinetry", "walls", "floors"]);
    }

    #[tokio::test]
    async fn test_admin_routes_require_sign_in() {
        let requests = [
            Request::get("/api/admin/services").body(Body::empty()).unwrap(),
            Request::post("/api/admin/services/reorder")
                .header("content-type", "application/json")
                .body(Body::from(format!(
                    r#"{{"active_id":"{}","over_id":"{}"}}"#,
                    Uuid::new_v4(),
                    Uuid::new_v4()
                )))
                .unwrap(),
        ];
        for req in requests {
            let res = test_router().oneshot(req).await.unwrap();
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        }
    }
}
