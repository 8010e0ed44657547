use axum::{extract::Path, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::content::defaults;
use crate::content::ordering::next_display_order;
use crate::content::validation::{blank_to_none, clamp_rating, required_text, ValidationError};
use crate::db::{self, models::Testimonial, testimonials::TestimonialDraft};
use crate::routes::session::AdminSession;
use crate::routes::{require_pool, visible_or_defaults, ApiError, ApiResult, SuccessResponse};

const MAX_NAME_LEN: usize = 100;
const MAX_CONTENT_LEN: usize = 2000;

#[derive(Debug, Deserialize)]
pub struct CreateTestimonialRequest {
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub client_role: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub display_order: Option<i32>,
    #[serde(default)]
    pub is_visible: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTestimonialRequest {
    pub client_name: Option<String>,
    pub client_role: Option<String>,
    pub content: Option<String>,
    pub rating: Option<i32>,
    pub display_order: Option<i32>,
    pub is_visible: Option<bool>,
}

impl CreateTestimonialRequest {
    fn into_draft(self, existing_rows: i64) -> Result<TestimonialDraft, ValidationError> {
        Ok(TestimonialDraft {
            client_name: required_text("Client name", &self.client_name, MAX_NAME_LEN)?,
            client_role: blank_to_none(self.client_role),
            content: required_text("Content", &self.content, MAX_CONTENT_LEN)?,
            rating: clamp_rating(self.rating),
            display_order: self
                .display_order
                .unwrap_or_else(|| next_display_order(existing_rows)),
            is_visible: self.is_visible.unwrap_or(true),
        })
    }
}

impl UpdateTestimonialRequest {
    fn apply(self, mut draft: TestimonialDraft) -> Result<TestimonialDraft, ValidationError> {
        if let Some(name) = self.client_name {
            draft.client_name = required_text("Client name", &name, MAX_NAME_LEN)?;
        }
        if self.client_role.is_some() {
            draft.client_role = blank_to_none(self.client_role);
        }
        if let Some(content) = self.content {
            draft.content = required_text("Content", &content, MAX_CONTENT_LEN)?;
        }
        if self.rating.is_some() {
            draft.rating = clamp_rating(self.rating);
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

/// GET /api/testimonials - built-in reviews until the table has rows
pub async fn list_testimonials() -> Json<Vec<Testimonial>> {
    let Some(pool) = db::get_pool() else {
        return Json(defaults::testimonials());
    };

    let loaded = tokio::try_join!(Testimonial::list_visible(&pool), Testimonial::count(&pool));
    match loaded {
        Ok((visible, total)) => Json(visible_or_defaults(visible, total, defaults::testimonials)),
        Err(e) => {
            tracing::warn!(error = %e, "failed to load testimonials, serving defaults");
            Json(defaults::testimonials())
        }
    }
}

/// GET /api/admin/testimonials
pub async fn admin_list_testimonials(_admin: AdminSession) -> ApiResult<Json<Vec<Testimonial>>> {
    let pool = require_pool()?;
    Ok(Json(Testimonial::list_all(&pool).await?))
}

/// POST /api/admin/testimonials
pub async fn create_testimonial(
    _admin: AdminSession,
    Json(payload): Json<CreateTestimonialRequest>,
) -> ApiResult<impl IntoResponse> {
    let pool = require_pool()?;
    let existing = Testimonial::count(&pool).await?;
    let testimonial = Testimonial::insert(&pool, &payload.into_draft(existing)?).await?;
    Ok((StatusCode::CREATED, Json(testimonial)))
}

/// PATCH /api/admin/testimonials/{id}
pub async fn update_testimonial(
    _admin: AdminSession,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTestimonialRequest>,
) -> ApiResult<Json<Testimonial>> {
    let pool = require_pool()?;
    let current = Testimonial::find(&pool, id)
        .await?
        .ok_or(ApiError::NotFound("Testimonial"))?;
    let draft = payload.apply(TestimonialDraft::from(&current))?;
    let updated = Testimonial::update(&pool, id, &draft)
        .await?
        .ok_or(ApiError::NotFound("Testimonial"))?;
    Ok(Json(updated))
}

/// DELETE /api/admin/testimonials/{id}
pub async fn delete_testimonial(
    _admin: AdminSession,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SuccessResponse>> {
    let pool = require_pool()?;
    if !Testimonial::delete(&pool, id).await? {
        return Err(ApiError::NotFound("Testimonial"));
    }
    Ok(Json(SuccessResponse { success: true }))
}
