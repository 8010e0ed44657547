/**
 * Portfolio Routes
 * Public gallery and the admin portfolio manager
 */
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::content::ordering::next_display_order;
use crate::content::validation::{blank_to_none, ValidationError};
use crate::db::{self, models::PortfolioItem, ordering::OrderedTable, portfolio::PortfolioDraft};
use crate::routes::session::AdminSession;
use crate::routes::{
    persist_reorder, require_pool, ApiError, ApiResult, ReorderRequest, SuccessResponse,
};

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for GET /api/portfolio
#[derive(Debug, Default, Deserialize)]
pub struct PortfolioQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePortfolioRequest {
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub before_image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub hover_caption: Option<String>,
    #[serde(default)]
    pub is_before_after: bool,
    #[serde(default)]
    pub display_order: Option<i32>,
    #[serde(default)]
    pub is_visible: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePortfolioRequest {
    pub image_url: Option<String>,
    pub before_image_url: Option<String>,
    pub category: Option<String>,
    pub title: Option<String>,
    pub hover_caption: Option<String>,
    pub is_before_after: Option<bool>,
    pub display_order: Option<i32>,
    pub is_visible: Option<bool>,
}

// ============================================================================
// Validation
// ============================================================================

fn required_image(url: &str) -> Result<String, ValidationError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ValidationError::new("Image URL is required"));
    }
    Ok(url.to_string())
}

/// A "before" image only survives on before/after items.
fn normalized(mut draft: PortfolioDraft) -> PortfolioDraft {
    if !draft.is_before_after {
        draft.before_image_url = None;
    }
    draft
}

impl CreatePortfolioRequest {
    fn into_draft(self, existing_rows: i64) -> Result<PortfolioDraft, ValidationError> {
        Ok(normalized(PortfolioDraft {
            image_url: required_image(&self.image_url)?,
            before_image_url: blank_to_none(self.before_image_url),
            category: blank_to_none(self.category),
            title: blank_to_none(self.title),
            hover_caption: blank_to_none(self.hover_caption),
            is_before_after: self.is_before_after,
            display_order: self
                .display_order
                .unwrap_or_else(|| next_display_order(existing_rows)),
            is_visible: self.is_visible.unwrap_or(true),
        }))
    }
}

impl UpdatePortfolioRequest {
    fn apply(self, mut draft: PortfolioDraft) -> Result<PortfolioDraft, ValidationError> {
        if let Some(url) = self.image_url {
            draft.image_url = required_image(&url)?;
        }
        if self.before_image_url.is_some() {
            draft.before_image_url = blank_to_none(self.before_image_url);
        }
        if self.category.is_some() {
            draft.category = blank_to_none(self.category);
        }
        if self.title.is_some() {
            draft.title = blank_to_none(self.title);
        }
        if self.hover_caption.is_some() {
            draft.hover_caption = blank_to_none(self.hover_caption);
        }
        if let Some(flag) = self.is_before_after {
            draft.is_before_after = flag;
        }
        if let Some(order) = self.display_order {
            draft.display_order = order;
        }
        if let Some(visible) = self.is_visible {
            draft.is_visible = visible;
        }
        Ok(normalized(draft))
    }
}

// ============================================================================
// Public Handlers
// ============================================================================

/// GET /api/portfolio?category=...
pub async fn list_portfolio(Query(query): Query<PortfolioQuery>) -> Json<Vec<PortfolioItem>> {
    let Some(pool) = db::get_pool() else {
        return Json(Vec::new());
    };

    let category = blank_to_none(query.category);
    match PortfolioItem::list_visible(&pool, category.as_deref()).await {
        Ok(items) => Json(items),
        Err(e) => {
            tracing::warn!(error = %e, "failed to load portfolio");
            Json(Vec::new())
        }
    }
}

// ============================================================================
// Admin Handlers
// ============================================================================

/// GET /api/admin/portfolio
pub async fn admin_list_portfolio(_admin: AdminSession) -> ApiResult<Json<Vec<PortfolioItem>>> {
    let pool = require_pool()?;
    Ok(Json(PortfolioItem::list_all(&pool).await?))
}

/// POST /api/admin/portfolio
pub async fn create_portfolio_item(
    _admin: AdminSession,
    Json(payload): Json<CreatePortfolioRequest>,
) -> ApiResult<impl IntoResponse> {
    let pool = require_pool()?;
    let existing = PortfolioItem::count(&pool).await?;
    let draft = payload.into_draft(existing)?;

    let item = PortfolioItem::insert(&pool, &draft).await?;
    tracing::info!(item_id = %item.id, "portfolio item created");

    Ok((StatusCode::CREATED, Json(item)))
}

/// PATCH /api/admin/portfolio/{id}
pub async fn update_portfolio_item(
    _admin: AdminSession,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePortfolioRequest>,
) -> ApiResult<Json<PortfolioItem>> {
    let pool = require_pool()?;
    let current = PortfolioItem::find(&pool, id)
        .await?
        .ok_or(ApiError::NotFound("Portfolio item"))?;

    let draft = payload.apply(PortfolioDraft::from(&current))?;
    let updated = PortfolioItem::update(&pool, id, &draft)
        .await?
        .ok_or(ApiError::NotFound("Portfolio item"))?;

    Ok(Json(updated))
}

/// DELETE /api/admin/portfolio/{id}
pub async fn delete_portfolio_item(
    _admin: AdminSession,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SuccessResponse>> {
    let pool = require_pool()?;
    if !PortfolioItem::delete(&pool, id).await? {
        return Err(ApiError::NotFound("Portfolio item"));
    }
    tracing::info!(item_id = %id, "portfolio item deleted");
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/admin/portfolio/reorder
pub async fn reorder_portfolio(
    _admin: AdminSession,
    Json(request): Json<ReorderRequest>,
) -> ApiResult<Json<Vec<PortfolioItem>>> {
    let pool = require_pool()?;
    let reordered =
        persist_reorder(&pool, OrderedTable::Portfolio, request, "Portfolio item").await?;
    Ok(Json(reordered))
}
