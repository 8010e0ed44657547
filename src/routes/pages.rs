/**
 * Page Content Routes
 * Editable page copy with hard-coded fallbacks
 */
use axum::{extract::Path, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::defaults::is_known_page;
use crate::content::page::{PageContent, ResolvedContent};
use crate::content::validation::ValidationError;
use crate::db::{self, models::PageContentItem, page_content::PageContentEntry};
use crate::routes::session::AdminSession;
use crate::routes::{require_pool, ApiError, ApiResult, SuccessResponse};

const MAX_KEY_LEN: usize = 100;

/// Rows plus the resolved `section -> key -> value` map.
#[derive(Debug, Serialize)]
pub struct PageResponse {
    pub page: String,
    pub items: Vec<PageContentItem>,
    pub values: ResolvedContent,
}

impl From<PageContent> for PageResponse {
    fn from(content: PageContent) -> Self {
        let values = content.resolve();
        Self {
            page: content.page,
            items: content.items,
            values,
        }
    }
}

/// Page managers send either `{"entries": [...]}` or the bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SavePageRequest {
    Wrapped { entries: Vec<PageContentEntry> },
    Bare(Vec<PageContentEntry>),
}

impl SavePageRequest {
    fn into_entries(self) -> Vec<PageContentEntry> {
        match self {
            Self::Wrapped { entries } | Self::Bare(entries) => entries,
        }
    }
}

fn known_page(page: &str) -> ApiResult<()> {
    if is_known_page(page) {
        Ok(())
    } else {
        Err(ApiError::NotFound("Page"))
    }
}

fn checked_entries(entries: Vec<PageContentEntry>) -> Result<Vec<PageContentEntry>, ValidationError> {
    entries
        .into_iter()
        .map(|mut entry| {
            entry.section = entry.section.trim().to_string();
            entry.content_key = entry.content_key.trim().to_string();
            if entry.section.is_empty() || entry.content_key.is_empty() {
                return Err(ValidationError::new("Section and key are required"));
            }
            if entry.section.len() > MAX_KEY_LEN || entry.content_key.len() > MAX_KEY_LEN {
                return Err(ValidationError::new(format!(
                    "Section and key must be less than {MAX_KEY_LEN} characters"
                )));
            }
            Ok(entry)
        })
        .collect()
}

/// GET /api/pages/{page}
pub async fn get_page(Path(page): Path<String>) -> ApiResult<Json<PageResponse>> {
    known_page(&page)?;

    let Some(pool) = db::get_pool() else {
        return Ok(Json(PageContent::empty(page).into()));
    };

    let content = match PageContentItem::list_for_page(&pool, &page).await {
        Ok(items) => PageContent::new(page, items),
        Err(e) => {
            tracing::warn!(page = %page, error = %e, "failed to load page content, serving defaults");
            PageContent::empty(page)
        }
    };
    Ok(Json(content.into()))
}

/// GET /api/admin/pages/{page}
pub async fn admin_get_page(
    _admin: AdminSession,
    Path(page): Path<String>,
) -> ApiResult<Json<PageResponse>> {
    known_page(&page)?;
    let pool = require_pool()?;
    let items = PageContentItem::list_for_page(&pool, &page).await?;
    Ok(Json(PageContent::new(page, items).into()))
}

/// PUT /api/admin/pages/{page}
pub async fn save_page(
    AdminSession(admin): AdminSession,
    Path(page): Path<String>,
    Json(payload): Json<SavePageRequest>,
) -> ApiResult<Json<PageResponse>> {
    known_page(&page)?;
    let entries = checked_entries(payload.into_entries())?;
    let pool = require_pool()?;

    PageContentItem::save_batch(&pool, &page, &entries).await?;
    tracing::info!(page = %page, entries = entries.len(), admin = %admin.email, "page content saved");

    let items = PageContentItem::list_for_page(&pool, &page).await?;
    Ok(Json(PageContent::new(page, items).into()))
}

/// DELETE /api/admin/page-content/{id}
pub async fn delete_page_content(
    _admin: AdminSession,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SuccessResponse>> {
    let pool = require_pool()?;
    if !PageContentItem::delete(&pool, id).await? {
        return Err(ApiError::NotFound("Page content"));
    }
    Ok(Json(SuccessResponse { success: true }))
}
