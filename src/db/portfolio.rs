use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::PortfolioItem;

pub(crate) const COLUMNS: &str = "id, image_url, before_image_url, category, title, hover_caption, \
is_before_after, display_order, is_visible, created_at, updated_at";

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioDraft {
    pub image_url: String,
    pub before_image_url: Option<String>,
    pub category: Option<String>,
    pub title: Option<String>,
    pub hover_caption: Option<String>,
    pub is_before_after: bool,
    pub display_order: i32,
    pub is_visible: bool,
}

impl From<&PortfolioItem> for PortfolioDraft {
    fn from(item: &PortfolioItem) -> Self {
        Self {
            image_url: item.image_url.clone(),
            before_image_url: item.before_image_url.clone(),
            category: item.category.clone(),
            title: item.title.clone(),
            hover_caption: item.hover_caption.clone(),
            is_before_after: item.is_before_after,
            display_order: item.display_order,
            is_visible: item.is_visible,
        }
    }
}

impl PortfolioItem {
    /// Visible items in display order, optionally narrowed to one category.
    pub async fn list_visible(
        pool: &PgPool,
        category: Option<&str>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, PortfolioItem>(&format!(
            r#"
            SELECT {COLUMNS} FROM portfolio
            WHERE is_visible = true AND ($1::TEXT IS NULL OR category = $1)
            ORDER BY display_order ASC
            "#
        ))
        .bind(category)
        .fetch_all(pool)
        .await
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, PortfolioItem>(&format!(
            "SELECT {COLUMNS} FROM portfolio ORDER BY display_order ASC, created_at ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, PortfolioItem>(&format!("SELECT {COLUMNS} FROM portfolio WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM portfolio")
            .fetch_one(pool)
            .await
    }

    pub async fn insert(pool: &PgPool, draft: &PortfolioDraft) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, PortfolioItem>(&format!(
            r#"
            INSERT INTO portfolio
                (image_url, before_image_url, category, title, hover_caption,
                 is_before_after, display_order, is_visible)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&draft.image_url)
        .bind(&draft.before_image_url)
        .bind(&draft.category)
        .bind(&draft.title)
        .bind(&draft.hover_caption)
        .bind(draft.is_before_after)
        .bind(draft.display_order)
        .bind(draft.is_visible)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        draft: &PortfolioDraft,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, PortfolioItem>(&format!(
            r#"
            UPDATE portfolio
            SET image_url = $2, before_image_url = $3, category = $4, title = $5,
                hover_caption = $6, is_before_after = $7, display_order = $8,
                is_visible = $9, updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&draft.image_url)
        .bind(&draft.before_image_url)
        .bind(&draft.category)
        .bind(&draft.title)
        .bind(&draft.hover_caption)
        .bind(draft.is_before_after)
        .bind(draft.display_order)
        .bind(draft.is_visible)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM portfolio WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
