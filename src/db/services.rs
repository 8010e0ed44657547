use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::db::models::Service;

pub(crate) const COLUMNS: &str = "id, title, slug, description, benefits, image_url, display_order, \
is_visible, created_at, updated_at";

/// Column values for inserting or fully rewriting a service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDraft {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub benefits: Vec<String>,
    pub image_url: Option<String>,
    pub display_order: i32,
    pub is_visible: bool,
}

impl From<&Service> for ServiceDraft {
    fn from(service: &Service) -> Self {
        Self {
            title: service.title.clone(),
            slug: service.slug.clone(),
            description: service.description.clone(),
            benefits: service.benefits.0.clone(),
            image_url: service.image_url.clone(),
            display_order: service.display_order,
            is_visible: service.is_visible,
        }
    }
}

impl Service {
    pub async fn list_visible(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Service>(&format!(
            "SELECT {COLUMNS} FROM services WHERE is_visible = true ORDER BY display_order ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Service>(&format!(
            "SELECT {COLUMNS} FROM services ORDER BY display_order ASC, created_at ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Service>(&format!("SELECT {COLUMNS} FROM services WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM services")
            .fetch_one(pool)
            .await
    }

    pub async fn insert(pool: &PgPool, draft: &ServiceDraft) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Service>(&format!(
            r#"
            INSERT INTO services (title, slug, description, benefits, image_url, display_order, is_visible)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&draft.title)
        .bind(&draft.slug)
        .bind(&draft.description)
        .bind(Json(&draft.benefits))
        .bind(&draft.image_url)
        .bind(draft.display_order)
        .bind(draft.is_visible)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        draft: &ServiceDraft,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Service>(&format!(
            r#"
            UPDATE services
            SET title = $2, slug = $3, description = $4, benefits = $5, image_url = $6,
                display_order = $7, is_visible = $8, updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.slug)
        .bind(&draft.description)
        .bind(Json(&draft.benefits))
        .bind(&draft.image_url)
        .bind(draft.display_order)
        .bind(draft.is_visible)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
