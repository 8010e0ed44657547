use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::Testimonial;

const COLUMNS: &str =
    "id, client_name, client_role, content, rating, display_order, is_visible, created_at, updated_at";

#[derive(Debug, Clone, PartialEq)]
pub struct TestimonialDraft {
    pub client_name: String,
    pub client_role: Option<String>,
    pub content: String,
    pub rating: i32,
    pub display_order: i32,
    pub is_visible: bool,
}

impl From<&Testimonial> for TestimonialDraft {
    fn from(t: &Testimonial) -> Self {
        Self {
            client_name: t.client_name.clone(),
            client_role: t.client_role.clone(),
            content: t.content.clone(),
            rating: t.rating,
            display_order: t.display_order,
            is_visible: t.is_visible,
        }
    }
}

impl Testimonial {
    pub async fn list_visible(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Testimonial>(&format!(
            "SELECT {COLUMNS} FROM testimonials WHERE is_visible = true ORDER BY display_order ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Testimonial>(&format!(
            "SELECT {COLUMNS} FROM testimonials ORDER BY display_order ASC, created_at ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Testimonial>(&format!(
            "SELECT {COLUMNS} FROM testimonials WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM testimonials")
            .fetch_one(pool)
            .await
    }

    pub async fn insert(pool: &PgPool, draft: &TestimonialDraft) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Testimonial>(&format!(
            r#"
            INSERT INTO testimonials (client_name, client_role, content, rating, display_order, is_visible)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&draft.client_name)
        .bind(&draft.client_role)
        .bind(&draft.content)
        .bind(draft.rating)
        .bind(draft.display_order)
        .bind(draft.is_visible)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        draft: &TestimonialDraft,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Testimonial>(&format!(
            r#"
            UPDATE testimonials
            SET client_name = $2, client_role = $3, content = $4, rating = $5,
                display_order = $6, is_visible = $7, updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&draft.client_name)
        .bind(&draft.client_role)
        .bind(&draft.content)
        .bind(draft.rating)
        .bind(draft.display_order)
        .bind(draft.is_visible)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM testimonials WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
