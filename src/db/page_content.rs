use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::PageContentItem;

const COLUMNS: &str =
    "id, page, section, content_key, content_value, content_json, created_at, updated_at";

/// One `(section, content_key)` slot as saved by a page manager.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageContentEntry {
    pub section: String,
    pub content_key: String,
    #[serde(default)]
    pub content_value: Option<String>,
    #[serde(default)]
    pub content_json: Option<serde_json::Value>,
}

impl PageContentItem {
    pub async fn list_for_page(pool: &PgPool, page: &str) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, PageContentItem>(&format!(
            "SELECT {COLUMNS} FROM page_content WHERE page = $1 ORDER BY section ASC, content_key ASC"
        ))
        .bind(page)
        .fetch_all(pool)
        .await
    }

    /// Update-or-insert every entry for `page` in one transaction.
    pub async fn save_batch(
        pool: &PgPool,
        page: &str,
        entries: &[PageContentEntry],
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO page_content (page, section, content_key, content_value, content_json)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (page, section, content_key) DO UPDATE
            SET content_value = EXCLUDED.content_value,
                content_json = EXCLUDED.content_json,
                updated_at = now()
            RETURNING {COLUMNS}
            "#
        );

        let mut tx = pool.begin().await?;
        let mut saved = Vec::with_capacity(entries.len());

        for entry in entries {
            let row = sqlx::query_as::<_, PageContentItem>(&sql)
                .bind(page)
                .bind(&entry.section)
                .bind(&entry.content_key)
                .bind(&entry.content_value)
                .bind(&entry.content_json)
                .fetch_one(&mut *tx)
                .await?;
            saved.push(row);
        }

        tx.commit().await?;
        Ok(saved)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM page_content WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
