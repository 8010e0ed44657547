use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::db::models::{FormSource, FormSubmission, NewSubmission, SubmissionStatus};

const COLUMNS: &str = "id, full_name, email, phone, message, subject, service_type, \
preferred_date, form_source, status, created_at, updated_at";

/// Inbox filter; `None` fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmissionFilter {
    pub status: Option<SubmissionStatus>,
    pub form_source: Option<FormSource>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, FromRow)]
pub struct SubmissionCounts {
    pub total: i64,
    pub unread: i64,
    pub quote: i64,
    pub consultation: i64,
}

impl FormSubmission {
    pub async fn insert(pool: &PgPool, new: &NewSubmission) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, FormSubmission>(&format!(
            r#"
            INSERT INTO form_submissions
                (full_name, email, phone, message, subject, service_type,
                 preferred_date, form_source, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&new.full_name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.message)
        .bind(&new.subject)
        .bind(&new.service_type)
        .bind(new.preferred_date)
        .bind(new.form_source)
        .bind(new.status)
        .fetch_one(pool)
        .await
    }

    /// Newest first.
    pub async fn list(pool: &PgPool, filter: SubmissionFilter) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, FormSubmission>(&format!(
            r#"
            SELECT {COLUMNS} FROM form_submissions
            WHERE ($1::submission_status IS NULL OR status = $1)
              AND ($2::form_source IS NULL OR form_source = $2)
            ORDER BY created_at DESC
            "#
        ))
        .bind(filter.status)
        .bind(filter.form_source)
        .fetch_all(pool)
        .await
    }

    pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, FormSubmission>(&format!(
            "SELECT {COLUMNS} FROM form_submissions ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, FormSubmission>(&format!(
            "SELECT {COLUMNS} FROM form_submissions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Loads a submission for the admin detail view, marking it read if it
    /// was unread.
    pub async fn open(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let Some(submission) = Self::find(pool, id).await? else {
            return Ok(None);
        };

        let next = submission.status.on_view();
        if next == submission.status {
            return Ok(Some(submission));
        }
        Self::set_status(pool, id, next).await
    }

    pub async fn set_status(
        pool: &PgPool,
        id: Uuid,
        status: SubmissionStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, FormSubmission>(&format!(
            r#"
            UPDATE form_submissions SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM form_submissions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn counts(pool: &PgPool) -> Result<SubmissionCounts, sqlx::Error> {
        sqlx::query_as::<_, SubmissionCounts>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'unread') AS unread,
                COUNT(*) FILTER (WHERE form_source = 'quote') AS quote,
                COUNT(*) FILTER (WHERE form_source = 'consultation') AS consultation
            FROM form_submissions
            "#,
        )
        .fetch_one(pool)
        .await
    }
}
