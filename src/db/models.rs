//! Database Models - row structs and enum types shared by queries and handlers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Enum types (Postgres ENUMs)
// ============================================================================

/// Which public form produced a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "form_source", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FormSource {
    Contact,
    Consultation,
    Quote,
}

impl FormSource {
    pub const ALL: [FormSource; 3] = [Self::Contact, Self::Consultation, Self::Quote];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Consultation => "consultation",
            Self::Quote => "quote",
        }
    }
}

impl FromStr for FormSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| format!("unknown form source '{}'", s))
    }
}

impl fmt::Display for FormSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admin triage state of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "submission_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Unread,
    Read,
    Contacted,
}

impl SubmissionStatus {
    pub const ALL: [SubmissionStatus; 3] = [Self::Unread, Self::Read, Self::Contacted];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unread => "unread",
            Self::Read => "read",
            Self::Contacted => "contacted",
        }
    }

    /// Status after an admin opens the submission.
    pub fn on_view(self) -> Self {
        match self {
            Self::Unread => Self::Read,
            other => other,
        }
    }
}

impl FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown submission status '{}'", s))
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "app_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AppRole {
    Admin,
    User,
}

impl AppRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

// ============================================================================
// Content tables
// ============================================================================

/// Service offering shown on the services page.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub benefits: Json<Vec<String>>,
    pub image_url: Option<String>,
    pub display_order: i32,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Portfolio image, optionally a before/after pair.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PortfolioItem {
    pub id: Uuid,
    pub image_url: String,
    pub before_image_url: Option<String>,
    pub category: Option<String>,
    pub title: Option<String>,
    pub hover_caption: Option<String>,
    pub is_before_after: bool,
    pub display_order: i32,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: Uuid,
    pub client_name: String,
    pub client_role: Option<String>,
    pub content: String,
    pub rating: i32,
    pub display_order: i32,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable copy keyed by `(page, section, content_key)`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PageContentItem {
    pub id: Uuid,
    pub page: String,
    pub section: String,
    pub content_key: String,
    pub content_value: Option<String>,
    pub content_json: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Singleton row with company details and SEO metadata.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SiteSettings {
    pub id: Uuid,
    pub company_name: String,
    pub location: String,
    pub phone: String,
    pub email: String,
    pub whatsapp: String,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub logo_url: Option<String>,
    pub social_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct FormSubmission {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub subject: Option<String>,
    pub service_type: Option<String>,
    pub preferred_date: Option<NaiveDate>,
    pub form_source: FormSource,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated submission ready for insertion. Status always starts `unread`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmission {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub subject: Option<String>,
    pub service_type: Option<String>,
    pub preferred_date: Option<NaiveDate>,
    pub form_source: FormSource,
    pub status: SubmissionStatus,
}

// ============================================================================
// Auth tables
// ============================================================================

/// Credentials row backing sign-in.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserRole {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: AppRole,
    pub created_at: DateTime<Utc>,
}

/// Active refresh token joined with its owner.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshTokenOwner {
    pub user_id: Uuid,
    pub email: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_source_parses_known_values() {
        assert_eq!("quote".parse::<FormSource>(), Ok(FormSource::Quote));
        assert_eq!(
            "consultation".parse::<FormSource>(),
            Ok(FormSource::Consultation)
        );
        assert!("newsletter".parse::<FormSource>().is_err());
    }

    #[test]
    fn test_status_on_view_only_promotes_unread() {
        assert_eq!(SubmissionStatus::Unread.on_view(), SubmissionStatus::Read);
        assert_eq!(SubmissionStatus::Read.on_view(), SubmissionStatus::Read);
        assert_eq!(
            SubmissionStatus::Contacted.on_view(),
            SubmissionStatus::Contacted
        );
    }

    #[test]
    fn test_enums_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&SubmissionStatus::Contacted).unwrap(),
            "\"contacted\""
        );
        assert_eq!(serde_json::to_string(&AppRole::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&FormSource::Quote).unwrap(), "\"quote\"");
    }
}
