use sqlx::PgPool;

use crate::db::models::SiteSettings;

const COLUMNS: &str = "id, company_name, location, phone, email, whatsapp, seo_title, \
seo_description, logo_url, social_image_url, created_at, updated_at";

#[derive(Debug, Clone, PartialEq)]
pub struct SiteSettingsDraft {
    pub company_name: String,
    pub location: String,
    pub phone: String,
    pub email: String,
    pub whatsapp: String,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub logo_url: Option<String>,
    pub social_image_url: Option<String>,
}

impl From<&SiteSettings> for SiteSettingsDraft {
    fn from(s: &SiteSettings) -> Self {
        Self {
            company_name: s.company_name.clone(),
            location: s.location.clone(),
            phone: s.phone.clone(),
            email: s.email.clone(),
            whatsapp: s.whatsapp.clone(),
            seo_title: s.seo_title.clone(),
            seo_description: s.seo_description.clone(),
            logo_url: s.logo_url.clone(),
            social_image_url: s.social_image_url.clone(),
        }
    }
}

impl SiteSettings {
    /// The singleton row; the oldest one wins if duplicates ever exist.
    pub async fn get(pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, SiteSettings>(&format!(
            "SELECT {COLUMNS} FROM site_settings ORDER BY created_at ASC LIMIT 1"
        ))
        .fetch_optional(pool)
        .await
    }

    /// Overwrites the singleton, creating it when the table is empty.
    pub async fn save(pool: &PgPool, draft: &SiteSettingsDraft) -> Result<Self, sqlx::Error> {
        let existing = Self::get(pool).await?;

        let (sql, id) = match existing {
            Some(current) => (
                format!(
                    r#"
                    UPDATE site_settings
                    SET company_name = $2, location = $3, phone = $4, email = $5, whatsapp = $6,
                        seo_title = $7, seo_description = $8, logo_url = $9,
                        social_image_url = $10, updated_at = now()
                    WHERE id = $1
                    RETURNING {COLUMNS}
                    "#
                ),
                current.id,
            ),
            None => (
                format!(
                    r#"
                    INSERT INTO site_settings
                        (id, company_name, location, phone, email, whatsapp, seo_title,
                         seo_description, logo_url, social_image_url)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                    RETURNING {COLUMNS}
                    "#
                ),
                uuid::Uuid::new_v4(),
            ),
        };

        sqlx::query_as::<_, SiteSettings>(&sql)
            .bind(id)
            .bind(&draft.company_name)
            .bind(&draft.location)
            .bind(&draft.phone)
            .bind(&draft.email)
            .bind(&draft.whatsapp)
            .bind(&draft.seo_title)
            .bind(&draft.seo_description)
            .bind(&draft.logo_url)
            .bind(&draft.social_image_url)
            .fetch_one(pool)
            .await
    }
}
