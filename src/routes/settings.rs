use axum::Json;
use serde::Deserialize;

use crate::content::defaults;
use crate::content::validation::{
    blank_to_none, is_valid_email, required_text, ValidationError, MAX_NAME_LEN,
};
use crate::db::{self, models::SiteSettings, settings::SiteSettingsDraft};
use crate::routes::session::AdminSession;
use crate::routes::{require_pool, ApiResult};

const MAX_FIELD_LEN: usize = 255;
const MAX_SEO_DESCRIPTION_LEN: usize = 500;

/// Fields the settings form may change; missing fields keep their value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSettingsRequest {
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub whatsapp: Option<String>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub logo_url: Option<String>,
    pub social_image_url: Option<String>,
}

impl UpdateSettingsRequest {
    fn apply(self, mut draft: SiteSettingsDraft) -> Result<SiteSettingsDraft, ValidationError> {
        if let Some(name) = self.company_name {
            draft.company_name = required_text("Company name", &name, MAX_NAME_LEN * 2)?;
        }
        if let Some(location) = self.location {
            draft.location = required_text("Location", &location, MAX_FIELD_LEN)?;
        }
        if let Some(phone) = self.phone {
            draft.phone = required_text("Phone", &phone, MAX_NAME_LEN)?;
        }
        if let Some(email) = self.email {
            let email = required_text("Email", &email, MAX_FIELD_LEN)?;
            if !is_valid_email(&email) {
                return Err(ValidationError::new("Invalid email address"));
            }
            draft.email = email;
        }
        if let Some(whatsapp) = self.whatsapp {
            draft.whatsapp = required_text("WhatsApp", &whatsapp, MAX_NAME_LEN)?;
        }
        if self.seo_title.is_some() {
            draft.seo_title = blank_to_none(self.seo_title);
        }
        if self.seo_description.is_some() {
            draft.seo_description = blank_to_none(self.seo_description);
            if draft
                .seo_description
                .as_ref()
                .is_some_and(|d| d.chars().count() > MAX_SEO_DESCRIPTION_LEN)
            {
                return Err(ValidationError::new(
                    "SEO description must be at most 500 characters",
                ));
            }
        }
        if self.logo_url.is_some() {
            draft.logo_url = blank_to_none(self.logo_url);
        }
        if self.social_image_url.is_some() {
            draft.social_image_url = blank_to_none(self.social_image_url);
        }
        Ok(draft)
    }
}

/// GET /api/site-settings
pub async fn get_site_settings() -> Json<SiteSettings> {
    let Some(pool) = db::get_pool() else {
        return Json(defaults::site_settings());
    };

    match SiteSettings::get(&pool).await {
        Ok(Some(settings)) => Json(settings),
        Ok(None) => Json(defaults::site_settings()),
        Err(e) => {
            tracing::warn!(error = %e, "failed to load site settings, serving defaults");
            Json(defaults::site_settings())
        }
    }
}

/// GET /api/admin/site-settings
pub async fn admin_get_site_settings(_admin: AdminSession) -> ApiResult<Json<SiteSettings>> {
    let pool = require_pool()?;
    let settings = SiteSettings::get(&pool)
        .await?
        .unwrap_or_else(defaults::site_settings);
    Ok(Json(settings))
}

/// PUT /api/admin/site-settings
pub async fn update_site_settings(
    AdminSession(admin): AdminSession,
    Json(payload): Json<UpdateSettingsRequest>,
) -> ApiResult<Json<SiteSettings>> {
    let pool = require_pool()?;
    let current = SiteSettings::get(&pool)
        .await?
        .unwrap_or_else(defaults::site_settings);

    let draft = payload.apply(SiteSettingsDraft::from(&current))?;
    let saved = SiteSettings::save(&pool, &draft).await?;
    tracing::info!(admin = %admin.email, "site settings updated");

    Ok(Json(saved))
}
