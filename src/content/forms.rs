//! Public contact, quote and consultation forms.
//!
//! The three forms share one payload; the source decides which optional
//! fields are surfaced and therefore kept.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::content::validation::{
    blank_to_none, is_valid_email, required_text, ValidationError, MAX_NAME_LEN,
};
use crate::db::models::{FormSource, NewSubmission, SubmissionStatus};

const MAX_PHONE_LEN: usize = 30;
const MAX_SUBJECT_LEN: usize = 200;
const MAX_MESSAGE_LEN: usize = 2000;
const MAX_SERVICE_LEN: usize = 100;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionForm {
    #[serde(alias = "name")]
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default, alias = "service")]
    pub service_type: Option<String>,
    #[serde(default, alias = "date")]
    pub preferred_date: Option<NaiveDate>,
}

fn shows_service(source: FormSource) -> bool {
    matches!(source, FormSource::Quote | FormSource::Consultation)
}

fn shows_date(source: FormSource) -> bool {
    source == FormSource::Consultation
}

impl SubmissionForm {
    /// Checks the form for `source` and produces the row to insert.
    pub fn validate(self, source: FormSource) -> Result<NewSubmission, ValidationError> {
        let full_name = required_text("Full name", &self.full_name, MAX_NAME_LEN)?;

        let email = self.email.trim().to_string();
        if !is_valid_email(&email) {
            return Err(ValidationError::new("Invalid email address"));
        }

        let phone = required_text(
            "Phone number",
            self.phone.as_deref().unwrap_or_default(),
            MAX_PHONE_LEN,
        )?;

        let message_label = if source == FormSource::Quote {
            "Project details"
        } else {
            "Message"
        };
        let message = required_text(
            message_label,
            self.message.as_deref().unwrap_or_default(),
            MAX_MESSAGE_LEN,
        )?;

        let subject = blank_to_none(self.subject);
        if subject
            .as_ref()
            .is_some_and(|s| s.chars().count() > MAX_SUBJECT_LEN)
        {
            return Err(ValidationError::new(
                "Subject must be at most 200 characters",
            ));
        }

        let service_type = if shows_service(source) {
            Some(required_text(
                "Service",
                self.service_type.as_deref().unwrap_or_default(),
                MAX_SERVICE_LEN,
            )?)
        } else {
            None
        };

        let preferred_date = if shows_date(source) {
            self.preferred_date
        } else {
            None
        };

        Ok(NewSubmission {
            full_name,
            email,
            phone: Some(phone),
            message: Some(message),
            subject,
            service_type,
            preferred_date,
            form_source: source,
            status: SubmissionStatus::Unread,
        })
    }
}
