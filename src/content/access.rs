//! Authorization decisions for a resolved session.

use serde::Serialize;
use uuid::Uuid;

use crate::db::models::AppRole;

/// Authenticated caller plus the role rows looked up for it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub roles: Vec<AppRole>,
}

impl Session {
    /// Only the presence of an `admin` role row grants admin capability.
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&AppRole::Admin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Authenticated,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Denial {
    #[error("Authorization required")]
    SignInRequired,
    #[error("Access denied")]
    AccessDenied,
}

impl Denial {
    /// Where a client should send the user after this denial.
    pub fn redirect(&self) -> &'static str {
        match self {
            Self::SignInRequired => "/auth",
            Self::AccessDenied => "/",
        }
    }
}

pub fn authorize(session: Option<Session>, requirement: Requirement) -> Result<Session, Denial> {
    let session = session.ok_or(Denial::SignInRequired)?;
    match requirement {
        Requirement::Admin if !session.is_admin() => Err(Denial::AccessDenied),
        _ => Ok(session),
    }
}
