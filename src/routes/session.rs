//! Extractors that turn a bearer token into an authorized [`Session`].
//!
//! Roles are read from `user_roles` on every request; the token only proves
//! identity.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::content::access::{authorize, Requirement, Session};
use crate::db::models::User;
use crate::routes::{auth::verify_access_token, bearer_token, require_pool, ApiError};

async fn resolve_session(parts: &Parts) -> Result<Option<Session>, ApiError> {
    let Some(token) = bearer_token(&parts.headers) else {
        return Ok(None);
    };

    let claims = verify_access_token(token).map_err(|_| ApiError::InvalidToken)?;
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| ApiError::InvalidToken)?;

    let pool = require_pool()?;
    let roles = User::roles(&pool, user_id).await?;

    Ok(Some(Session {
        user_id,
        email: claims.email,
        roles,
    }))
}

/// Any signed-in user.
#[derive(Debug, Clone)]
pub struct AuthSession(pub Session);

impl<S: Send + Sync> FromRequestParts<S> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = resolve_session(parts).await?;
        Ok(Self(authorize(session, Requirement::Authenticated)?))
    }
}

/// A signed-in user holding an `admin` role row.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Session);

impl<S: Send + Sync> FromRequestParts<S> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = resolve_session(parts).await?;
        let session = authorize(session, Requirement::Admin).inspect_err(|denial| {
            tracing::warn!(reason = %denial, path = %parts.uri.path(), "admin access denied");
        })?;
        Ok(Self(session))
    }
}
