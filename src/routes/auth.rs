/**
 * Authentication Routes
 * Email/password accounts with JWT access tokens and rotating refresh tokens
 */
use axum::{extract::ConnectInfo, http::HeaderMap, http::StatusCode, response::IntoResponse, Json};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::distr::{Alphanumeric, SampleString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{collections::HashMap, net::SocketAddr, sync::Mutex};
use uuid::Uuid;

use crate::content::validation::{validate_credentials, validate_full_name};
use crate::db::models::{AppRole, Profile, RefreshTokenOwner, User};
use crate::routes::session::AuthSession;
use crate::routes::{bearer_token, require_pool, ApiError, ApiResult, SuccessResponse};

pub const DEFAULT_JWT_SECRET: &str = "default-jwt-secret-change-in-production";

lazy_static::lazy_static! {
    /// HS256 signing key; the default only passes outside production.
    pub static ref JWT_SECRET: String = std::env::var("JWT_SECRET")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string());

    /// Sign-in attempts per client IP
    static ref SIGN_IN_LIMITER: RateLimiter = RateLimiter::new(MAX_ATTEMPTS_PER_WINDOW, RATE_LIMIT_WINDOW_SECS);
}

const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;
const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;
const REFRESH_TOKEN_LEN: usize = 64;

const RATE_LIMIT_WINDOW_SECS: i64 = 60;
const MAX_ATTEMPTS_PER_WINDOW: u32 = 5;

/// Access token payload. `sub` is the account id; roles are looked up per
/// request so a revoked admin loses access before the token expires.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

/// Fixed-window attempt counter keyed by client address.
#[derive(Debug)]
pub struct RateLimiter {
    max_attempts: u32,
    window_secs: i64,
    windows: Mutex<HashMap<String, (i64, u32)>>,
}

impl RateLimiter {
    pub fn new(max_attempts: u32, window_secs: i64) -> Self {
        Self {
            max_attempts,
            window_secs,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Records an attempt at `now` (unix seconds); `false` once the key has
    /// used up its window.
    pub fn check(&self, key: &str, now: i64) -> bool {
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        // Drop expired windows so memory tracks active clients only.
        windows.retain(|_, (start, _)| now - *start < self.window_secs);

        let (_, count) = windows.entry(key.to_string()).or_insert((now, 0));
        if *count >= self.max_attempts {
            return false;
        }
        *count += 1;
        true
    }
}

fn sign_in_allowed(ip: &str) -> bool {
    #[cfg(test)]
    {
        let _ = ip;
        true
    }

    #[cfg(not(test))]
    {
        SIGN_IN_LIMITER.check(ip, Utc::now().timestamp())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserInfo,
    pub roles: Vec<AppRole>,
    pub is_admin: bool,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: UserInfo,
    pub roles: Vec<AppRole>,
    pub is_admin: bool,
}

fn new_refresh_token() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), REFRESH_TOKEN_LEN)
}

/// SHA-256 hex digest; only the digest is ever stored.
pub fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn create_access_token(user_id: Uuid, email: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let issued = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: (issued + Duration::seconds(ACCESS_TOKEN_TTL_SECS)).timestamp(),
        iat: issued.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
}

/// Signature and expiry are both checked.
pub fn verify_access_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(JWT_SECRET.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// bcrypt is CPU-bound; keep it off the async executor.
async fn hash_password(password: String) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || hash(password, DEFAULT_COST))
        .await
        .map_err(|e| ApiError::Internal(format!("password hashing task failed: {}", e)))?
        .map_err(|e| ApiError::Internal(format!("failed to hash password: {}", e)))
}

async fn password_matches(password: String, password_hash: String) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || verify(password, &password_hash))
        .await
        .map_err(|e| ApiError::Internal(format!("password check task failed: {}", e)))?
        .map_err(|e| ApiError::Internal(format!("failed to verify password: {}", e)))
}

/// Issues an access token plus a freshly stored refresh token.
async fn issue_tokens(pool: &sqlx::PgPool, user_id: Uuid, email: &str) -> ApiResult<TokenPair> {
    let access_token = create_access_token(user_id, email)
        .map_err(|e| ApiError::Internal(format!("failed to create token: {}", e)))?;

    let refresh_token = new_refresh_token();
    let expires_at = Utc::now() + Duration::seconds(REFRESH_TOKEN_TTL_SECS);
    RefreshTokenOwner::store(pool, user_id, &hash_refresh_token(&refresh_token), expires_at)
        .await?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// POST /api/auth/signup
pub async fn signup(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    if !sign_in_allowed(&addr.ip().to_string()) {
        return Err(ApiError::RateLimited);
    }

    let email = validate_credentials(&payload.email, &payload.password)?;
    let full_name = validate_full_name(payload.full_name)?;
    let pool = require_pool()?;

    if User::find_by_email(&pool, &email).await?.is_some() {
        return Err(ApiError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }

    let password_hash = hash_password(payload.password).await?;
    let user = User::create(&pool, &email, &password_hash, full_name.as_deref()).await?;
    let tokens = issue_tokens(&pool, user.id, &user.email).await?;

    tracing::info!(user_id = %user.id, "account created");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserInfo {
                id: user.id,
                email: user.email,
                full_name,
            },
            roles: vec![AppRole::User],
            is_admin: false,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }),
    ))
}

/// POST /api/auth/login
pub async fn login(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let ip = addr.ip().to_string();
    if !sign_in_allowed(&ip) {
        tracing::warn!(ip = %ip, "sign-in rate limited");
        return Err(ApiError::RateLimited);
    }

    let email = validate_credentials(&payload.email, &payload.password)?;
    let pool = require_pool()?;

    let Some(user) = User::find_by_email(&pool, &email).await? else {
        tracing::info!(ip = %ip, "sign-in for unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    if !password_matches(payload.password, user.password_hash.clone()).await? {
        tracing::info!(user_id = %user.id, ip = %ip, "sign-in with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let tokens = issue_tokens(&pool, user.id, &user.email).await?;
    let roles = User::roles(&pool, user.id).await?;
    let full_name = Profile::find(&pool, user.id)
        .await?
        .and_then(|profile| profile.full_name);

    tracing::info!(user_id = %user.id, "signed in");

    Ok(Json(AuthResponse {
        is_admin: roles.contains(&AppRole::Admin),
        user: UserInfo {
            id: user.id,
            email: user.email,
            full_name,
        },
        roles,
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }))
}

/// POST /api/auth/refresh
pub async fn refresh(Json(payload): Json<RefreshRequest>) -> ApiResult<Json<TokenPair>> {
    if payload.refresh_token.trim().is_empty() {
        return Err(ApiError::BadRequest("Refresh token is required".to_string()));
    }

    let pool = require_pool()?;
    let token_hash = hash_refresh_token(&payload.refresh_token);

    let owner = RefreshTokenOwner::find(&pool, &token_hash)
        .await?
        .filter(|owner| owner.is_usable(Utc::now()))
        .ok_or(ApiError::InvalidToken)?;

    let access_token = create_access_token(owner.user_id, &owner.email)
        .map_err(|e| ApiError::Internal(format!("failed to create token: {}", e)))?;

    let refresh_token = new_refresh_token();
    let expires_at = Utc::now() + Duration::seconds(REFRESH_TOKEN_TTL_SECS);
    RefreshTokenOwner::rotate(
        &pool,
        owner.user_id,
        &token_hash,
        &hash_refresh_token(&refresh_token),
        expires_at,
    )
    .await?;

    Ok(Json(TokenPair {
        access_token,
        refresh_token,
    }))
}

/// POST /api/auth/logout
/// Revokes the given refresh token, and every refresh token of the bearer's
/// user when an access token accompanies the request. Always succeeds.
pub async fn logout(headers: HeaderMap, Json(payload): Json<LogoutRequest>) -> impl IntoResponse {
    if let Some(pool) = crate::db::get_pool() {
        if let Some(refresh_token) = payload.refresh_token.filter(|t| !t.is_empty()) {
            if let Err(e) = RefreshTokenOwner::revoke(&pool, &hash_refresh_token(&refresh_token)).await {
                tracing::warn!(error = %e, "failed to revoke refresh token");
            }
        }

        let user_id = bearer_token(&headers)
            .and_then(|token| verify_access_token(token).ok())
            .and_then(|claims| Uuid::parse_str(&claims.sub).ok());
        if let Some(user_id) = user_id {
            if let Err(e) = RefreshTokenOwner::revoke_all(&pool, user_id).await {
                tracing::warn!(error = %e, user_id = %user_id, "failed to revoke user tokens");
            }
        }
    }

    (StatusCode::OK, Json(SuccessResponse { success: true }))
}

/// GET /api/auth/session
pub async fn session(AuthSession(session): AuthSession) -> ApiResult<Json<SessionResponse>> {
    let pool = require_pool()?;
    let full_name = Profile::find(&pool, session.user_id)
        .await?
        .and_then(|profile| profile.full_name);

    Ok(Json(SessionResponse {
        is_admin: session.is_admin(),
        user: UserInfo {
            id: session.user_id,
            email: session.email,
            full_name,
        },
        roles: session.roles,
    }))
}
