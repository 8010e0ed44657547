//! Connection pool, schema migrations and per-table queries.

pub mod models;
pub mod ordering;
pub mod page_content;
pub mod portfolio;
pub mod services;
pub mod settings;
pub mod submissions;
pub mod testimonials;
pub mod users;

use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;

use crate::content::defaults;

static DB_POOL: OnceCell<Arc<PgPool>> = OnceCell::const_new();

fn env_or<T: std::str::FromStr>(name: &str, fallback: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(fallback)
}

/// Pool sizing and timeouts, read from `DATABASE_URL` and `DB_*`.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: env_or("DATABASE_URL", "postgresql://localhost/beyond_house".to_string()),
            max_connections: env_or("DB_POOL_MAX", 10),
            min_connections: env_or("DB_POOL_MIN", 1),
            acquire_timeout: Duration::from_secs(env_or("DB_CONNECT_TIMEOUT", 5)),
            idle_timeout: Duration::from_secs(env_or("DB_IDLE_TIMEOUT", 300)),
        }
    }
}

/// Host and database name only, so credentials never reach the logs.
fn redacted(url: &str) -> String {
    let tail = url.rsplit_once('@').map_or(url, |(_, rest)| rest);
    let tail = tail.split_once("://").map_or(tail, |(_, rest)| rest);
    tail.to_string()
}

/// Connect, verify the connection and publish the pool for `get_pool`.
pub async fn init_pool(config: Option<DbConfig>) -> Result<Arc<PgPool>, sqlx::Error> {
    let config = config.unwrap_or_default();
    tracing::info!(target_db = %redacted(&config.url), "connecting to database");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .test_before_acquire(true)
        .connect(&config.url)
        .await?;

    sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&pool).await?;

    let pool = Arc::new(pool);
    if DB_POOL.set(pool.clone()).is_err() {
        tracing::warn!("database pool already initialized; keeping the first one");
    }
    tracing::info!(max = config.max_connections, "database pool ready");

    Ok(pool)
}

pub fn get_pool() -> Option<Arc<PgPool>> {
    DB_POOL.get().cloned()
}

/// Round-trip time of a trivial query, or an error when there is no pool.
pub async fn health_check() -> Result<Duration, sqlx::Error> {
    let Some(pool) = get_pool() else {
        return Err(sqlx::Error::Configuration("no database configured".into()));
    };

    let started = Instant::now();
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool.as_ref())
        .await?;
    Ok(started.elapsed())
}

/// Postgres enum types. `CREATE TYPE` has no `IF NOT EXISTS`, so each one is
/// wrapped to swallow `duplicate_object`.
const ENUM_TYPES: &[(&str, &str)] = &[
    ("app_role", "'admin', 'user'"),
    ("form_source", "'contact', 'consultation', 'quote'"),
    ("submission_status", "'unread', 'read', 'contacted'"),
];

const TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        email TEXT UNIQUE NOT NULL,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS profiles (
        id UUID PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
        full_name TEXT,
        email TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_roles (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        role app_role NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        UNIQUE (user_id, role)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS refresh_tokens (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        token_hash TEXT NOT NULL UNIQUE,
        expires_at TIMESTAMPTZ NOT NULL,
        revoked BOOLEAN NOT NULL DEFAULT false,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS services (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        title TEXT NOT NULL,
        slug TEXT UNIQUE NOT NULL,
        description TEXT,
        benefits JSONB NOT NULL DEFAULT '[]'::jsonb,
        image_url TEXT,
        display_order INTEGER NOT NULL DEFAULT 0,
        is_visible BOOLEAN NOT NULL DEFAULT true,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS portfolio (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        image_url TEXT NOT NULL,
        before_image_url TEXT,
        category TEXT,
        title TEXT,
        hover_caption TEXT,
        is_before_after BOOLEAN NOT NULL DEFAULT false,
        display_order INTEGER NOT NULL DEFAULT 0,
        is_visible BOOLEAN NOT NULL DEFAULT true,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS testimonials (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        client_name TEXT NOT NULL,
        client_role TEXT,
        content TEXT NOT NULL,
        rating INTEGER NOT NULL DEFAULT 5 CHECK (rating BETWEEN 1 AND 5),
        display_order INTEGER NOT NULL DEFAULT 0,
        is_visible BOOLEAN NOT NULL DEFAULT true,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS page_content (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        page TEXT NOT NULL,
        section TEXT NOT NULL,
        content_key TEXT NOT NULL,
        content_value TEXT,
        content_json JSONB,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        UNIQUE (page, section, content_key)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS site_settings (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        company_name TEXT NOT NULL,
        location TEXT NOT NULL,
        phone TEXT NOT NULL,
        email TEXT NOT NULL,
        whatsapp TEXT NOT NULL,
        seo_title TEXT,
        seo_description TEXT,
        logo_url TEXT,
        social_image_url TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS form_submissions (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        full_name TEXT NOT NULL,
        email TEXT NOT NULL,
        phone TEXT,
        message TEXT,
        subject TEXT,
        service_type TEXT,
        preferred_date DATE,
        form_source form_source NOT NULL,
        status submission_status NOT NULL DEFAULT 'unread',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_refresh_tokens_expires_at ON refresh_tokens(expires_at)",
    "CREATE INDEX IF NOT EXISTS idx_user_roles_user_id ON user_roles(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_services_display_order ON services(display_order)",
    "CREATE INDEX IF NOT EXISTS idx_portfolio_display_order ON portfolio(display_order)",
    "CREATE INDEX IF NOT EXISTS idx_portfolio_category ON portfolio(category)",
    "CREATE INDEX IF NOT EXISTS idx_testimonials_display_order ON testimonials(display_order)",
    "CREATE INDEX IF NOT EXISTS idx_page_content_page ON page_content(page)",
    "CREATE INDEX IF NOT EXISTS idx_form_submissions_created_at ON form_submissions(created_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_form_submissions_status ON form_submissions(status)",
];

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running database migrations...");

    for (name, variants) in ENUM_TYPES {
        sqlx::query(&format!(
            r#"
            DO $$ BEGIN
                CREATE TYPE {name} AS ENUM ({variants});
            EXCEPTION
                WHEN duplicate_object THEN NULL;
            END $$
            "#
        ))
        .execute(pool)
        .await?;
    }

    for statement in TABLES.iter().chain(INDEXES) {
        sqlx::query(statement).execute(pool).await?;
    }

    seed_defaults(pool).await?;

    tracing::info!("Database migrations completed successfully");

    Ok(())
}

/// Fills the settings singleton and the service catalogue on a fresh
/// database. Tables that already hold rows are left alone.
async fn seed_defaults(pool: &PgPool) -> Result<(), sqlx::Error> {
    let settings: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM site_settings")
        .fetch_one(pool)
        .await?;
    if settings == 0 {
        let s = defaults::site_settings();
        sqlx::query(
            r#"
            INSERT INTO site_settings
                (company_name, location, phone, email, whatsapp, seo_title, seo_description)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&s.company_name)
        .bind(&s.location)
        .bind(&s.phone)
        .bind(&s.email)
        .bind(&s.whatsapp)
        .bind(&s.seo_title)
        .bind(&s.seo_description)
        .execute(pool)
        .await?;
        tracing::info!("Seeded default site settings");
    }

    let services: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM services")
        .fetch_one(pool)
        .await?;
    if services == 0 {
        let mut tx = pool.begin().await?;
        for service in defaults::services() {
            sqlx::query(
                r#"
                INSERT INTO services (title, slug, description, benefits, display_order, is_visible)
                VALUES ($1, $2, $3, $4, $5, true)
                "#,
            )
            .bind(&service.title)
            .bind(&service.slug)
            .bind(&service.description)
            .bind(Json(&service.benefits.0))
            .bind(service.display_order)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        tracing::info!(count = defaults::SERVICES.len(), "Seeded default services");
    }

    Ok(())
}
