//! Beyond House Backend - marketing site content API, admin CMS and chat proxy

pub mod config;
pub mod content;
pub mod db;
pub mod logging;
pub mod routes;
pub mod storage;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    services::ServeDir, trace::TraceLayer,
};

use crate::config::{ChatConfig, MediaConfig, ServerConfig};
use crate::storage::MediaStore;

/// Comma-separated origin list; entries that are not valid header values
/// are skipped.
fn parse_origins(raw: &str) -> Vec<HeaderValue> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| origin.parse().ok())
        .collect()
}

/// Site origins from `ALLOWED_ORIGINS`, then `FRONTEND_ORIGIN`, then the
/// local dev server.
fn site_origins() -> Vec<HeaderValue> {
    ["ALLOWED_ORIGINS", "FRONTEND_ORIGIN"]
        .into_iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|raw| parse_origins(&raw))
        .find(|origins| !origins.is_empty())
        .unwrap_or_else(|| {
            vec![
                HeaderValue::from_static("http://localhost:8080"),
                HeaderValue::from_static("http://127.0.0.1:8080"),
            ]
        })
}

/// CORS for the site and admin console. Chat carries its own open policy.
pub fn configure_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(site_origins())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Public site API, auth and admin CMS routes.
fn api_routes() -> Router {
    use routes::{auth, pages, portfolio, services, settings, submissions, testimonials};

    Router::new()
        // Public site
        .route("/api/site-settings", get(settings::get_site_settings))
        .route("/api/pages/{page}", get(pages::get_page))
        .route("/api/services", get(services::list_services))
        .route("/api/portfolio", get(portfolio::list_portfolio))
        .route("/api/testimonials", get(testimonials::list_testimonials))
        .route("/api/forms/{source}", post(submissions::submit_form))
        // Auth
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/session", get(auth::session))
        // Admin
        .route("/api/admin/dashboard", get(submissions::dashboard))
        .route(
            "/api/admin/services",
            get(services::admin_list_services).post(services::create_service),
        )
        .route("/api/admin/services/reorder", post(services::reorder_services))
        .route(
            "/api/admin/services/{id}",
            patch(services::update_service).delete(services::delete_service),
        )
        .route(
            "/api/admin/portfolio",
            get(portfolio::admin_list_portfolio).post(portfolio::create_portfolio_item),
        )
        .route("/api/admin/portfolio/reorder", post(portfolio::reorder_portfolio))
        .route(
            "/api/admin/portfolio/{id}",
            patch(portfolio::update_portfolio_item).delete(portfolio::delete_portfolio_item),
        )
        .route(
            "/api/admin/testimonials",
            get(testimonials::admin_list_testimonials).post(testimonials::create_testimonial),
        )
        .route(
            "/api/admin/testimonials/{id}",
            patch(testimonials::update_testimonial).delete(testimonials::delete_testimonial),
        )
        .route(
            "/api/admin/pages/{page}",
            get(pages::admin_get_page).put(pages::save_page),
        )
        .route(
            "/api/admin/page-content/{id}",
            delete(pages::delete_page_content),
        )
        .route(
            "/api/admin/site-settings",
            get(settings::admin_get_site_settings).put(settings::update_site_settings),
        )
        .route("/api/admin/submissions", get(submissions::list_submissions))
        .route(
            "/api/admin/submissions/export",
            get(submissions::export_submissions),
        )
        .route(
            "/api/admin/submissions/{id}",
            get(submissions::get_submission)
                .patch(submissions::update_submission_status)
                .delete(submissions::delete_submission),
        )
        // JSON bodies stay small; uploads carry their own limit
        .layer(RequestBodyLimitLayer::new(2 * 1024 * 1024))
}

/// Assemble the full application from explicit media and chat settings.
pub fn build_app(media: MediaConfig, chat: ChatConfig) -> Router {
    let media_root = media.root.clone();
    let store = MediaStore::new(media);

    let site = api_routes()
        .merge(routes::health::health_routes(store.clone()))
        .merge(routes::upload::media_routes(store))
        .nest_service("/media", ServeDir::new(media_root))
        .layer(configure_cors());

    site.merge(routes::chat::chat_routes(chat))
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        // Compress responses with gzip/br/zstd; event streams are left alone
        .layer(CompressionLayer::new())
}

/// Create and configure the application router.
pub fn create_app() -> Router {
    let app = build_app(MediaConfig::default(), ChatConfig::default());
    tracing::info!("Routes and CORS configured");
    app
}

/// Run the server (used by main).
pub async fn run() {
    dotenvy::dotenv().ok();

    // Guards must outlive the server or buffered log lines are lost.
    let _log_guards = logging::init();

    routes::health::init_start_time();

    let server = ServerConfig::default();

    // Refuse to start in production with the insecure default JWT secret.
    if server.is_production() {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        if secret.is_empty() || secret == routes::auth::DEFAULT_JWT_SECRET {
            panic!(
                "FATAL: JWT_SECRET must be set to a secure, unique value in production. \
                 Refusing to start with the default secret."
            );
        }
    }

    let media_root = MediaConfig::default().root;
    if let Err(e) = std::fs::create_dir_all(&media_root) {
        tracing::error!(error = %e, path = %media_root.display(), "cannot create media directory");
    }

    if ChatConfig::default().api_key.is_none() {
        tracing::warn!("CHAT_API_KEY not set. Chat requests will fail until it is configured.");
    }

    if std::env::var("DATABASE_URL").is_ok() {
        match db::init_pool(None).await {
            Ok(pool) => {
                if let Err(e) = db::run_migrations(&pool).await {
                    tracing::error!(error = %e, "Failed to run database migrations");
                }
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Failed to initialize database pool. Continuing without database."
                );
            }
        }
    } else {
        tracing::info!("DATABASE_URL not set. Serving default content without a database.");
    }

    let app = create_app();

    let addr: SocketAddr = format!("{}:{}", server.host, server.port)
        .parse()
        .expect("Invalid HOST/PORT configuration");
    tracing::info!(%addr, environment = %server.environment, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}
