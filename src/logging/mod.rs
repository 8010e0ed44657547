/*!
 * Logging Module
 * tracing subscriber setup and HTTP request logging
 */
pub mod config;
pub mod middleware;

use tracing_appender::{
    non_blocking,
    non_blocking::{NonBlocking, WorkerGuard},
    rolling,
};
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
    Registry,
};

use config::LogSettings;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn sink<W>(writer: W, guards: &mut Vec<WorkerGuard>) -> NonBlocking
where
    W: std::io::Write + Send + 'static,
{
    let (writer, guard) = non_blocking(writer);
    guards.push(guard);
    writer
}

/// Install the global subscriber: a rolling `app.log`, an errors-only
/// `error.log` and stdout. Production writes JSON everywhere.
///
/// The returned guards flush the background writers on drop and must live
/// as long as the process.
pub fn init() -> Vec<WorkerGuard> {
    let settings = LogSettings::default();
    if let Err(e) = std::fs::create_dir_all(&settings.directory) {
        eprintln!("cannot create log directory {}: {}", settings.directory.display(), e);
    }

    let mut guards = Vec::with_capacity(3);
    let app_log = sink(rolling::daily(&settings.directory, "app.log"), &mut guards);
    let error_log = sink(rolling::daily(&settings.directory, "error.log"), &mut guards);
    let stdout = sink(std::io::stdout(), &mut guards);

    let layers: Vec<BoxedLayer> = if settings.is_production() {
        vec![
            fmt::layer()
                .json()
                .with_writer(app_log)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
            fmt::layer()
                .json()
                .with_writer(error_log)
                .with_file(true)
                .with_line_number(true)
                .with_filter(LevelFilter::ERROR)
                .boxed(),
            fmt::layer().json().with_writer(stdout).with_target(false).boxed(),
        ]
    } else {
        vec![
            fmt::layer().with_writer(app_log).with_ansi(false).boxed(),
            fmt::layer()
                .with_writer(error_log)
                .with_ansi(false)
                .with_filter(LevelFilter::ERROR)
                .boxed(),
            fmt::layer().with_writer(stdout).pretty().boxed(),
        ]
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.default_directive()));

    tracing_subscriber::registry().with(layers).with(filter).init();

    tracing::info!(
        environment = %settings.environment,
        directory = %settings.directory.display(),
        "logging initialized"
    );

    guards
}
