pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod dosing;
pub mod editing;
pub mod models;
pub mod schedule;
pub mod session;
pub mod tasks;
pub mod wizard;

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. Call once, from the binary.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("{} v{}", config::APP_NAME, config::APP_VERSION);
}
