//! LearnHub server entry point.
//!
//! Loads the layered configuration, installs the tracing subscriber and
//! hands over to the API crate.

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt};

use learnhub_core::config::{AppConfig, LoggingConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_dir = std::env::var("LEARNHUB_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let env = std::env::var("LEARNHUB_ENV").unwrap_or_else(|_| "development".to_string());

    let config = AppConfig::load(&config_dir, &env)
        .with_context(|| format!("Failed to load configuration from '{config_dir}' (env: {env})"))?;

    init_logging(&config.logging);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config_dir = %config_dir,
        env = %env,
        "Starting LearnHub"
    );

    learnhub_api::run_server(config).await.context("Server error")?;
    Ok(())
}

/// Initialize tracing/logging
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}
