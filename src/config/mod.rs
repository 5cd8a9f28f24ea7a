//! Configuration management.
//!
//! All settings come from environment variables (usually via a `.env` file)
//! and are collected once at startup into an [`AppConfig`] that is passed by
//! reference everywhere it is needed. There is no ambient global state.

/// Database connection and table creation
pub mod database;

use crate::errors::{Error, Result};
use tracing::{info, warn};

/// Application configuration, built once at process start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SeaORM connection string, e.g. `sqlite://data/meu_gestor.sqlite?mode=rwc`
    pub database_url: String,
    /// Base URL of the Dify agent API
    pub dify_api_url: String,
    /// Authorization header value for the Dify agent
    pub dify_api_key: String,
    /// Base URL of the Evolution (WhatsApp) API
    pub evolution_api_url: String,
    /// Evolution instance name used in the send-text route
    pub evolution_instance_name: String,
    /// API key for the Evolution instance
    pub evolution_api_key: String,
    /// Public URL of the web dashboard; the link and summary-footer features
    /// are disabled when unset
    pub dashboard_url: Option<String>,
    /// Socket address the HTTP server binds to
    pub bind_address: String,
}

fn required_var(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| Error::Config {
        message: format!("environment variable {name} is not set"),
    })
}

/// Loads the full application configuration from the environment.
///
/// Fails fast with a [`Error::Config`] naming the first missing required
/// variable. `DASHBOARD_URL` is optional; its absence only logs a warning
/// because the corresponding chat action degrades gracefully.
pub fn load_app_configuration() -> Result<AppConfig> {
    let config = AppConfig {
        database_url: required_var("DATABASE_URL")?,
        dify_api_url: required_var("DIFY_API_URL")?,
        dify_api_key: required_var("DIFY_API_KEY")?,
        evolution_api_url: required_var("EVOLUTION_API_URL")?,
        evolution_instance_name: required_var("EVOLUTION_INSTANCE_NAME")?,
        evolution_api_key: required_var("EVOLUTION_API_KEY")?,
        dashboard_url: std::env::var("DASHBOARD_URL").ok(),
        bind_address: std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
    };

    if config.dashboard_url.is_none() {
        warn!("DASHBOARD_URL is not set; dashboard link requests will be refused");
    }
    info!("Application configuration loaded.");

    Ok(config)
}
