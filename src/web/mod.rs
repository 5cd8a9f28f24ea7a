//! Web layer - axum routes for the Evolution webhook and the dashboard API.
//!
//! Everything here is pass-through glue: handlers decode the request, call
//! into `core`, and encode the response. CORS is wide open because the
//! dashboard is served from a different origin.

/// Dashboard REST endpoints (read + row edit/delete)
pub mod dashboard;
/// Evolution webhook endpoint (inbound WhatsApp messages)
pub mod webhook;

use crate::config::AppConfig;
use axum::{
    Router,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection for all ledger operations
    pub db: Arc<DatabaseConnection>,
    /// Application configuration, built once at startup
    pub config: Arc<AppConfig>,
    /// Reused HTTP client for the external collaborators
    pub http: reqwest::Client,
}

impl AppState {
    /// Creates the shared state with a fresh HTTP client.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: Arc<AppConfig>) -> Self {
        Self {
            db: Arc::new(db),
            config,
            http: reqwest::Client::new(),
        }
    }
}

/// Builds the application router.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard::health))
        .route("/api/data/:phone_number", get(dashboard::get_user_data))
        .route(
            "/api/expense/:expense_id",
            axum::routing::put(dashboard::update_expense).delete(dashboard::delete_expense),
        )
        .route(
            "/api/income/:income_id",
            axum::routing::put(dashboard::update_income).delete(dashboard::delete_income),
        )
        .route("/webhook/evolution", post(webhook::evolution_webhook))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
