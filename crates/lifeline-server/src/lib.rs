//! Lifeline server library logic.

pub mod api_voice;
pub mod config;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Json, Router,
};
use lifeline_lookup::{LookupClient, LookupError};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
///
/// Read-only after startup; handlers never mutate it, so no locking is needed.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Client for the resource inference service.
    pub lookup: Arc<LookupClient>,
    /// Destination for call transfers.
    pub reroute_number: String,
}

impl AppState {
    /// Builds the shared state from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Config`] if the lookup settings are unusable.
    pub fn from_config(config: &config::Config) -> Result<Self, LookupError> {
        Ok(Self {
            lookup: Arc::new(LookupClient::new(&config.lookup)?),
            reroute_number: config.telephony.reroute_number.clone(),
        })
    }
}

/// Maximum request body size (64 KiB). Webhook forms are a few hundred bytes.
const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            api_voice::HANDLE_CALL_PATH,
            post(api_voice::handle_call_handler),
        )
        .route(
            api_voice::TRANSCRIPT_COMPLETE_PATH,
            post(api_voice::transcript_complete_handler),
        )
        .route(
            api_voice::HANDLE_REROUTE_PATH,
            post(api_voice::handle_reroute_handler),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(Arc::new(state)))
}
