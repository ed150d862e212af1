use axum::{extract::State, response::Json};
use serde_json::{json, Value};
use tracing::debug;

use crate::state::AppState;

/// Liveness check.
pub async fn root_handler() -> &'static str {
    "AI Resume Analyzer backend is running"
}

/// Health check endpoint. Dependencies are reported by presence only.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let store_backend = state.store.backend();
    let ai_configured = state.analyzer.is_configured();

    debug!(store = store_backend, ai_configured = ai_configured, "Health check requested");

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "services": {
            "store": store_backend,
            "ai_configured": ai_configured,
            "max_file_size_mb": state.config.max_file_size_mb,
        }
    }))
}
