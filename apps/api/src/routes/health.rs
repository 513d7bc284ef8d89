use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service version and whether analyses can run (credential present).
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "hiry-api",
        "model": state.config.gemini_model,
        "analyzerConfigured": state.analyzer.is_configured()
    }))
}
