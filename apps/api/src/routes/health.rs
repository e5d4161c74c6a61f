use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status plus the size of the loaded reference data.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resume-matcher-api",
        "jobs": state.catalog.catalog().len(),
        "skills": state.vocabulary.len(),
        "embedder": state.embedder.name(),
        "recognizer": state.recognizer.name(),
    }))
}
