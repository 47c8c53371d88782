//! Liveness endpoint.

use axum::Json;
use serde_json::{json, Value};

/// GET /health: always `{"status": "ok"}`, no side effects.
pub async fn get_health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
