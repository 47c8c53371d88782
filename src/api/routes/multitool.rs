//! `POST /ai-multitool`: the gateway entry point.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::api::server::AppState;
use crate::gateway::{MultitoolRequest, Outcome};

/// Run one request through the gateway.
///
/// - 200 with the response record on success or cache hit.
/// - 500 with `{status, message, task, timestamp}` on failure; the failure
///   kind is folded into `message`.
/// - Body rejections (bad JSON, unknown task, missing field) keep the
///   extractor's status and never reach the gateway.
pub async fn ai_multitool(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MultitoolRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            debug!("Rejected request body: {}", rejection.body_text());
            return (
                rejection.status(),
                Json(json!({
                    "status": "error",
                    "message": rejection.body_text(),
                })),
            )
                .into_response();
        }
    };

    match state.gateway.handle(&request).await {
        Outcome::CacheHit(record) | Outcome::Generated(record) => {
            (StatusCode::OK, Json(record)).into_response()
        }
        Outcome::Failed { record, .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "status": record.status,
                "message": record.message,
                "task": record.task,
                "timestamp": record.timestamp,
            })),
        )
            .into_response(),
    }
}
