//! Axum server for the multitool gateway.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::gateway::Gateway;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The gateway core, built once at startup.
    pub gateway: Arc<Gateway>,
}

impl AppState {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }
}

/// Build the router.
///
/// `max_body_bytes` bounds request bodies; inline base64 images need more
/// than axum's 2 MiB default.
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    let shared_state = Arc::new(state);

    Router::new()
        .route("/ai-multitool", post(super::routes::multitool::ai_multitool))
        .route("/health", get(super::routes::health::get_health))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state)
}

/// Bind and serve until Ctrl-C.
pub async fn start_server(
    config: &Config,
    state: AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = build_router(state, config.server.max_body_bytes);
    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Multitool gateway listening on {addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Multitool gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::logs::LogStore;
    use crate::media::ImageResolver;
    use crate::providers::TextGenerator;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tempfile::TempDir;
    use tower::util::ServiceExt;

    struct EchoGenerator;

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            Ok(prompt.to_uppercase())
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    async fn app(tmp: &TempDir, limit: usize) -> Router {
        let store = LogStore::open(tmp.path().join("logs")).await.unwrap();
        let images = ImageResolver::new(tmp.path().join("images"), reqwest::Client::new());
        let gateway = Gateway::new(store, Arc::new(EchoGenerator), images);
        build_router(AppState::new(Arc::new(gateway)), limit)
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/ai-multitool")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_route() {
        let tmp = TempDir::new().unwrap();
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app(&tmp, 1024).await.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_invalid_task_rejected_before_gateway() {
        let tmp = TempDir::new().unwrap();
        let resp = app(&tmp, 1024)
            .await
            .oneshot(post_json(r#"{"task":"invalid_task","input":"this should fail"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let errors = std::fs::read_to_string(tmp.path().join("logs/errors.json")).unwrap();
        assert_eq!(errors, "[]");
    }

    #[tokio::test]
    async fn test_malformed_json_rejected() {
        let tmp = TempDir::new().unwrap();
        let resp = app(&tmp, 1024)
            .await
            .oneshot(post_json("{not json"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_body_limit_enforced() {
        let tmp = TempDir::new().unwrap();
        let big = format!(r#"{{"task":"code_explain","input":"{}"}}"#, "x".repeat(4096));
        let resp = app(&tmp, 1024).await.oneshot(post_json(&big)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_empty_input_is_accepted() {
        let tmp = TempDir::new().unwrap();
        let resp = app(&tmp, 1024)
            .await
            .oneshot(post_json(r#"{"task":"code_explain","input":""}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
