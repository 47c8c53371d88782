//! Native Gemini provider for single-prompt `generateContent` calls.
//!
//! Auth is an API key sent as the `?key=` query parameter. Thinking models tag
//! intermediate parts with `thought: true`; those are skipped when picking the
//! answer text.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{MultitoolError, Result};

use super::TextGenerator;

// ── Constants ────────────────────────────────────────────────────────────────

/// Gemini v1beta REST API base.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model when none is configured.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Upper bound on a single upstream call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ── Provider ─────────────────────────────────────────────────────────────────

/// Gemini provider speaking the REST API directly.
pub struct GeminiProvider {
    api_key: String,
    model: String,
    api_base: String,
    client: Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GeminiProvider {
    /// Build a provider on a shared HTTP client.
    ///
    /// The client carries the request timeout; see [`build_client`].
    pub fn new(api_key: &str, model: &str, client: Client) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            api_base: GEMINI_API_BASE.to_string(),
            client,
        }
    }

    /// Point the provider at a different API base (trailing `/` is ignored).
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Minimal `generateContent` body for a single user prompt.
    pub fn build_request_body(prompt: &str) -> Value {
        json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        })
    }

    /// Extract the answer from a `generateContent` response: the first
    /// non-thought text part of the first candidate.
    ///
    /// Returns `None` when there are no candidates or no text parts.
    pub fn extract_text(response: &Value) -> Option<String> {
        let parts = response["candidates"][0]["content"]["parts"].as_array()?;
        parts
            .iter()
            .filter(|p| !p["thought"].as_bool().unwrap_or(false))
            .find_map(|p| p["text"].as_str())
            .map(String::from)
    }

    /// Full API URL for `generateContent`.
    fn api_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

// ── HTTP client ──────────────────────────────────────────────────────────────

/// HTTP client shared by the provider and the image resolver.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| MultitoolError::Config(format!("Failed to build HTTP client: {e}")))
}

// ── TextGenerator ────────────────────────────────────────────────────────────

#[async_trait]
impl TextGenerator for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = Self::build_request_body(prompt);
        debug!(model = %self.model, prompt_len = prompt.len(), "Gemini request");

        let response = self
            .client
            .post(self.api_url())
            .header("Content-Type", "application/json")
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| MultitoolError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Gemini returned an error status");
            return Err(MultitoolError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = response.json().await.map_err(|e| {
            MultitoolError::UnexpectedResponse(format!("body is not JSON: {}", e.without_url()))
        })?;

        Self::extract_text(&json).ok_or_else(|| {
            MultitoolError::UnexpectedResponse("no text in first candidate".to_string())
        })
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::collections::HashMap;

    /// Start a local stand-in for the Gemini endpoint that answers every
    /// `generateContent` call with `status` and `body`.
    async fn spawn_upstream(status: StatusCode, body: Value) -> String {
        let app = Router::new().route(
            "/models/{model}",
            post(move |Query(q): Query<HashMap<String, String>>| {
                let body = body.clone();
                async move {
                    if q.get("key").map(String::as_str) != Some("test-key") {
                        return (StatusCode::FORBIDDEN, Json(json!({"error": "bad key"})));
                    }
                    (status, Json(body))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn provider(base: &str) -> GeminiProvider {
        let client = build_client(Duration::from_secs(5)).unwrap();
        GeminiProvider::new("test-key", DEFAULT_GEMINI_MODEL, client).with_api_base(base)
    }

    #[test]
    fn test_build_request_body_shape() {
        let body = GeminiProvider::build_request_body("Hi");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Hi");
        assert_eq!(body["contents"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_extract_text_normal_response() {
        let response = json!({
            "candidates": [{ "content": { "parts": [{ "text": "Hello world" }] } }]
        });
        assert_eq!(
            GeminiProvider::extract_text(&response).as_deref(),
            Some("Hello world")
        );
    }

    #[test]
    fn test_extract_text_takes_first_part_only() {
        let response = json!({
            "candidates": [{ "content": { "parts": [
                { "text": "first" },
                { "text": "second" }
            ] } }]
        });
        assert_eq!(GeminiProvider::extract_text(&response).as_deref(), Some("first"));
    }

    #[test]
    fn test_extract_text_skips_thought_parts() {
        let response = json!({
            "candidates": [{ "content": { "parts": [
                { "text": "thinking...", "thought": true },
                { "text": "Final answer" }
            ] } }]
        });
        assert_eq!(
            GeminiProvider::extract_text(&response).as_deref(),
            Some("Final answer")
        );
    }

    #[test]
    fn test_extract_text_none_for_empty_candidates() {
        assert!(GeminiProvider::extract_text(&json!({ "candidates": [] })).is_none());
        assert!(GeminiProvider::extract_text(&json!({})).is_none());
    }

    #[test]
    fn test_api_url_format() {
        let p = provider("https://generativelanguage.googleapis.com/v1beta/");
        let url = p.api_url();
        assert_eq!(
            url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let p = provider(GEMINI_API_BASE);
        let dbg = format!("{p:?}");
        assert!(!dbg.contains("test-key"));
        assert!(dbg.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn test_generate_success() {
        let base = spawn_upstream(
            StatusCode::OK,
            json!({ "candidates": [{ "content": { "parts": [{ "text": "Negative, sadness" }] } }] }),
        )
        .await;
        let text = provider(&base).generate("prompt").await.unwrap();
        assert_eq!(text, "Negative, sadness");
    }

    #[tokio::test]
    async fn test_generate_non_success_is_upstream_error() {
        let base = spawn_upstream(
            StatusCode::TOO_MANY_REQUESTS,
            json!({ "error": { "message": "quota exhausted" } }),
        )
        .await;
        let err = provider(&base).generate("prompt").await.unwrap_err();
        match err {
            MultitoolError::Upstream { status, body } => {
                assert_eq!(status, 429);
                assert!(body.contains("quota exhausted"));
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_empty_candidates_is_unexpected() {
        let base = spawn_upstream(StatusCode::OK, json!({ "candidates": [] })).await;
        let err = provider(&base).generate("prompt").await.unwrap_err();
        assert!(matches!(err, MultitoolError::UnexpectedResponse(_)));
    }

    #[tokio::test]
    async fn test_generate_unreachable_is_transport_error() {
        // Port 9 (discard) on loopback is closed in test environments.
        let err = provider("http://127.0.0.1:9")
            .generate("prompt")
            .await
            .unwrap_err();
        assert!(matches!(err, MultitoolError::Transport(_)));
        assert!(!err.to_string().contains("test-key"));
    }
}
