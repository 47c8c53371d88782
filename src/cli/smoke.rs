//! `multitool smoke`: fire the sample requests at a running gateway.
//!
//! Each case is independent; a connection failure is printed and the run
//! moves on to the next case.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::time::Duration;

const SAMPLE_IMAGE_URL: &str =
    "https://upload.wikimedia.org/wikipedia/commons/thumb/a/a9/Example.jpg/800px-Example.jpg";

/// Non-JSON bodies are truncated to this many characters when printed.
const RAW_PREVIEW_CHARS: usize = 300;

/// One canned request.
#[derive(Debug, Clone, PartialEq)]
pub struct SmokeCase {
    pub name: &'static str,
    pub payload: Value,
}

/// The sample requests, in the order they are sent.
pub fn smoke_cases() -> Vec<SmokeCase> {
    vec![
        SmokeCase {
            name: "Code Explain",
            payload: json!({
                "task": "code_explain",
                "input": "def greet():\n    print('Hello, AI!')"
            }),
        },
        SmokeCase {
            name: "Idea Generator",
            payload: json!({
                "task": "idea_generator",
                "input": "mental health, app, students"
            }),
        },
        SmokeCase {
            name: "Tone Detector",
            payload: json!({
                "task": "tone_detector",
                "input": "I'm absolutely devastated by the outcome."
            }),
        },
        SmokeCase {
            name: "Image Caption (URL)",
            payload: json!({
                "task": "image_caption",
                "input": SAMPLE_IMAGE_URL
            }),
        },
        SmokeCase {
            name: "Invalid Task",
            payload: json!({
                "task": "invalid_task",
                "input": "this should fail"
            }),
        },
        SmokeCase {
            name: "Empty Input",
            payload: json!({
                "task": "code_explain",
                "input": ""
            }),
        },
    ]
}

/// Render a response body: pretty JSON when it parses, otherwise the first
/// few hundred characters.
pub fn render_body(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(v) => serde_json::to_string_pretty(&v).unwrap_or_else(|_| body.to_string()),
        Err(_) => {
            let preview: String = body.chars().take(RAW_PREVIEW_CHARS).collect();
            format!("Non-JSON response: {preview}")
        }
    }
}

pub async fn cmd_smoke(base_url: &str) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .context("Failed to build HTTP client")?;
    let url = format!("{}/ai-multitool", base_url.trim_end_matches('/'));

    for case in smoke_cases() {
        println!("=== {} ===", case.name);
        match client.post(&url).json(&case.payload).send().await {
            Ok(resp) => {
                println!("Status: {}", resp.status().as_u16());
                let body = resp.text().await.unwrap_or_default();
                println!("{}", render_body(&body));
            }
            Err(e) => println!("Request failed: {e}"),
        }
        println!();
    }
    Ok(())
}
