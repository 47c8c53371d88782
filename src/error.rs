//! Error types for the multitool gateway.
//!
//! Library code returns [`Result<T>`]; the binary wraps these in
//! `anyhow::Error` with context at the CLI boundary.

use thiserror::Error;

/// Errors raised by the gateway core.
#[derive(Debug, Error)]
pub enum MultitoolError {
    /// The generation service answered with a non-success status.
    #[error("Gemini API error {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The generation service answered 2xx but the payload had an unexpected shape.
    #[error("Unexpected Gemini response: {0}")]
    UnexpectedResponse(String),

    /// Transport-level failure talking to the generation service.
    #[error("Gemini request failed: {0}")]
    Transport(String),

    /// Image reference could not be fetched, decoded, or written.
    #[error("Image input error: {0}")]
    InputResolution(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MultitoolError>;
