//! Text-generation providers.
//!
//! The gateway only needs one capability from a provider: turn a prompt into
//! text. [`TextGenerator`] is that seam; [`GeminiProvider`] is the production
//! implementation and tests plug in stubs.

pub mod gemini;

pub use gemini::GeminiProvider;

use async_trait::async_trait;

use crate::error::Result;

/// A synchronous request/response text generator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for `prompt`. A single attempt; no retries.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Short provider name for logs.
    fn name(&self) -> &str;
}
