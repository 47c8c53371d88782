//! Request orchestration: fingerprint → cache check → generate → persist.
//!
//! ```text
//! Received ─► CacheCheck ─┬─► CacheHit                    (return, no writes)
//!                         └─► Generating ─┬─► Persisted   (queries + responses)
//!                                         └─► Failed      (errors only)
//! ```
//!
//! Nothing here retries; a single upstream failure is returned as-is.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::cache::{find_cached, fingerprint, fingerprint::short};
use crate::config::Config;
use crate::error::{MultitoolError, Result};
use crate::logs::{now_timestamp, ErrorRecord, LogName, LogStore, QueryRecord, ResponseRecord};
use crate::media::ImageResolver;
use crate::providers::gemini::{build_client, GeminiProvider};
use crate::providers::TextGenerator;
use crate::task::Task;

// ── Request ──────────────────────────────────────────────────────────────────

/// A validated gateway request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultitoolRequest {
    pub task: Task,
    /// Text, or for `image_caption` an image URL / base64 payload.
    pub input: String,
    /// Free-form caller parameters, recorded in the queries log only. Must be
    /// a JSON object when present.
    #[serde(default)]
    pub extra_params: Option<Map<String, Value>>,
}

impl MultitoolRequest {
    pub fn new(task: Task, input: impl Into<String>) -> Self {
        Self {
            task,
            input: input.into(),
            extra_params: None,
        }
    }

    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.extra_params = Some(params);
        self
    }
}

// ── Outcome ──────────────────────────────────────────────────────────────────

/// Why a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Generation service error status, bad payload, or transport failure.
    Upstream,
    /// Image reference could not be fetched or decoded.
    InputResolution,
    /// Local disk write failed.
    Storage,
}

/// Typed failure surfaced to in-process callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub detail: String,
}

impl From<&MultitoolError> for Failure {
    fn from(err: &MultitoolError) -> Self {
        let kind = match err {
            MultitoolError::Upstream { .. }
            | MultitoolError::UnexpectedResponse(_)
            | MultitoolError::Transport(_) => FailureKind::Upstream,
            MultitoolError::InputResolution(_) => FailureKind::InputResolution,
            MultitoolError::Io(_) | MultitoolError::Json(_) | MultitoolError::Config(_) => {
                FailureKind::Storage
            }
        };
        Self {
            kind,
            detail: err.to_string(),
        }
    }
}

/// Terminal state of one request.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Served from the responses log; `cached` is `true`.
    CacheHit(ResponseRecord),
    /// Freshly generated and persisted; `cached` is `false`.
    Generated(ResponseRecord),
    /// Generation failed; `record` was appended to the errors log.
    Failed { failure: Failure, record: ErrorRecord },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// The success record, if any.
    pub fn response(&self) -> Option<&ResponseRecord> {
        match self {
            Self::CacheHit(r) | Self::Generated(r) => Some(r),
            Self::Failed { .. } => None,
        }
    }
}

// ── Gateway ──────────────────────────────────────────────────────────────────

/// The gateway core. Shared across request handlers behind an `Arc`.
pub struct Gateway {
    store: LogStore,
    generator: Arc<dyn TextGenerator>,
    images: ImageResolver,
}

impl Gateway {
    pub fn new(store: LogStore, generator: Arc<dyn TextGenerator>, images: ImageResolver) -> Self {
        Self {
            store,
            generator,
            images,
        }
    }

    /// Assemble the production gateway: open the log store under the cache
    /// directory and wire a Gemini provider and image resolver onto one
    /// HTTP client carrying the upstream timeout.
    pub async fn from_config(config: &Config, api_key: &str) -> Result<Self> {
        let store = LogStore::open(config.storage.logs_dir()).await?;
        let client = build_client(config.gemini.timeout())?;
        let provider = GeminiProvider::new(api_key, &config.gemini.model, client.clone())
            .with_api_base(&config.gemini.api_base);
        let images = ImageResolver::new(config.storage.images_dir(), client);
        tokio::fs::create_dir_all(images.images_dir()).await?;
        info!(
            logs = %store.dir().display(),
            model = provider.model(),
            "Gateway initialized"
        );
        Ok(Self::new(store, Arc::new(provider), images))
    }

    pub fn store(&self) -> &LogStore {
        &self.store
    }

    /// Run one request to a terminal state.
    pub async fn handle(&self, request: &MultitoolRequest) -> Outcome {
        let timestamp = now_timestamp();
        let key = fingerprint(request.task.as_str(), &request.input);

        if let Some(hit) = self.lookup(&key).await {
            info!(task = %request.task, fingerprint = short(&key), "Cache hit");
            return Outcome::CacheHit(hit.as_cached());
        }

        match self.generate_and_persist(request, &timestamp).await {
            Ok(response) => {
                info!(
                    task = %request.task,
                    fingerprint = short(&key),
                    provider = self.generator.name(),
                    "Generated response"
                );
                Outcome::Generated(response)
            }
            Err(err) => {
                let failure = Failure::from(&err);
                warn!(task = %request.task, kind = ?failure.kind, "Request failed: {}", err);
                let record = ErrorRecord::new(
                    request.task,
                    request.input.clone(),
                    err.to_string(),
                    timestamp,
                );
                if let Err(e) = self.store.append(LogName::Errors, &record).await {
                    error!("Failed to write errors log: {}", e);
                }
                Outcome::Failed { failure, record }
            }
        }
    }

    /// Earliest response record matching `key`. Reads without the write lock,
    /// so an append racing this scan may or may not be seen.
    async fn lookup(&self, key: &str) -> Option<ResponseRecord> {
        match self.store.responses().await {
            Ok(records) => find_cached(&records, key).cloned(),
            Err(e) => {
                warn!("Cache scan failed, treating as miss: {}", e);
                None
            }
        }
    }

    async fn generate_and_persist(
        &self,
        request: &MultitoolRequest,
        timestamp: &str,
    ) -> Result<ResponseRecord> {
        let prompt_input = if request.task.needs_image() {
            self.images
                .resolve(&request.input)
                .await?
                .display()
                .to_string()
        } else {
            request.input.clone()
        };
        let prompt = request.task.prompt(&prompt_input);
        debug!(task = %request.task, prompt_len = prompt.len(), "Dispatching prompt");

        let output = self.generator.generate(&prompt).await?;

        let response = ResponseRecord::success(
            request.task,
            request.input.clone(),
            output,
            timestamp.to_string(),
        );
        let query = QueryRecord {
            task: request.task,
            input: request.input.clone(),
            params: request.extra_params.clone(),
            timestamp: timestamp.to_string(),
        };
        self.store.append(LogName::Queries, &query).await?;
        self.store.append(LogName::Responses, &response).await?;
        Ok(response)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
