//! Record types written to the activity logs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::task::Task;

/// Outcome tag carried by response and error records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Success,
    Error,
}

/// One accepted request that reached the generation service successfully.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub task: Task,
    pub input: String,
    /// Caller-supplied `extra_params`, stored verbatim (`null` when absent).
    pub params: Option<Map<String, Value>>,
    pub timestamp: String,
}

/// A generated answer. Also the success body returned to HTTP callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub status: RecordStatus,
    pub task: Task,
    /// Original caller input (the image reference for `image_caption`).
    pub input: String,
    pub output: String,
    /// Always `false` on disk; set to `true` on the copy returned for a cache hit.
    pub cached: bool,
    pub timestamp: String,
}

impl ResponseRecord {
    pub fn success(task: Task, input: String, output: String, timestamp: String) -> Self {
        Self {
            status: RecordStatus::Success,
            task,
            input,
            output,
            cached: false,
            timestamp,
        }
    }

    /// Copy of this record flagged as served from the cache.
    pub fn as_cached(&self) -> Self {
        Self {
            cached: true,
            ..self.clone()
        }
    }
}

/// A failed request, written to the errors log only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub status: RecordStatus,
    pub message: String,
    pub task: Task,
    pub input: String,
    pub timestamp: String,
}

impl ErrorRecord {
    pub fn new(task: Task, input: String, message: String, timestamp: String) -> Self {
        Self {
            status: RecordStatus::Error,
            message,
            task,
            input,
            timestamp,
        }
    }
}

/// Current UTC time as a naive ISO-8601 string with microseconds,
/// e.g. `2026-10-18T09:15:02.123456`.
pub fn now_timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}
