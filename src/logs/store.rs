//! Whole-file JSON log store.
//!
//! Each log is a single JSON array on disk. An append reads the full array,
//! pushes one record and rewrites the file through a temporary sibling plus
//! rename, so readers see either the old array or the old array plus the new
//! record. All three logs share one write lock; concurrent appends queue on it.
//!
//! # Layout
//!
//! ```text
//! {dir}/
//! ├── queries.json
//! ├── responses.json
//! └── errors.json
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::Result;

use super::record::ResponseRecord;

/// The three activity logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogName {
    Queries,
    Responses,
    Errors,
}

impl LogName {
    pub const ALL: [LogName; 3] = [LogName::Queries, LogName::Responses, LogName::Errors];

    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Queries => "queries.json",
            Self::Responses => "responses.json",
            Self::Errors => "errors.json",
        }
    }
}

/// Append-only store for the activity logs.
///
/// Clone is cheap; all clones share the same directory and write lock.
#[derive(Debug, Clone)]
pub struct LogStore {
    dir: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl LogStore {
    /// Open the store rooted at `dir`, creating the directory and
    /// initializing any missing log file to `[]`.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        for log in LogName::ALL {
            let path = dir.join(log.file_name());
            if fs::try_exists(&path).await? {
                continue;
            }
            debug!(path = %path.display(), "Initializing empty log");
            fs::write(&path, "[]").await?;
        }
        Ok(Self {
            dir,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Directory holding the log files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a single log file.
    pub fn path(&self, log: LogName) -> PathBuf {
        self.dir.join(log.file_name())
    }

    /// Append one record to `log`.
    ///
    /// Holds the store-wide write lock for the whole read-modify-write cycle.
    /// A log whose content does not parse as a JSON array is replaced by an
    /// array holding only the new record.
    pub async fn append<T: Serialize>(&self, log: LogName, record: &T) -> Result<()> {
        let entry = serde_json::to_value(record)?;
        let _guard = self.write_lock.lock().await;

        let path = self.path(log);
        let mut records = load_array(&path).await?;
        records.push(entry);
        let data = serde_json::to_string_pretty(&records)?;

        let tmp = self.dir.join(format!(".{}.tmp", log.file_name()));
        fs::write(&tmp, data).await?;
        fs::rename(&tmp, &path).await?;
        debug!(log = log.file_name(), len = records.len(), "Appended log record");
        Ok(())
    }

    /// Read the full sequence of `log` without taking the write lock.
    ///
    /// A missing or corrupted file reads as empty.
    pub async fn read(&self, log: LogName) -> Result<Vec<Value>> {
        load_array(&self.path(log)).await
    }

    /// Read `log` as typed records, skipping entries of a different shape.
    pub async fn read_as<T: DeserializeOwned>(&self, log: LogName) -> Result<Vec<T>> {
        let raw = self.read(log).await?;
        let total = raw.len();
        let typed: Vec<T> = raw
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect();
        if typed.len() != total {
            debug!(
                log = log.file_name(),
                skipped = total - typed.len(),
                "Skipped malformed log records"
            );
        }
        Ok(typed)
    }

    /// All response records, in insertion order.
    pub async fn responses(&self) -> Result<Vec<ResponseRecord>> {
        self.read_as(LogName::Responses).await
    }

    /// Number of records currently in `log`.
    pub async fn count(&self, log: LogName) -> Result<usize> {
        Ok(self.read(log).await?.len())
    }
}

async fn load_array(path: &Path) -> Result<Vec<Value>> {
    let data = match fs::read(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    match serde_json::from_slice::<Vec<Value>>(&data) {
        Ok(records) => Ok(records),
        Err(e) => {
            warn!(path = %path.display(), "Log file is corrupt, treating as empty: {}", e);
            Ok(Vec::new())
        }
    }
}
