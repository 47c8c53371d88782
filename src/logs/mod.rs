//! Append-only JSON activity logs: queries, responses and errors.

pub mod record;
pub mod store;

pub use record::{now_timestamp, ErrorRecord, QueryRecord, RecordStatus, ResponseRecord};
pub use store::{LogName, LogStore};
