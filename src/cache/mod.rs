//! Content-addressed response cache over the responses log.
//!
//! There is no separate cache file: a hit is any record in the responses log
//! whose own `(task, input)` fingerprints to the incoming request's key.

pub mod fingerprint;

pub use fingerprint::fingerprint;

use crate::logs::ResponseRecord;

/// Scan `records` in insertion order and return the first whose fingerprint
/// equals `key`. The earliest matching record wins.
pub fn find_cached<'a>(records: &'a [ResponseRecord], key: &str) -> Option<&'a ResponseRecord> {
    records
        .iter()
        .find(|r| fingerprint(r.task.as_str(), &r.input) == key)
}
