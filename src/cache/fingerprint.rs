//! Request fingerprints used as cache keys.
//!
//! A fingerprint is the lowercase hex SHA-256 digest of `(task, input)`. The
//! input is the caller's original text: for `image_caption` that is the URL or
//! base64 string, never the decoded image, so two references that decode to
//! the same picture are distinct entries.

use sha2::{Digest, Sha256};

/// Build a deterministic fingerprint for `(task, input)`.
///
/// Uses length-prefixed encoding so no choice of separator can make two
/// distinct pairs feed the hasher the same bytes
/// (e.g. `("a_b", "c")` vs `("a", "b_c")`).
pub fn fingerprint(task: &str, input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update((task.len() as u64).to_le_bytes());
    hasher.update(task.as_bytes());
    hasher.update((input.len() as u64).to_le_bytes());
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Short prefix for log fields.
pub(crate) fn short(fingerprint: &str) -> &str {
    &fingerprint[..12.min(fingerprint.len())]
}
