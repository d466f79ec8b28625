//! Hashing and identity utilities for audited exports.
//!
//! - [`Hasher::digest`]: deterministic 64-hex-character digest, no salt
//! - [`Hasher::checksum`]: digest of a canonical (key-sorted) JSON serialization
//! - [`Hasher::random_id`]: RFC 4122 version-4 identifier
//!
//! The strategy (strong SHA-256 or the XXH3 compatibility fallback) is chosen
//! once when the [`Hasher`] is built. Both produce the same output shape so
//! callers never branch on it.
//!
//! # Example
//!
//! ```
//! use audex_hash::Hasher;
//!
//! let hasher = Hasher::default();
//! let a = hasher.digest("plan-42");
//! assert_eq!(a.len(), 64);
//! assert_eq!(a, hasher.digest("plan-42"));
//! ```

mod canonical;
mod digest;
mod id;

pub use canonical::canonical_json;
pub use digest::{DIGEST_HEX_LEN, HashStrategy, Hasher};

/// Digest `input` with the default (strong) strategy.
pub fn digest(input: &str) -> String {
    Hasher::default().digest(input)
}

/// Checksum a row set with the default (strong) strategy.
pub fn checksum<T: serde::Serialize>(rows: &[T]) -> String {
    Hasher::default().checksum(rows)
}

/// Fresh version-4 identifier from the default (strong) strategy.
pub fn random_id() -> String {
    Hasher::default().random_id()
}
