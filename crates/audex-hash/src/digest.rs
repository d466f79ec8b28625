//! Digest strategies.

use serde::Serialize;
use sha2::{Digest, Sha256};
use xxhash_rust::xxh3::xxh3_128_with_seed;

use crate::canonical::canonical_json;
use crate::id;

/// Length of every full digest in hex characters.
pub const DIGEST_HEX_LEN: usize = 64;

/// Seeds for the two XXH3 lanes of the fallback digest.
const FALLBACK_SEEDS: [u64; 2] = [0x9E37_79B9_7F4A_7C15, 0xC2B2_AE3D_27D4_EB4F];

/// Which primitive backs a [`Hasher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashStrategy {
    /// SHA-256 and OS randomness.
    #[default]
    Sha256,
    /// Non-cryptographic but deterministic XXH3 (two seeded 128-bit lanes).
    ///
    /// Kept as a compatibility shim for hosts without a strong primitive.
    /// Identifiers generated under this strategy are unique within a process
    /// but not unguessable.
    Xxh3,
}

impl HashStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Xxh3 => "xxh3",
        }
    }
}

/// Stateless digest provider bound to a single strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hasher {
    strategy: HashStrategy,
}

impl Hasher {
    pub fn new(strategy: HashStrategy) -> Self {
        Self { strategy }
    }

    pub fn strong() -> Self {
        Self::new(HashStrategy::Sha256)
    }

    pub fn fallback() -> Self {
        Self::new(HashStrategy::Xxh3)
    }

    pub fn strategy(&self) -> HashStrategy {
        self.strategy
    }

    /// Lowercase hex digest of `input`, always [`DIGEST_HEX_LEN`] characters.
    pub fn digest(&self, input: &str) -> String {
        self.digest_bytes(input.as_bytes())
    }

    pub fn digest_bytes(&self, input: &[u8]) -> String {
        match self.strategy {
            HashStrategy::Sha256 => hex::encode(Sha256::digest(input)),
            HashStrategy::Xxh3 => {
                let high = xxh3_128_with_seed(input, FALLBACK_SEEDS[0]);
                let low = xxh3_128_with_seed(input, FALLBACK_SEEDS[1]);
                format!("{high:032x}{low:032x}")
            }
        }
    }

    /// First `len` hex characters of the digest.
    pub fn short_digest(&self, input: &str, len: usize) -> String {
        let mut full = self.digest(input);
        full.truncate(len.min(DIGEST_HEX_LEN));
        full
    }

    /// Digest of the canonical JSON form of `rows`.
    ///
    /// Object keys are sorted at every level, so logically identical datasets
    /// hash the same regardless of key order. Row order is significant.
    pub fn checksum<T: Serialize>(&self, rows: &[T]) -> String {
        let values: Vec<serde_json::Value> = rows
            .iter()
            .map(|row| serde_json::to_value(row).unwrap_or(serde_json::Value::Null))
            .collect();
        self.digest(&canonical_json(&serde_json::Value::Array(values)))
    }

    /// Fresh RFC 4122 version-4 identifier.
    pub fn random_id(&self) -> String {
        match self.strategy {
            HashStrategy::Sha256 => id::random_v4(),
            HashStrategy::Xxh3 => id::counter_v4(),
        }
    }
}
