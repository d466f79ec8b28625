//! Export identifiers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::{Builder, Uuid};
use xxhash_rust::xxh3::xxh3_64;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

pub(crate) fn random_v4() -> String {
    Uuid::new_v4().to_string()
}

/// Version-4 shaped identifier without OS randomness.
///
/// The low eight bytes carry a process-wide sequence number, so two calls in
/// the same process never collide. The high eight bytes mix the clock and
/// process id to spread identifiers across processes.
pub(crate) fn counter_v4() -> String {
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();

    let mut seed = Vec::with_capacity(28);
    seed.extend_from_slice(&nanos.to_le_bytes());
    seed.extend_from_slice(&std::process::id().to_le_bytes());
    seed.extend_from_slice(&sequence.to_le_bytes());
    let mix = xxh3_64(&seed);

    let mut bytes = [0u8; 16];
    bytes[..8].copy_from_slice(&mix.to_be_bytes());
    bytes[8..].copy_from_slice(&sequence.to_be_bytes());
    Builder::from_random_bytes(bytes).into_uuid().to_string()
}
