use audex_hash::{DIGEST_HEX_LEN, HashStrategy, Hasher, checksum, digest, random_id};
use proptest::prelude::*;
use serde_json::json;

#[test]
fn checksum_ignores_key_order() {
    let a = vec![json!({"name": "Alpha", "amount": 10, "tags": {"x": 1, "y": 2}})];
    let b = vec![json!({"tags": {"y": 2, "x": 1}, "amount": 10, "name": "Alpha"})];
    assert_eq!(checksum(&a), checksum(&b));
}

#[test]
fn checksum_is_row_order_sensitive() {
    let a = vec![json!({"id": 1}), json!({"id": 2})];
    let b = vec![json!({"id": 2}), json!({"id": 1})];
    assert_ne!(checksum(&a), checksum(&b));
}

#[test]
fn checksum_of_empty_set_is_stable() {
    let empty: Vec<serde_json::Value> = Vec::new();
    assert_eq!(checksum(&empty), digest("[]"));
}

#[test]
fn default_functions_use_strong_strategy() {
    assert_eq!(digest("abc"), Hasher::strong().digest("abc"));
    assert_eq!(Hasher::default().strategy(), HashStrategy::Sha256);
    assert_ne!(random_id(), random_id());
}

proptest! {
    #[test]
    fn digest_is_deterministic(input in ".*") {
        for hasher in [Hasher::strong(), Hasher::fallback()] {
            let first = hasher.digest(&input);
            prop_assert_eq!(&first, &hasher.digest(&input));
            prop_assert_eq!(first.len(), DIGEST_HEX_LEN);
        }
    }

    #[test]
    fn fallback_never_returns_empty(input in ".+") {
        prop_assert!(!Hasher::fallback().digest(&input).is_empty());
    }
}
