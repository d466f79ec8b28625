//! Redaction engine.
//!
//! Turns loosely-typed raw records into flat [`ExportRow`](audex_model::ExportRow)s
//! according to a [`RedactionPolicy`](audex_model::RedactionPolicy):
//!
//! 1. intersect the policy fields with the user's selection (policy order wins)
//! 2. resolve each field's effective action (full export lifts overridable fields only)
//! 3. transform values: include, hash, mask, or drop the key
//!
//! Malformed records never cause an error; missing paths become empty values.

mod engine;
mod transform;

pub use engine::{DEFAULT_BATCH_SIZE, RedactionOutcome, Redactor};
pub use transform::{
    ARRAY_DELIMITER, HASH_DISPLAY_LEN, MASK_CHAR, MAX_MASK_RUN, mask_str, resolve_path, stringify,
};
