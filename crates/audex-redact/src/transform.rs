//! Per-value transformations.

use serde_json::{Number, Value};

use audex_hash::Hasher;
use audex_model::CellValue;

/// Hex characters kept from a digest for hashed fields.
pub const HASH_DISPLAY_LEN: usize = 16;

/// Character used to hide interior characters of masked fields.
pub const MASK_CHAR: char = '*';

/// Maximum number of mask characters emitted for the interior of a value.
pub const MAX_MASK_RUN: usize = 8;

/// Separator used when flattening arrays into a single cell.
pub const ARRAY_DELIMITER: &str = ", ";

/// Largest integer magnitude an `f64` holds without rounding (2^53).
pub const MAX_EXACT_INTEGER: u64 = 1 << 53;

/// Resolve a dot-path such as `contact.email` or `tags.0` inside a record.
///
/// Missing segments resolve to `None` instead of failing.
pub fn resolve_path<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = record;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Flatten a raw value to the string form used for hashing and masking.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(stringify)
            .collect::<Vec<_>>()
            .join(ARRAY_DELIMITER),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Pass-through conversion to a flat cell.
pub fn include_value(value: Option<&Value>) -> CellValue {
    match value {
        None | Some(Value::Null) => CellValue::Text(String::new()),
        Some(Value::Bool(flag)) => CellValue::Bool(*flag),
        Some(Value::Number(number)) => number_cell(number),
        Some(Value::String(text)) => CellValue::Text(text.clone()),
        Some(other) => CellValue::Text(stringify(other)),
    }
}

/// Integers beyond [`MAX_EXACT_INTEGER`] keep their digits as text.
fn number_cell(number: &Number) -> CellValue {
    let magnitude = number
        .as_i64()
        .map(i64::unsigned_abs)
        .or_else(|| number.as_u64());
    match (magnitude, number.as_f64()) {
        (Some(magnitude), _) if magnitude > MAX_EXACT_INTEGER => {
            CellValue::Text(number.to_string())
        }
        (_, Some(float)) => CellValue::Number(float),
        (_, None) => CellValue::Text(number.to_string()),
    }
}

/// Truncated digest of the stringified value. Empty input stays empty.
pub fn hash_value(hasher: &Hasher, value: Option<&Value>) -> CellValue {
    let raw = value.map(stringify).unwrap_or_default();
    if raw.is_empty() {
        return CellValue::Text(String::new());
    }
    CellValue::Text(hasher.short_digest(&raw, HASH_DISPLAY_LEN))
}

pub fn mask_value(value: Option<&Value>) -> CellValue {
    CellValue::Text(mask_str(&value.map(stringify).unwrap_or_default()))
}

/// Keep the first and last character and hide up to [`MAX_MASK_RUN`]
/// interior characters. Values of one or two characters become a
/// two-character mask; empty values stay empty.
pub fn mask_str(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    match chars.as_slice() {
        [] => String::new(),
        [_] | [_, _] => MASK_CHAR.to_string().repeat(2),
        [first, interior @ .., last] => {
            let mut out = String::with_capacity(raw.len());
            out.push(*first);
            for _ in 0..interior.len().min(MAX_MASK_RUN) {
                out.push(MASK_CHAR);
            }
            out.push(*last);
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_nested_paths() {
        let record = json!({"contact": {"email": "a@b.c"}, "tags": ["x", "y"]});
        assert_eq!(resolve_path(&record, "contact.email"), Some(&json!("a@b.c")));
        assert_eq!(resolve_path(&record, "tags.1"), Some(&json!("y")));
        assert_eq!(resolve_path(&record, "contact.phone"), None);
        assert_eq!(resolve_path(&record, "tags.x"), None);
        assert_eq!(resolve_path(&record, "contact.email.domain"), None);
    }

    #[test]
    fn include_flattens_structures() {
        assert_eq!(include_value(None), CellValue::text(""));
        assert_eq!(include_value(Some(&json!(null))), CellValue::text(""));
        assert_eq!(include_value(Some(&json!(3))), CellValue::Number(3.0));
        assert_eq!(include_value(Some(&json!(true))), CellValue::Bool(true));
        assert_eq!(
            include_value(Some(&json!(["a", 1, true]))),
            CellValue::text("a, 1, true")
        );
        assert_eq!(
            include_value(Some(&json!({"k": "v"}))),
            CellValue::text(r#"{"k":"v"}"#)
        );
    }

    #[test]
    fn include_keeps_large_integers_exact() {
        assert_eq!(
            include_value(Some(&json!(9_007_199_254_740_993_i64))),
            CellValue::text("9007199254740993")
        );
        assert_eq!(
            include_value(Some(&json!(-9_007_199_254_740_993_i64))),
            CellValue::text("-9007199254740993")
        );
        assert_eq!(
            include_value(Some(&json!(u64::MAX))),
            CellValue::text("18446744073709551615")
        );
        assert_eq!(
            include_value(Some(&json!(9_007_199_254_740_992_i64))),
            CellValue::Number(9_007_199_254_740_992.0)
        );
        assert_eq!(include_value(Some(&json!(-1.5))), CellValue::Number(-1.5));
    }

    #[test]
    fn mask_examples() {
        assert_eq!(mask_str(""), "");
        assert_eq!(mask_str("a"), "**");
        assert_eq!(mask_str("ab"), "**");
        assert_eq!(mask_str("abc"), "a*c");
        assert_eq!(mask_str("jane@example.com"), "j********m");
        assert_eq!(mask_str("ünïcode"), "ü*****e");
    }

    #[test]
    fn hash_of_empty_is_empty() {
        let hasher = Hasher::strong();
        assert_eq!(hash_value(&hasher, None), CellValue::text(""));
        assert_eq!(hash_value(&hasher, Some(&json!(""))), CellValue::text(""));
        assert_eq!(hash_value(&hasher, Some(&json!(null))), CellValue::text(""));
    }

    #[test]
    fn hash_stringifies_numbers() {
        let hasher = Hasher::strong();
        assert_eq!(
            hash_value(&hasher, Some(&json!(42))),
            hash_value(&hasher, Some(&json!("42")))
        );
    }
}
