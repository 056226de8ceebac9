//! Typed codec for the sorted-unique string array JSON columns used by
//! `indexer.trackers`, `decision`-adjacent collision rows, and
//! `conflict_rules.trackers`.
//!
//! Replaces runtime shape guessing (`serde_json::Value` indexing) with a
//! parser that validates the column really is a `string[]` and normalizes it
//! the same way every other tracker-set comparison in the crate does.

use cross_seed_model::normalize_trackers;
use serde_json::Value;

use crate::error::{DataError, DataResult};

/// Decode a JSON column into a normalized, sorted-unique `Vec<String>`.
///
/// # Errors
///
/// Returns [`DataError::MalformedArray`] if `value` is not a JSON array of
/// strings.
pub fn decode(value: &Value, column: &'static str) -> DataResult<Vec<String>> {
    let array = value
        .as_array()
        .ok_or(DataError::MalformedArray { column })?;
    let mut strings = Vec::with_capacity(array.len());
    for entry in array {
        let s = entry
            .as_str()
            .ok_or(DataError::MalformedArray { column })?;
        strings.push(s.to_string());
    }
    Ok(normalize_trackers(strings))
}

/// Encode a string collection as the normalized JSON array this crate
/// always stores.
#[must_use]
pub fn encode<I, S>(values: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Value::from(normalize_trackers(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_normalizes_contents() {
        let value = serde_json::json!(["B.example", "a.example", "a.example"]);
        let decoded = decode(&value, "trackers").expect("decode");
        assert_eq!(decoded, vec!["a.example", "b.example"]);
    }

    #[test]
    fn decode_rejects_non_array() {
        let value = serde_json::json!("not-an-array");
        let err = decode(&value, "trackers").expect_err("should reject");
        assert!(matches!(err, DataError::MalformedArray { column: "trackers" }));
    }

    #[test]
    fn decode_rejects_non_string_elements() {
        let value = serde_json::json!(["ok", 5]);
        let err = decode(&value, "trackers").expect_err("should reject");
        assert!(matches!(err, DataError::MalformedArray { .. }));
    }

    #[test]
    fn encode_round_trips_through_decode() {
        let encoded = encode(["Tracker.B", "tracker.a"]);
        let decoded = decode(&encoded, "trackers").expect("decode");
        assert_eq!(decoded, vec!["tracker.a", "tracker.b"]);
    }
}
