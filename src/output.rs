//! JSON rendering for transmute values.
//!
//! Used wherever a value has to become text: the `hash` filter fingerprints
//! the compact form, interpolation renders embedded objects with it, and the
//! CLI prints results.
//!
//! - **Compact output** via [`to_json()`]
//! - **Pretty output** via [`to_json_pretty()`] with 2-space indentation
//! - **Ordered** - object keys are written in insertion order
//!
//! Rendering goes through [`serde_json`], so escaping follows RFC 8259.
//!
//! # Examples
//!
//! ```
//! use transmute::Value;
//! use transmute::output::{to_json, to_json_pretty};
//!
//! let value = Value::Array(vec![Value::Integer(1), Value::from("two")]);
//!
//! assert_eq!(to_json(&value), r#"[1,"two"]"#);
//! assert_eq!(to_json_pretty(&value), "[\n  1,\n  \"two\"\n]");
//! ```

use crate::convert::value_to_json;
use crate::value::Value;

/// Converts a Value to compact JSON.
///
/// This is the serialization the `hash` filter digests, so two structurally
/// equal values with the same key order always fingerprint identically.
/// Non-finite floats render as `null`.
pub fn to_json(value: &Value) -> String {
    value_to_json(value.clone()).to_string()
}

/// Converts a Value to pretty-printed JSON with 2-space indentation.
pub fn to_json_pretty(value: &Value) -> String {
    format!("{:#}", value_to_json(value.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_and_order() {
        let mut object = indexmap::IndexMap::new();
        object.insert("z".to_string(), Value::from("a\"b\n\u{1}"));
        object.insert("a".to_string(), Value::Float(f64::NAN));
        assert_eq!(
            to_json(&Value::Object(object)),
            r#"{"z":"a\"b\n\u0001","a":null}"#
        );
    }

    #[test]
    fn test_empty_collections_stay_inline() {
        let value = Value::Array(vec![Value::Array(vec![]), Value::Object(Default::default())]);
        assert_eq!(to_json_pretty(&value), "[\n  [],\n  {}\n]");
    }
}
