//! # Canonical Serialization
//!
//! `CanonicalBytes` is the only input accepted by commitments, circuit-code
//! digests, payload encoding, and proof signatures. Its inner buffer is
//! private and [`CanonicalBytes::new`] is the only constructor.
//!
//! ## Rules
//!
//! 1. Numbers must be integers. A float anywhere in the value is rejected,
//!    since `25` and `25.0` must never commit to different bytes.
//! 2. Output is RFC 8785 (JCS) via `serde_jcs`: object keys sorted, compact
//!    separators, no trailing whitespace.
//!
//! Payload decoding relies on rule 2 being a fixed point: re-canonicalizing
//! parsed canonical output reproduces the input byte for byte.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced by JCS canonicalization of a float-free value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// `FloatRejected` if the value contains a non-integer number;
    /// `SerializationFailed` if serde cannot render it as JSON.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        reject_floats(&value)?;
        Ok(Self(serde_jcs::to_string(&value)?.into_bytes()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The canonical bytes as text. JCS output is always UTF-8.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    pub fn into_string(self) -> String {
        String::from_utf8(self.0).unwrap_or_default()
    }
}

fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Number(n) if !n.is_i64() && !n.is_u64() => Err(
            CanonicalizationError::FloatRejected(n.as_f64().unwrap_or(f64::NAN)),
        ),
        Value::Array(items) => items.iter().try_for_each(reject_floats),
        Value::Object(map) => map.values().try_for_each(reject_floats),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_sorted_at_every_depth() {
        let data = serde_json::json!({
            "outer": {"b": 2, "a": 1},
            "list": [3, 2, 1]
        });
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(cb.as_str(), r#"{"list":[3,2,1],"outer":{"a":1,"b":2}}"#);
    }

    #[test]
    fn test_float_rejected_anywhere() {
        match CanonicalBytes::new(&serde_json::json!({"score": 1.5})) {
            Err(CanonicalizationError::FloatRejected(f)) => assert_eq!(f, 1.5),
            other => panic!("expected FloatRejected, got {other:?}"),
        }
        assert!(CanonicalBytes::new(&serde_json::json!({"a": {"b": [{"c": 3.25}]}})).is_err());
    }

    #[test]
    fn test_scalars_pass_through() {
        let data = serde_json::json!({"age": -42, "big": 9999999999i64, "flag": true, "none": null});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(cb.as_str(), r#"{"age":-42,"big":9999999999,"flag":true,"none":null}"#);
    }

    #[test]
    fn test_non_object_values() {
        assert_eq!(CanonicalBytes::new(&serde_json::json!({})).unwrap().as_bytes(), b"{}");
        assert_eq!(CanonicalBytes::new(&serde_json::json!([])).unwrap().as_bytes(), b"[]");
        assert_eq!(CanonicalBytes::new(&"PK").unwrap().into_string(), "\"PK\"");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn json_value_no_floats() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| serde_json::json!(n)),
            "[a-zA-Z0-9_ ]{0,50}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,10}", inner, 0..8)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn canonical_bytes_deterministic(value in json_value_no_floats()) {
            let a = CanonicalBytes::new(&value).unwrap();
            let b = CanonicalBytes::new(&value).unwrap();
            prop_assert_eq!(a, b);
        }

        /// Parsing canonical output and canonicalizing again is a fixed point.
        #[test]
        fn canonical_bytes_idempotent(value in json_value_no_floats()) {
            let cb = CanonicalBytes::new(&value).unwrap();
            let reparsed: Value = serde_json::from_slice(cb.as_bytes()).unwrap();
            prop_assert_eq!(cb.as_str().as_bytes(), cb.as_bytes());
            prop_assert_eq!(CanonicalBytes::new(&reparsed).unwrap(), cb);
        }

        #[test]
        fn fractional_numbers_always_rejected(f in any::<f64>().prop_filter("fractional", |f| {
            f.fract() != 0.0 && f.is_finite()
        })) {
            let value = serde_json::json!({"val": f});
            prop_assert!(CanonicalBytes::new(&value).is_err());
        }
    }
}
