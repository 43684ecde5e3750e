//! # Proof Payload Codec
//!
//! The proof artifact carries the circuit inputs as an opaque
//! [`EncodedPayload`]. A [`PayloadCodec`] produces it at generation time and
//! decodes it at verification time. A real proving backend plugs in here;
//! the default [`CanonicalJsonCodec`] encodes the field mapping as RFC 8785
//! canonical JSON.
//!
//! For every well-formed mapping, `decode(encode(fields)) == fields`.
//! Decoding accepts canonical bytes only: duplicate keys, whitespace, or
//! unsorted keys would let two parsers read different inputs from one proof.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use zkid_core::{CanonicalBytes, CanonicalizationError, FieldMapping};

/// Opaque encoded circuit inputs. Travels as lowercase hex.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedPayload(#[serde(with = "zkid_crypto::hex_bytes")] Vec<u8>);

impl EncodedPayload {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Payloads carry field values; keep them out of debug output.
impl std::fmt::Debug for EncodedPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EncodedPayload({} bytes)", self.0.len())
    }
}

/// Codec failure.
#[derive(Error, Debug)]
pub enum PayloadError {
    /// Fields could not be canonicalized.
    #[error("payload encoding failed: {0}")]
    Encode(#[from] CanonicalizationError),

    /// Bytes do not decode to a field mapping.
    #[error("payload decoding failed: {0}")]
    Decode(String),
}

/// Encoding between field mappings and proof payloads.
pub trait PayloadCodec: Send + Sync {
    fn encode(&self, fields: &FieldMapping) -> Result<EncodedPayload, PayloadError>;

    fn decode(&self, payload: &EncodedPayload) -> Result<FieldMapping, PayloadError>;
}

/// Canonical JSON codec (RFC 8785 via `CanonicalBytes`).
#[derive(Debug, Default, Clone, Copy)]
pub struct CanonicalJsonCodec;

impl PayloadCodec for CanonicalJsonCodec {
    fn encode(&self, fields: &FieldMapping) -> Result<EncodedPayload, PayloadError> {
        let canonical = CanonicalBytes::new(fields)?;
        Ok(EncodedPayload::new(canonical.as_bytes()))
    }

    fn decode(&self, payload: &EncodedPayload) -> Result<FieldMapping, PayloadError> {
        let fields: FieldMapping = serde_json::from_slice(payload.as_bytes())
            .map_err(|e| PayloadError::Decode(e.to_string()))?;
        let canonical =
            CanonicalBytes::new(&fields).map_err(|e| PayloadError::Decode(e.to_string()))?;
        if canonical.as_bytes() != payload.as_bytes() {
            return Err(PayloadError::Decode(
                "payload is not in canonical form".to_string(),
            ));
        }
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use zkid_core::FieldValue;

    #[test]
    fn test_encode_is_canonical() {
        let fields = FieldMapping::new().with("country", "PK").with("age", 25);
        let payload = CanonicalJsonCodec.encode(&fields).unwrap();
        assert_eq!(payload.as_bytes(), br#"{"age":25,"country":"PK"}"#);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        for bad in [&b"not json"[..], &b"[1,2]"[..], &b"{\"score\":72.5}"[..], &b""[..]] {
            assert!(matches!(
                CanonicalJsonCodec.decode(&EncodedPayload::new(bad)),
                Err(PayloadError::Decode(_))
            ));
        }
    }

    #[test]
    fn test_decode_rejects_non_canonical_bytes() {
        for bad in [
            &br#"{"age":10,"age":25}"#[..],
            &br#"{ "age" : 25 }"#[..],
            &br#"{"country":"PK","age":25}"#[..],
            &b"{\"age\":25}\n"[..],
        ] {
            assert!(matches!(
                CanonicalJsonCodec.decode(&EncodedPayload::new(bad)),
                Err(PayloadError::Decode(_))
            ));
        }
        let ok = CanonicalJsonCodec
            .decode(&EncodedPayload::new(br#"{"age":25,"country":"PK"}"#.to_vec()))
            .unwrap();
        assert_eq!(ok.len(), 2);
    }

    #[test]
    fn test_payload_serializes_as_hex() {
        let payload = EncodedPayload::new(b"{}".to_vec());
        assert_eq!(serde_json::to_string(&payload).unwrap(), "\"7b7d\"");
        assert_eq!(format!("{payload:?}"), "EncodedPayload(2 bytes)");
    }

    fn arb_leaf() -> impl Strategy<Value = FieldValue> {
        prop_oneof![
            Just(FieldValue::Null),
            any::<bool>().prop_map(FieldValue::Bool),
            (-(1i64 << 53)..=(1i64 << 53)).prop_map(FieldValue::Integer),
            ".{0,12}".prop_map(FieldValue::Text),
        ]
    }

    fn arb_value() -> impl Strategy<Value = FieldValue> {
        arb_leaf().prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(FieldValue::List),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..4).prop_map(FieldValue::Map),
            ]
        })
    }

    fn arb_fields() -> impl Strategy<Value = FieldMapping> {
        prop::collection::btree_map("[a-z][a-z0-9_]{0,8}", arb_value(), 0..6)
            .prop_map(|m| m.into_iter().collect())
    }

    proptest! {
        #[test]
        fn test_codec_roundtrip(fields in arb_fields()) {
            let codec = CanonicalJsonCodec;
            let payload = codec.encode(&fields).unwrap();
            prop_assert_eq!(codec.decode(&payload).unwrap(), fields);
        }

        #[test]
        fn test_encoding_is_deterministic(fields in arb_fields()) {
            let codec = CanonicalJsonCodec;
            let a = codec.encode(&fields).unwrap();
            let b = codec.encode(&fields.clone()).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
