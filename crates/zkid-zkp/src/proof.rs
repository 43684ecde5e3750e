//! # Proof Artifacts
//!
//! A [`Proof`] is what a prover hands a verifier: the circuit code, the
//! encoded circuit inputs, and the commitment of the credential it was
//! generated from. It is immutable once produced.
//!
//! A [`SignedProof`] adds a signature over the canonical encoding of the
//! proof body, from which the verifier recovers the prover's address.

use serde::{Deserialize, Serialize};

use zkid_core::{CanonicalBytes, CanonicalizationError, CircuitCode, Commitment};

use crate::payload::EncodedPayload;

/// Proof artifact produced by generation and consumed by verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Code of the circuit the proof was generated for.
    pub code: CircuitCode,
    /// Encoded circuit inputs.
    pub proof: EncodedPayload,
    /// Commitment of the source credential.
    pub commitment: Commitment,
}

impl Proof {
    /// Canonical bytes of the proof, the input to signing and recovery.
    pub fn canonical_bytes(&self) -> Result<CanonicalBytes, CanonicalizationError> {
        CanonicalBytes::new(self)
    }
}

/// Opaque signature blob over a proof body. Travels as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofSignature(#[serde(with = "zkid_crypto::hex_bytes")] Vec<u8>);

impl ProofSignature {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Proof body plus a signature over its canonical encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedProof {
    pub body: Proof,
    pub signature: ProofSignature,
}
