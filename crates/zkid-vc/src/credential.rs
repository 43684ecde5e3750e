//! # Credential Records
//!
//! A [`Credential`] binds a subject DID, a purpose tag, and a commitment to
//! a sealed blob of field values. The proof protocol only ever reads
//! credentials; it never mutates or re-issues them.
//!
//! ## Sealed Fields
//!
//! [`SealedFields`] is opaque at this layer. How the blob is produced
//! (encryption at rest, envelope formats) belongs to the issuer; a
//! [`FieldOpener`](crate::opener::FieldOpener) turns it back into a
//! [`FieldMapping`] when a proof is generated.
//!
//! On the wire the blob travels as a lowercase hex string.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use zkid_core::{
    commit_fields, CanonicalBytes, CanonicalizationError, Commitment, Did, FieldMapping, Purpose,
    Timestamp,
};

/// Opaque sealed field blob ("encryptedFields").
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedFields(#[serde(with = "zkid_crypto::hex_bytes")] Vec<u8>);

impl SealedFields {
    /// Wrap raw sealed bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Access the sealed bytes.
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

// Sealed contents never appear in logs, only their size.
impl std::fmt::Debug for SealedFields {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SealedFields({} bytes)", self.0.len())
    }
}

/// A credential as held by a credential store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Subject the credential was issued to.
    pub did: Did,
    /// Purpose tag the credential was issued for.
    pub purpose: Purpose,
    /// Commitment to the hidden field contents.
    pub commitment: Commitment,
    /// Sealed field values.
    pub sealed_fields: SealedFields,
    /// Issuance time.
    pub issued_at: Timestamp,
}

impl Credential {
    /// Assemble a credential issued now.
    pub fn new(
        did: Did,
        purpose: Purpose,
        commitment: Commitment,
        sealed_fields: SealedFields,
    ) -> Self {
        Self {
            did,
            purpose,
            commitment,
            sealed_fields,
            issued_at: Timestamp::now(),
        }
    }

    /// Override the issuance time.
    pub fn with_issued_at(mut self, issued_at: Timestamp) -> Self {
        self.issued_at = issued_at;
        self
    }
}

/// Errors from the reference issuance helper.
#[derive(Error, Debug)]
pub enum IssueError {
    /// The field mapping could not be canonicalized.
    #[error("failed to canonicalize credential fields: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

/// Issue a credential whose sealed blob is the canonical JSON of `fields`
/// and whose commitment is [`commit_fields`] over the same fields.
///
/// Pairs with [`PlaintextFieldOpener`](crate::opener::PlaintextFieldOpener).
/// Production issuers seal with real encryption and an external commitment
/// scheme; this helper exists for fixtures, the CLI, and tests.
pub fn issue_plaintext(
    did: Did,
    purpose: Purpose,
    fields: &FieldMapping,
    salt: &str,
) -> Result<Credential, IssueError> {
    let commitment = commit_fields(fields, salt)?;
    let sealed = CanonicalBytes::new(fields)?;
    tracing::debug!(did = %did, purpose = %purpose, fields = fields.len(), "issued plaintext credential");
    Ok(Credential::new(
        did,
        purpose,
        commitment,
        SealedFields::new(sealed.as_bytes()),
    ))
}
