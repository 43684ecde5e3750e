//! # Commitments
//!
//! A `Commitment` binds a credential to specific (hidden) field contents.
//! The protocol treats it as an opaque, equality-comparable value: it is
//! compared, never decomposed.
//!
//! Real deployments receive commitments from an external commitment scheme.
//! [`commit_fields`] provides a salted SHA-256 reference scheme used by the
//! reference issuance path and by tests.

use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalBytes;
use crate::digest::{sha256_digest, ContentDigest};
use crate::error::{CanonicalizationError, ValidationError};
use crate::field::FieldMapping;

/// Opaque commitment value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Commitment(String);

impl Commitment {
    /// Wrap an externally produced commitment value.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyCommitment`] for an empty string.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.is_empty() {
            return Err(ValidationError::EmptyCommitment);
        }
        Ok(Self(s))
    }

    /// Commitment rendered from a content digest (`sha256:<hex>`).
    pub fn from_digest(digest: &ContentDigest) -> Self {
        Self(digest.to_string())
    }

    /// Access the commitment string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Commitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Commitment {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Commitment> for String {
    fn from(value: Commitment) -> Self {
        value.0
    }
}

#[derive(Serialize)]
struct CommitmentPreimage<'a> {
    fields: &'a FieldMapping,
    salt: &'a str,
}

/// Reference commitment: `sha256(JCS({"fields": ..., "salt": ...}))`.
///
/// The salt keeps low-entropy field sets (an age, a country code) from being
/// recovered by enumerating candidate values against the commitment.
pub fn commit_fields(fields: &FieldMapping, salt: &str) -> Result<Commitment, CanonicalizationError> {
    let canonical = CanonicalBytes::new(&CommitmentPreimage { fields, salt })?;
    Ok(Commitment::from_digest(&sha256_digest(&canonical)))
}
