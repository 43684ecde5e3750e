//! # Field Openers
//!
//! Turning [`SealedFields`] back into a [`FieldMapping`] is the issuer's
//! concern (decryption keys, envelope formats). The protocol calls a
//! [`FieldOpener`] during proof generation and treats any failure as
//! "fields unavailable".

use thiserror::Error;

use zkid_core::FieldMapping;

use crate::credential::SealedFields;

/// Failure to open a sealed field blob.
#[derive(Error, Debug)]
pub enum OpenError {
    /// The blob did not decode into a field mapping.
    #[error("sealed fields are malformed: {0}")]
    Malformed(String),

    /// The opener lacks the material needed to open the blob.
    #[error("sealed fields cannot be opened: {0}")]
    Unavailable(String),
}

/// Capability to recover field values from a credential's sealed blob.
pub trait FieldOpener: Send + Sync {
    /// Open `sealed` into its field mapping.
    fn open(&self, sealed: &SealedFields) -> Result<FieldMapping, OpenError>;
}

/// Opener for blobs produced by [`issue_plaintext`](crate::issue_plaintext):
/// the sealed bytes are the canonical JSON of the field mapping.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaintextFieldOpener;

impl FieldOpener for PlaintextFieldOpener {
    fn open(&self, sealed: &SealedFields) -> Result<FieldMapping, OpenError> {
        serde_json::from_slice(sealed.as_bytes()).map_err(|e| OpenError::Malformed(e.to_string()))
    }
}
