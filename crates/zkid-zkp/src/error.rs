//! # Protocol Errors
//!
//! Every way a generation or verification call can fail. Failures are
//! terminal for the call and never collapse into `Ok(false)`: a proof whose
//! predicate does not hold verifies to `false`, while a proof that cannot be
//! checked at all is an error.
//!
//! [`FailureKind`] groups errors by who has to act on them. Only
//! infrastructure failures are worth retrying.

use std::time::Duration;

use thiserror::Error;

use zkid_core::{CanonicalizationError, CircuitCode, Did, ProverAddress, Purpose};

/// Ordered stages of proof verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VerificationStage {
    /// Resolve the prover address to a DID.
    ResolveDid = 1,
    /// Look up the credential by `(did, purpose)`.
    LookupCredential = 2,
    /// Credential subject equals the resolved DID.
    BindProver = 3,
    /// Credential purpose equals the requested purpose.
    BindPurpose = 4,
    /// Credential commitment equals the proof commitment.
    BindCommitment = 5,
    /// Look up the circuit by `(purpose, code)` and check its code.
    LookupCircuit = 6,
    /// Decode the proof payload into fields.
    DecodePayload = 7,
    /// Evaluate the circuit predicate.
    Evaluate = 8,
}

impl VerificationStage {
    /// 1-based position in the verification order.
    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ResolveDid => "resolve_did",
            Self::LookupCredential => "lookup_credential",
            Self::BindProver => "bind_prover",
            Self::BindPurpose => "bind_purpose",
            Self::BindCommitment => "bind_commitment",
            Self::LookupCircuit => "lookup_circuit",
            Self::DecodePayload => "decode_payload",
            Self::Evaluate => "evaluate",
        }
    }
}

impl std::fmt::Display for VerificationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External collaborator a call depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dependency {
    DidResolver,
    CredentialStore,
    ProofSigner,
    AddressRecovery,
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::DidResolver => "did resolver",
            Self::CredentialStore => "credential store",
            Self::ProofSigner => "proof signer",
            Self::AddressRecovery => "address recovery",
        })
    }
}

/// Who a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The proof does not bind to the claimed prover, purpose, or
    /// commitment, or is malformed. Retrying will not help.
    InvalidProof,
    /// A lookup or dependency failed. The same proof may verify later.
    Infrastructure,
    /// The circuit registry and the requested code disagree.
    VersionDrift,
    /// The prover could not produce a proof from its own credential.
    ProverSide,
}

/// Error returned by proof generation and verification.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// No DID is known for the prover address.
    #[error("unknown prover address {address}")]
    UnknownProver { address: ProverAddress },

    /// No credential exists for the resolved DID and purpose.
    #[error("no credential for {did} with purpose {purpose}")]
    CredentialNotFound { did: Did, purpose: Purpose },

    /// The credential returned belongs to a different subject.
    #[error("credential subject {found} does not match resolved prover {expected}")]
    ProverMismatch { expected: Did, found: Did },

    /// The credential returned was issued for a different purpose.
    #[error("credential purpose {found} does not match requested purpose {expected}")]
    PurposeMismatch { expected: Purpose, found: Purpose },

    /// The proof commitment is not the credential's commitment.
    #[error("proof commitment does not match the credential commitment")]
    CommitmentMismatch,

    /// No circuit is registered for the purpose and code.
    #[error("no circuit {code} registered for purpose {purpose}")]
    CircuitNotFound { purpose: Purpose, code: CircuitCode },

    /// The registered circuit's logic no longer matches the requested code.
    #[error("requested circuit code {requested} but registered circuit computes {actual}")]
    CircuitCodeMismatch {
        requested: CircuitCode,
        actual: CircuitCode,
    },

    /// The proof payload could not be decoded into fields.
    #[error("proof payload could not be decoded: {0}")]
    PayloadDecodeError(String),

    /// No prover address could be recovered from the signature.
    #[error("signature recovery failed: {0}")]
    SignatureRecoveryError(String),

    /// A dependency did not answer in time.
    #[error("{dependency} timed out after {timeout:?}")]
    DependencyTimeout {
        dependency: Dependency,
        timeout: Duration,
    },

    /// A dependency failed for a reason other than a missing entry.
    #[error("{dependency} unavailable: {reason}")]
    DependencyUnavailable {
        dependency: Dependency,
        reason: String,
    },

    /// The credential's sealed fields could not be opened.
    #[error("credential fields unavailable: {0}")]
    FieldsUnavailable(String),

    /// The opened fields could not be encoded as a payload.
    #[error("proof payload could not be encoded: {0}")]
    PayloadEncodeError(String),

    /// The signer refused or failed to sign the proof.
    #[error("proof signing failed: {0}")]
    SigningFailed(String),

    /// A proof body could not be canonicalized for signing or recovery.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

impl ProtocolError {
    /// Classify the failure.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::UnknownProver { .. }
            | Self::CredentialNotFound { .. }
            | Self::CircuitNotFound { .. }
            | Self::DependencyTimeout { .. }
            | Self::DependencyUnavailable { .. } => FailureKind::Infrastructure,
            Self::ProverMismatch { .. }
            | Self::PurposeMismatch { .. }
            | Self::CommitmentMismatch
            | Self::PayloadDecodeError(_)
            | Self::SignatureRecoveryError(_) => FailureKind::InvalidProof,
            Self::CircuitCodeMismatch { .. } => FailureKind::VersionDrift,
            Self::FieldsUnavailable(_)
            | Self::PayloadEncodeError(_)
            | Self::SigningFailed(_)
            | Self::Canonicalization(_) => FailureKind::ProverSide,
        }
    }

    /// Whether the same request may succeed if retried later.
    pub fn is_retryable(&self) -> bool {
        self.kind() == FailureKind::Infrastructure
    }

    /// The verification stage that produced this error, if any.
    pub fn stage(&self) -> Option<VerificationStage> {
        match self {
            Self::UnknownProver { .. } => Some(VerificationStage::ResolveDid),
            Self::CredentialNotFound { .. } => Some(VerificationStage::LookupCredential),
            Self::ProverMismatch { .. } => Some(VerificationStage::BindProver),
            Self::PurposeMismatch { .. } => Some(VerificationStage::BindPurpose),
            Self::CommitmentMismatch => Some(VerificationStage::BindCommitment),
            Self::CircuitNotFound { .. } | Self::CircuitCodeMismatch { .. } => {
                Some(VerificationStage::LookupCircuit)
            }
            Self::PayloadDecodeError(_) => Some(VerificationStage::DecodePayload),
            Self::DependencyTimeout { dependency, .. }
            | Self::DependencyUnavailable { dependency, .. } => match dependency {
                Dependency::DidResolver => Some(VerificationStage::ResolveDid),
                Dependency::CredentialStore => Some(VerificationStage::LookupCredential),
                Dependency::ProofSigner | Dependency::AddressRecovery => None,
            },
            _ => None,
        }
    }
}

/// Error building circuits or a circuit registry.
#[derive(Error, Debug)]
pub enum CircuitError {
    /// Field names must match `[a-z][a-z0-9_]*`.
    #[error("invalid predicate field name {0:?}: expected [a-z][a-z0-9_]*")]
    InvalidFieldName(String),

    /// A `between` predicate with `min > max`.
    #[error("empty range for field {field}: min {min} > max {max}")]
    EmptyRange { field: String, min: i64, max: i64 },

    /// A circuit is already registered under the same purpose and code.
    #[error("circuit {code} already registered for purpose {purpose}")]
    DuplicateCircuit { purpose: Purpose, code: CircuitCode },

    /// Computing the circuit code failed.
    #[error("circuit code computation failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A computed code did not form a valid identifier.
    #[error("invalid circuit code: {0}")]
    InvalidCode(#[from] zkid_core::ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purpose() -> Purpose {
        Purpose::new("age-check").unwrap()
    }

    #[test]
    fn test_binding_failures_are_invalid_proofs() {
        let errs = [
            ProtocolError::ProverMismatch {
                expected: Did::new("did:ex:1").unwrap(),
                found: Did::new("did:ex:2").unwrap(),
            },
            ProtocolError::PurposeMismatch {
                expected: purpose(),
                found: Purpose::new("income-check").unwrap(),
            },
            ProtocolError::CommitmentMismatch,
            ProtocolError::PayloadDecodeError("bad".into()),
            ProtocolError::SignatureRecoveryError("bad".into()),
        ];
        for err in &errs {
            assert_eq!(err.kind(), FailureKind::InvalidProof, "{err}");
            assert!(!err.is_retryable());
        }
    }

    #[test]
    fn test_lookup_failures_are_retryable() {
        let errs = [
            ProtocolError::UnknownProver {
                address: ProverAddress::new("0xabc").unwrap(),
            },
            ProtocolError::CredentialNotFound {
                did: Did::new("did:ex:1").unwrap(),
                purpose: purpose(),
            },
            ProtocolError::CircuitNotFound {
                purpose: purpose(),
                code: CircuitCode::new("AGE_GTE_18").unwrap(),
            },
            ProtocolError::DependencyTimeout {
                dependency: Dependency::DidResolver,
                timeout: Duration::from_millis(10),
            },
        ];
        for err in &errs {
            assert_eq!(err.kind(), FailureKind::Infrastructure, "{err}");
            assert!(err.is_retryable());
        }
    }

    #[test]
    fn test_code_mismatch_is_version_drift() {
        let err = ProtocolError::CircuitCodeMismatch {
            requested: CircuitCode::new("AGE_GTE_18").unwrap(),
            actual: CircuitCode::new("AGE_GTE_21").unwrap(),
        };
        assert_eq!(err.kind(), FailureKind::VersionDrift);
        assert!(!err.is_retryable());
        assert_eq!(err.stage(), Some(VerificationStage::LookupCircuit));
    }

    #[test]
    fn test_stage_numbers_follow_verification_order() {
        assert_eq!(VerificationStage::ResolveDid.number(), 1);
        assert_eq!(VerificationStage::BindPurpose.number(), 4);
        assert_eq!(VerificationStage::Evaluate.number(), 8);
        assert!(VerificationStage::BindPurpose < VerificationStage::LookupCircuit);
        assert_eq!(
            ProtocolError::CommitmentMismatch.stage(),
            Some(VerificationStage::BindCommitment)
        );
        assert_eq!(
            ProtocolError::DependencyTimeout {
                dependency: Dependency::CredentialStore,
                timeout: Duration::from_secs(1),
            }
            .stage(),
            Some(VerificationStage::LookupCredential)
        );
    }

    #[test]
    fn test_display_never_includes_commitment_values() {
        let msg = ProtocolError::CommitmentMismatch.to_string();
        assert_eq!(msg, "proof commitment does not match the credential commitment");
    }
}
