//! # Proof Protocol
//!
//! Proof generation and the verification trust chain.
//!
//! ## Generation
//!
//! 1. Look up the circuit by the credential's purpose and the requested code.
//! 2. Require the circuit's computed code to equal the requested code.
//! 3. Open the sealed fields, encode them, and package
//!    `{ code, proof, commitment }`.
//!
//! ## Verification
//!
//! Stages run in a fixed order and the first failure ends the call:
//!
//! 1. Resolve the prover address to a DID.
//! 2. Look up the credential by `(did, purpose)`.
//! 3. The credential's subject is the resolved DID.
//! 4. The credential's purpose is the requested purpose.
//! 5. The credential's commitment is the proof's commitment.
//! 6. Look up the circuit by `(purpose, proof.code)` and require its logic
//!    to still compute `proof.code`.
//! 7. Decode the payload.
//! 8. Evaluate the circuit.
//!
//! Stages 3 to 5 re-check what the credential store returned, so a store
//! that hands back the wrong record cannot make a proof verify. The circuit
//! is only looked up after every binding holds.
//!
//! ## Concurrency
//!
//! `ProofProtocol` holds only shared read-only collaborators, so one
//! instance behind an `Arc` serves any number of concurrent calls. Each
//! async collaborator call is bounded by the configured timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use zkid_core::{CircuitCode, Did, ProverAddress, Purpose};
use zkid_vc::{Credential, CredentialStore, FieldOpener, PlaintextFieldOpener, StoreError};

use crate::config::ProtocolConfig;
use crate::error::{Dependency, ProtocolError, VerificationStage};
use crate::payload::{CanonicalJsonCodec, PayloadCodec};
use crate::proof::{Proof, SignedProof};
use crate::registry::CircuitSource;
use crate::resolver::{DidResolver, ResolveError};
use crate::signing::{AddressRecovery, ProofSigner, SignatureError};

/// One entry of a batch verification.
#[derive(Debug, Clone)]
pub struct VerificationRequest {
    pub proof: Proof,
    pub prover: ProverAddress,
    pub purpose: Purpose,
}

/// Proof generation and verification over injected collaborators.
#[derive(Clone)]
pub struct ProofProtocol {
    circuits: Arc<dyn CircuitSource>,
    resolver: Arc<dyn DidResolver>,
    credentials: Arc<dyn CredentialStore>,
    codec: Arc<dyn PayloadCodec>,
    opener: Arc<dyn FieldOpener>,
    config: ProtocolConfig,
}

impl std::fmt::Debug for ProofProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProofProtocol")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ProofProtocol {
    /// Protocol with the canonical JSON codec, the plaintext field opener,
    /// and default timeouts.
    pub fn new(
        circuits: Arc<dyn CircuitSource>,
        resolver: Arc<dyn DidResolver>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            circuits,
            resolver,
            credentials,
            codec: Arc::new(CanonicalJsonCodec),
            opener: Arc::new(PlaintextFieldOpener),
            config: ProtocolConfig::default(),
        }
    }

    pub fn with_codec(mut self, codec: Arc<dyn PayloadCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_opener(mut self, opener: Arc<dyn FieldOpener>) -> Self {
        self.opener = opener;
        self
    }

    pub fn with_config(mut self, config: ProtocolConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    // -- Generation --

    /// Generate a proof that `credential` satisfies the circuit `code`.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::CircuitNotFound`] if no circuit is filed under the
    ///   credential's purpose and `code`.
    /// - [`ProtocolError::CircuitCodeMismatch`] if the filed circuit's logic
    ///   no longer computes `code`.
    /// - [`ProtocolError::FieldsUnavailable`] or
    ///   [`ProtocolError::PayloadEncodeError`] if the inputs cannot be
    ///   prepared.
    pub fn generate(
        &self,
        credential: &Credential,
        code: &CircuitCode,
    ) -> Result<Proof, ProtocolError> {
        let circuit = self
            .circuits
            .lookup(&credential.purpose, code)
            .ok_or_else(|| ProtocolError::CircuitNotFound {
                purpose: credential.purpose.clone(),
                code: code.clone(),
            })?;

        if circuit.code() != code {
            tracing::warn!(
                purpose = %credential.purpose,
                requested = %code,
                actual = %circuit.code(),
                "circuit code drift"
            );
            return Err(ProtocolError::CircuitCodeMismatch {
                requested: code.clone(),
                actual: circuit.code().clone(),
            });
        }

        let fields = self
            .opener
            .open(&credential.sealed_fields)
            .map_err(|e| ProtocolError::FieldsUnavailable(e.to_string()))?;
        let payload = self
            .codec
            .encode(&fields)
            .map_err(|e| ProtocolError::PayloadEncodeError(e.to_string()))?;

        tracing::debug!(purpose = %credential.purpose, code = %code, "proof generated");
        Ok(Proof {
            code: code.clone(),
            proof: payload,
            commitment: credential.commitment.clone(),
        })
    }

    /// Generate a proof and sign its canonical encoding.
    pub async fn generate_signed(
        &self,
        credential: &Credential,
        code: &CircuitCode,
        signer: &dyn ProofSigner,
    ) -> Result<SignedProof, ProtocolError> {
        let body = self.generate(credential, code)?;
        let message = body.canonical_bytes()?;
        let signature = bounded(
            Dependency::ProofSigner,
            self.config.signing_timeout,
            signer.sign(&message),
        )
        .await?
        .map_err(|e| match e {
            SignatureError::Unavailable(reason) => ProtocolError::DependencyUnavailable {
                dependency: Dependency::ProofSigner,
                reason,
            },
            other => ProtocolError::SigningFailed(other.to_string()),
        })?;
        Ok(SignedProof { body, signature })
    }

    // -- Verification --

    /// Verify `proof` for the prover at `prover` and the given purpose.
    ///
    /// Returns `Ok(false)` only when every check passes and the predicate
    /// does not hold. Every other failure is an error.
    pub async fn verify(
        &self,
        proof: &Proof,
        prover: &ProverAddress,
        purpose: &Purpose,
    ) -> Result<bool, ProtocolError> {
        let result = self.run_stages(proof, prover, purpose).await;
        match &result {
            Ok(holds) => {
                tracing::debug!(purpose = %purpose, code = %proof.code, holds = *holds, "proof verified")
            }
            Err(err) => tracing::warn!(
                purpose = %purpose,
                code = %proof.code,
                stage = err.stage().map(VerificationStage::as_str),
                kind = ?err.kind(),
                error = %err,
                "proof rejected"
            ),
        }
        result
    }

    async fn run_stages(
        &self,
        proof: &Proof,
        prover: &ProverAddress,
        purpose: &Purpose,
    ) -> Result<bool, ProtocolError> {
        let did = self.resolve(prover).await?;
        tracing::debug!(stage = %VerificationStage::ResolveDid, did = %did);

        let credential = self.lookup_credential(&did, purpose).await?;
        tracing::debug!(stage = %VerificationStage::LookupCredential, did = %did);

        if credential.did != did {
            return Err(ProtocolError::ProverMismatch {
                expected: did,
                found: credential.did,
            });
        }
        if &credential.purpose != purpose {
            return Err(ProtocolError::PurposeMismatch {
                expected: purpose.clone(),
                found: credential.purpose,
            });
        }
        if credential.commitment != proof.commitment {
            return Err(ProtocolError::CommitmentMismatch);
        }
        tracing::debug!(stage = %VerificationStage::BindCommitment, "credential bindings hold");

        let circuit = self.circuits.lookup(purpose, &proof.code).ok_or_else(|| {
            ProtocolError::CircuitNotFound {
                purpose: purpose.clone(),
                code: proof.code.clone(),
            }
        })?;
        if circuit.code() != &proof.code {
            return Err(ProtocolError::CircuitCodeMismatch {
                requested: proof.code.clone(),
                actual: circuit.code().clone(),
            });
        }
        tracing::debug!(stage = %VerificationStage::LookupCircuit, code = %proof.code);

        let fields = self
            .codec
            .decode(&proof.proof)
            .map_err(|e| ProtocolError::PayloadDecodeError(e.to_string()))?;
        tracing::debug!(stage = %VerificationStage::DecodePayload, fields = fields.len());

        Ok(circuit.evaluate(&fields))
    }

    /// Recover the prover address from the signature, then [`verify`](Self::verify).
    pub async fn verify_signed(
        &self,
        signed: &SignedProof,
        purpose: &Purpose,
        recovery: &dyn AddressRecovery,
    ) -> Result<bool, ProtocolError> {
        let message = signed.body.canonical_bytes()?;
        let prover = bounded(
            Dependency::AddressRecovery,
            self.config.signing_timeout,
            recovery.recover_address(&message, &signed.signature),
        )
        .await?
        .map_err(|e| match e {
            SignatureError::Unavailable(reason) => ProtocolError::DependencyUnavailable {
                dependency: Dependency::AddressRecovery,
                reason,
            },
            other => ProtocolError::SignatureRecoveryError(other.to_string()),
        })?;
        tracing::debug!(prover = %prover, "prover address recovered");
        self.verify(&signed.body, &prover, purpose).await
    }

    /// Verify independent requests concurrently. Results keep input order.
    pub async fn verify_all(
        &self,
        requests: &[VerificationRequest],
    ) -> Vec<Result<bool, ProtocolError>> {
        futures::future::join_all(
            requests
                .iter()
                .map(|r| self.verify(&r.proof, &r.prover, &r.purpose)),
        )
        .await
    }

    async fn resolve(&self, prover: &ProverAddress) -> Result<Did, ProtocolError> {
        bounded(
            Dependency::DidResolver,
            self.config.resolve_timeout,
            self.resolver.resolve_did(prover),
        )
        .await?
        .map_err(|e| match e {
            ResolveError::Unknown(address) => ProtocolError::UnknownProver { address },
            ResolveError::Unavailable(reason) => ProtocolError::DependencyUnavailable {
                dependency: Dependency::DidResolver,
                reason,
            },
        })
    }

    async fn lookup_credential(
        &self,
        did: &Did,
        purpose: &Purpose,
    ) -> Result<Credential, ProtocolError> {
        bounded(
            Dependency::CredentialStore,
            self.config.resolve_timeout,
            self.credentials.lookup_credential(did, purpose),
        )
        .await?
        .map_err(|e| match e {
            StoreError::NotFound { .. } => ProtocolError::CredentialNotFound {
                did: did.clone(),
                purpose: purpose.clone(),
            },
            StoreError::Unavailable(reason) => ProtocolError::DependencyUnavailable {
                dependency: Dependency::CredentialStore,
                reason,
            },
            other @ StoreError::Duplicate { .. } => ProtocolError::DependencyUnavailable {
                dependency: Dependency::CredentialStore,
                reason: other.to_string(),
            },
        })
    }
}

/// Run a collaborator call under a timeout.
async fn bounded<T>(
    dependency: Dependency,
    timeout: Duration,
    call: impl Future<Output = T>,
) -> Result<T, ProtocolError> {
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| ProtocolError::DependencyTimeout {
            dependency,
            timeout,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Circuit;
    use crate::predicate::Predicate;
    use crate::registry::CircuitRegistry;
    use crate::resolver::InMemoryDidResolver;
    use zkid_core::{Commitment, FieldMapping};
    use zkid_vc::{issue_plaintext, InMemoryCredentialStore, SealedFields};

    fn did() -> Did {
        Did::new("did:ex:1").unwrap()
    }

    fn address() -> ProverAddress {
        ProverAddress::new("0xprover1").unwrap()
    }

    fn age_check() -> Purpose {
        Purpose::new("age-check").unwrap()
    }

    fn code() -> CircuitCode {
        CircuitCode::new("AGE_GTE_18").unwrap()
    }

    fn protocol_with(credential: Credential) -> ProofProtocol {
        let mut registry = CircuitRegistry::new();
        registry
            .register(Circuit::new(age_check(), Predicate::at_least("age", 18)).unwrap())
            .unwrap();
        let resolver: InMemoryDidResolver = [(address(), did())].into_iter().collect();
        let store = InMemoryCredentialStore::from_credentials([credential]).unwrap();
        ProofProtocol::new(Arc::new(registry), Arc::new(resolver), Arc::new(store))
    }

    fn credential(age: i64) -> Credential {
        issue_plaintext(did(), age_check(), &FieldMapping::new().with("age", age), "salt").unwrap()
    }

    #[test]
    fn test_protocol_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProofProtocol>();
    }

    #[test]
    fn test_generate_binds_commitment_and_code() {
        let cred = credential(25);
        let protocol = protocol_with(cred.clone());
        let proof = protocol.generate(&cred, &code()).unwrap();
        assert_eq!(proof.commitment, cred.commitment);
        assert_eq!(proof.code, code());
    }

    #[test]
    fn test_generate_unknown_code() {
        let cred = credential(25);
        let protocol = protocol_with(cred.clone());
        let err = protocol
            .generate(&cred, &CircuitCode::new("AGE_GTE_21").unwrap())
            .unwrap_err();
        assert!(matches!(err, ProtocolError::CircuitNotFound { .. }));
    }

    #[test]
    fn test_generate_unopenable_fields() {
        let cred = Credential::new(
            did(),
            age_check(),
            Commitment::new("C1").unwrap(),
            SealedFields::new(b"\xff".to_vec()),
        );
        let protocol = protocol_with(cred.clone());
        let err = protocol.generate(&cred, &code()).unwrap_err();
        assert!(matches!(err, ProtocolError::FieldsUnavailable(_)));
    }

    #[tokio::test]
    async fn test_verify_true_and_false() {
        let adult = credential(25);
        let protocol = protocol_with(adult.clone());
        let proof = protocol.generate(&adult, &code()).unwrap();
        assert!(protocol.verify(&proof, &address(), &age_check()).await.unwrap());

        let minor = credential(10);
        let protocol = protocol_with(minor.clone());
        let proof = protocol.generate(&minor, &code()).unwrap();
        assert!(!protocol.verify(&proof, &address(), &age_check()).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_unknown_prover() {
        let cred = credential(25);
        let protocol = protocol_with(cred.clone());
        let proof = protocol.generate(&cred, &code()).unwrap();
        let err = protocol
            .verify(&proof, &ProverAddress::new("0xnobody").unwrap(), &age_check())
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownProver { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_verify_missing_credential_for_purpose() {
        let cred = credential(25);
        let protocol = protocol_with(cred.clone());
        let proof = protocol.generate(&cred, &code()).unwrap();
        let err = protocol
            .verify(&proof, &address(), &Purpose::new("income-check").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::CredentialNotFound { .. }));
    }

    #[tokio::test]
    async fn test_verify_altered_commitment() {
        let cred = credential(25);
        let protocol = protocol_with(cred.clone());
        let mut proof = protocol.generate(&cred, &code()).unwrap();
        proof.commitment = Commitment::new("C2").unwrap();
        let err = protocol.verify(&proof, &address(), &age_check()).await.unwrap_err();
        assert!(matches!(err, ProtocolError::CommitmentMismatch));
    }

    #[tokio::test]
    async fn test_config_is_applied() {
        let cred = credential(25);
        let protocol =
            protocol_with(cred).with_config(ProtocolConfig::uniform(Duration::from_millis(50)));
        assert_eq!(protocol.config().resolve_timeout, Duration::from_millis(50));
    }
}
