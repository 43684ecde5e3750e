//! # Proof Signing and Address Recovery
//!
//! Signed proofs let a verifier learn the prover's address from the proof
//! itself. A [`ProofSigner`] signs the canonical bytes of a proof body; an
//! [`AddressRecovery`] checks the signature and returns the address that
//! produced it. Wallets and HSMs sit behind these traits.
//!
//! ## Ed25519 Reference Envelope
//!
//! Ed25519 signatures do not support public-key recovery, so the reference
//! signature blob carries the key: `public_key (32) || signature (64)`.
//! Recovery verifies the signature under the embedded key and derives the
//! address with [`zkid_crypto::address_of`]. Forging an address therefore
//! requires the private key behind it.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use zkid_core::{CanonicalBytes, ProverAddress};
use zkid_crypto::{
    address_of, verify_with_public_key, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature,
};

use crate::proof::ProofSignature;

const PUBLIC_KEY_LEN: usize = 32;
const SIGNATURE_LEN: usize = 64;

/// Signing or recovery failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// The signature blob has the wrong shape.
    #[error("malformed signature: {0}")]
    Malformed(String),

    /// The signature does not verify.
    #[error("invalid signature: {0}")]
    Invalid(String),

    /// The signing or recovery backend could not answer.
    #[error("signature backend unavailable: {0}")]
    Unavailable(String),
}

/// Signs canonical proof bodies on behalf of a prover.
#[async_trait]
pub trait ProofSigner: Send + Sync {
    async fn sign(&self, message: &CanonicalBytes) -> Result<ProofSignature, SignatureError>;
}

/// Recovers the signing prover's address from a signature.
#[async_trait]
pub trait AddressRecovery: Send + Sync {
    async fn recover_address(
        &self,
        message: &CanonicalBytes,
        signature: &ProofSignature,
    ) -> Result<ProverAddress, SignatureError>;
}

/// Ed25519 signer producing `public_key || signature` blobs.
#[derive(Debug)]
pub struct Ed25519ProofSigner {
    keypair: Ed25519KeyPair,
    latency: Option<Duration>,
}

impl Ed25519ProofSigner {
    pub fn new(keypair: Ed25519KeyPair) -> Self {
        Self {
            keypair,
            latency: None,
        }
    }

    /// Delay every signature by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Address a verifier will recover from this signer's proofs.
    pub fn address(&self) -> Result<ProverAddress, SignatureError> {
        address_of(&self.keypair.public_key()).map_err(|e| SignatureError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl ProofSigner for Ed25519ProofSigner {
    async fn sign(&self, message: &CanonicalBytes) -> Result<ProofSignature, SignatureError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let signature = self.keypair.sign(message);
        let mut blob = Vec::with_capacity(PUBLIC_KEY_LEN + SIGNATURE_LEN);
        blob.extend_from_slice(self.keypair.public_key().as_bytes());
        blob.extend_from_slice(signature.as_bytes());
        Ok(ProofSignature::new(blob))
    }
}

/// Recovery for [`Ed25519ProofSigner`] blobs.
#[derive(Debug, Default, Clone)]
pub struct Ed25519AddressRecovery {
    latency: Option<Duration>,
}

impl Ed25519AddressRecovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every recovery by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }
}

#[async_trait]
impl AddressRecovery for Ed25519AddressRecovery {
    async fn recover_address(
        &self,
        message: &CanonicalBytes,
        signature: &ProofSignature,
    ) -> Result<ProverAddress, SignatureError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let blob = signature.as_bytes();
        if blob.len() != PUBLIC_KEY_LEN + SIGNATURE_LEN {
            return Err(SignatureError::Malformed(format!(
                "expected {} bytes, got {}",
                PUBLIC_KEY_LEN + SIGNATURE_LEN,
                blob.len()
            )));
        }
        let (key_bytes, sig_bytes) = blob.split_at(PUBLIC_KEY_LEN);
        let public_key = Ed25519PublicKey::from_slice(key_bytes)
            .map_err(|e| SignatureError::Malformed(e.to_string()))?;
        let sig = Ed25519Signature::from_slice(sig_bytes)
            .map_err(|e| SignatureError::Malformed(e.to_string()))?;
        verify_with_public_key(message, &sig, &public_key)
            .map_err(|e| SignatureError::Invalid(e.to_string()))?;
        address_of(&public_key).map_err(|e| SignatureError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> Ed25519ProofSigner {
        Ed25519ProofSigner::new(Ed25519KeyPair::from_seed(&[7u8; 32]))
    }

    fn message(s: &str) -> CanonicalBytes {
        CanonicalBytes::new(&serde_json::json!({ "m": s })).unwrap()
    }

    #[tokio::test]
    async fn test_sign_then_recover_yields_signer_address() {
        let signer = signer();
        let msg = message("hello");
        let sig = signer.sign(&msg).await.unwrap();
        assert_eq!(sig.as_bytes().len(), 96);

        let recovered = Ed25519AddressRecovery::new()
            .recover_address(&msg, &sig)
            .await
            .unwrap();
        assert_eq!(recovered, signer.address().unwrap());
        assert!(recovered.as_str().starts_with("0x"));
    }

    #[tokio::test]
    async fn test_recover_rejects_other_message() {
        let signer = signer();
        let sig = signer.sign(&message("hello")).await.unwrap();
        let err = Ed25519AddressRecovery::new()
            .recover_address(&message("goodbye"), &sig)
            .await
            .unwrap_err();
        assert!(matches!(err, SignatureError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_recover_rejects_swapped_key() {
        let msg = message("hello");
        let sig = signer().sign(&msg).await.unwrap();
        let other = Ed25519KeyPair::from_seed(&[9u8; 32]).public_key();
        let mut blob = other.as_bytes().to_vec();
        blob.extend_from_slice(&sig.as_bytes()[32..]);
        let err = Ed25519AddressRecovery::new()
            .recover_address(&msg, &ProofSignature::new(blob))
            .await
            .unwrap_err();
        assert!(matches!(err, SignatureError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_recover_rejects_wrong_length() {
        let err = Ed25519AddressRecovery::new()
            .recover_address(&message("x"), &ProofSignature::new(vec![0u8; 10]))
            .await
            .unwrap_err();
        assert!(matches!(err, SignatureError::Malformed(_)));
    }
}
