//! # zkid-crypto — Cryptographic Primitives
//!
//! Provides the reference signature capability for signed proofs:
//!
//! - **Ed25519** signing and verification over `CanonicalBytes` (the only
//!   valid input type, enforcing canonicalization correctness).
//! - **Prover addresses** derived from Ed25519 public keys, so a verifier
//!   can recover who signed a proof from the signature envelope alone.
//!
//! The proof protocol never depends on this crate directly; it consumes
//! signing and recovery through traits in `zkid-zkp`, and this crate backs
//! the reference implementations of those traits.
//!
//! ## Crate Policy
//!
//! - Depends only on `zkid-core` internally.
//! - No mocking of cryptographic operations in tests — all tests use real
//!   `CanonicalBytes`, real SHA-256, real Ed25519.

pub mod ed25519;

pub use ed25519::{
    address_of, bytes_to_hex, hex_bytes, hex_to_bytes, verify_with_public_key, Ed25519KeyPair,
    Ed25519PublicKey, Ed25519Signature,
};
