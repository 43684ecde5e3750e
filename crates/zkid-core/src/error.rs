//! # Error Types — Structured Error Hierarchy
//!
//! Defines the leaf error types shared by every zkid crate. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Validation errors carry the rejected input so callers can report it.
//! - Cryptographic errors fail loudly with full context.
//! - Protocol-level failures live in `zkid-zkp`; this module only covers
//!   failures that can happen before any protocol stage runs.

use thiserror::Error;

/// Top-level error type for the foundational layer.
#[derive(Error, Debug)]
pub enum ZkidError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// An identifier or value failed validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A cryptographic operation failed.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    /// Non-integer numbers must travel as decimal strings.
    #[error("float values are not permitted in canonical representations; use a string or integer: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error raised by validated constructors of domain newtypes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The string is not a `did:<method>:<id>` identifier.
    #[error("invalid DID: {0:?}")]
    InvalidDid(String),

    /// A prover address was empty or contained whitespace.
    #[error("invalid prover address: {0:?}")]
    InvalidAddress(String),

    /// A purpose tag was empty or contained whitespace.
    #[error("invalid purpose: {0:?}")]
    InvalidPurpose(String),

    /// A circuit code was empty or contained whitespace.
    #[error("invalid circuit code: {0:?}")]
    InvalidCircuitCode(String),

    /// A commitment value was empty.
    #[error("commitment value must not be empty")]
    EmptyCommitment,

    /// A timestamp was malformed or not UTC.
    #[error("invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp {
        /// The rejected input.
        value: String,
        /// Why the input was rejected.
        reason: String,
    },
}

/// Error in cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Key generation or parsing failed.
    #[error("key error: {0}")]
    KeyError(String),

    /// Hex or byte-level decoding failed.
    #[error("encoding error: {0}")]
    Encoding(String),
}
