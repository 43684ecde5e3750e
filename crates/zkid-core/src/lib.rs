//! # zkid-core — Foundational Types for zkid
//!
//! This crate is the bedrock of the zkid workspace. It defines the type-system
//! primitives the proof protocol relies on. Every other crate in the
//! workspace depends on `zkid-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `Did`, `ProverAddress`,
//!    `Purpose`, `CircuitCode` are validated newtypes with exact equality.
//!    No bare strings for identifiers.
//!
//! 2. **`CanonicalBytes` newtype.** Everything that is signed, recovered, or
//!    digested flows through `CanonicalBytes::new()`. No raw
//!    `serde_json::to_vec()` on those paths.
//!
//! 3. **Closed field typing.** `FieldValue` is a closed tagged union so
//!    circuit predicates match exhaustively on field shapes.
//!
//! 4. **Opaque commitments.** `Commitment` is compared, never decomposed.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `zkid-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod commitment;
pub mod digest;
pub mod error;
pub mod field;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use commitment::{commit_fields, Commitment};
pub use digest::{sha256_digest, ContentDigest};
pub use error::{CanonicalizationError, CryptoError, ValidationError, ZkidError};
pub use field::{FieldMapping, FieldValue};
pub use identity::{CircuitCode, Did, ProverAddress, Purpose};
pub use temporal::Timestamp;
