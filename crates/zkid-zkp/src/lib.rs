//! # zkid-zkp — Proof Protocol
//!
//! Generates proofs that a credential's hidden fields satisfy a named
//! circuit, and verifies them against the prover's identity, the
//! credential's purpose, and its commitment.
//!
//! ## Architecture
//!
//! - **Predicates and circuits** (`predicate.rs`, `circuit.rs`): the closed
//!   set of statements a proof can make, each with a canonical code.
//!
//! - **Registry** (`registry.rs`): `(purpose, code) -> Circuit`, behind the
//!   `CircuitSource` trait.
//!
//! - **Payload** (`payload.rs`): the `PayloadCodec` seam where a proving
//!   backend plugs in. The default encodes canonical JSON.
//!
//! - **Proof** (`proof.rs`): the transmissible `Proof` and `SignedProof`.
//!
//! - **Collaborators** (`resolver.rs`, `signing.rs`): DID resolution,
//!   proof signing, and address recovery, with in-memory and Ed25519
//!   reference implementations.
//!
//! - **Protocol** (`protocol.rs`): `ProofProtocol`, the generation flow and
//!   the eight-stage verification chain.
//!
//! ## Security Invariant
//!
//! Verification never reports a binding failure as `false`. A proof that
//! does not bind to the prover, purpose, and commitment is an error; `false`
//! means only that the predicate does not hold.
//!
//! ## Crate Policy
//!
//! - Depends on `zkid-core`, `zkid-crypto`, and `zkid-vc` internally.
//! - Collaborators are injected as trait objects; the protocol never
//!   reaches a concrete backend directly.

pub mod circuit;
pub mod config;
pub mod error;
pub mod payload;
pub mod predicate;
pub mod proof;
pub mod protocol;
pub mod registry;
pub mod resolver;
pub mod signing;

pub use circuit::Circuit;
pub use config::{ConfigError, ProtocolConfig};
pub use error::{CircuitError, Dependency, FailureKind, ProtocolError, VerificationStage};
pub use payload::{CanonicalJsonCodec, EncodedPayload, PayloadCodec, PayloadError};
pub use predicate::Predicate;
pub use proof::{Proof, ProofSignature, SignedProof};
pub use protocol::{ProofProtocol, VerificationRequest};
pub use registry::{CircuitDefinition, CircuitRegistry, CircuitSource};
pub use resolver::{DidResolver, InMemoryDidResolver, ResolveError};
pub use signing::{
    AddressRecovery, Ed25519AddressRecovery, Ed25519ProofSigner, ProofSigner, SignatureError,
};
