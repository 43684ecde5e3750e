//! # zkid-vc — Credentials
//!
//! The credential side of the proof protocol:
//!
//! - **Credential** (`credential.rs`): the `(did, purpose, commitment,
//!   sealed_fields, issued_at)` record, plus a plaintext issuance helper
//!   for fixtures and tests.
//!
//! - **Store** (`store.rs`): the async `CredentialStore` lookup trait and
//!   in-memory backends.
//!
//! - **Opener** (`opener.rs`): the `FieldOpener` capability that recovers
//!   field values from a sealed blob at proof-generation time.
//!
//! ## Security Invariant
//!
//! Credentials are read-only to the protocol. Stores are untrusted in the
//! sense that whatever they return is re-checked against the requested
//! subject and purpose by the verifier in `zkid-zkp`.
//!
//! ## Crate Policy
//!
//! - Depends on `zkid-core` and `zkid-crypto` internally.
//! - Sealed field contents never reach `Debug` output or logs.

pub mod credential;
pub mod opener;
pub mod store;

pub use credential::{issue_plaintext, Credential, IssueError, SealedFields};
pub use opener::{FieldOpener, OpenError, PlaintextFieldOpener};
pub use store::{
    CredentialStore, InMemoryCredentialStore, StoreError, SubjectKeyedCredentialStore,
};
