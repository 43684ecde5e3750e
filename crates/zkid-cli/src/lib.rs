//! # zkid-cli — zkid Command-Line Interface
//!
//! Drives the proof protocol against a fixture file describing circuits,
//! prover addresses, and issued credentials.
//!
//! ## Subcommands
//!
//! - `circuits` — List registered circuits and flag stale pinned codes
//! - `prove` — Generate a proof, optionally signed
//! - `verify` — Verify a proof and report the outcome as an exit code
//! - `key` — Generate Ed25519 seeds and derive prover addresses
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; each handler returns an exit code.
//! - Handlers delegate to the library crates and hold no protocol logic.

pub mod circuits;
pub mod fixture;
pub mod prove;
pub mod signing;
pub mod verify;

/// Single-threaded runtime for the async protocol calls a handler makes.
pub(crate) fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
