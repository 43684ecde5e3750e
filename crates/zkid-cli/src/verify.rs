//! # Verify Subcommand
//!
//! Verifies a proof file against the fixture. Signed proofs carry their
//! prover; unsigned proofs need `--prover`.
//!
//! ## Exit codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | every check passed and the predicate holds |
//! | 1 | the proof was rejected, or the command itself failed |
//! | 2 | every check passed and the predicate does not hold |
//! | 3 | a dependency failed; retrying may succeed |

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Deserialize;

use zkid_core::{ProverAddress, Purpose};
use zkid_zkp::{Ed25519AddressRecovery, Proof, ProtocolError, SignedProof};

use crate::fixture::FixtureArgs;

pub const EXIT_HOLDS: u8 = 0;
pub const EXIT_REJECTED: u8 = 1;
pub const EXIT_DOES_NOT_HOLD: u8 = 2;
pub const EXIT_RETRYABLE: u8 = 3;

/// Arguments for the `verify` subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub fixture: FixtureArgs,

    /// Proof file produced by `zkid prove`.
    #[arg(long)]
    pub proof: PathBuf,

    /// Purpose the verifier is checking for.
    #[arg(long)]
    pub purpose: String,

    /// Prover address. Required for unsigned proofs; rejected for signed
    /// ones, whose address is recovered from the signature.
    #[arg(long)]
    pub prover: Option<String>,
}

/// A proof file holds either form.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProofFile {
    Signed(SignedProof),
    Plain(Proof),
}

/// Execute the verify subcommand.
pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let purpose = Purpose::new(args.purpose.as_str())?;
    let content = std::fs::read_to_string(&args.proof)
        .with_context(|| format!("failed to read proof {}", args.proof.display()))?;
    let proof_file: ProofFile = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a proof", args.proof.display()))?;

    let fixture = args.fixture.load()?;
    let protocol = fixture.protocol(args.fixture.config()?)?;
    let runtime = crate::runtime()?;

    let outcome = match (&proof_file, &args.prover) {
        (ProofFile::Plain(proof), Some(prover)) => {
            let prover = ProverAddress::new(prover.as_str())?;
            runtime.block_on(protocol.verify(proof, &prover, &purpose))
        }
        (ProofFile::Plain(_), None) => bail!("--prover is required for unsigned proofs"),
        (ProofFile::Signed(signed), None) => runtime.block_on(protocol.verify_signed(
            signed,
            &purpose,
            &Ed25519AddressRecovery::new(),
        )),
        (ProofFile::Signed(_), Some(_)) => {
            bail!("--prover must not be given for signed proofs")
        }
    };

    Ok(report(&outcome))
}

/// Print the outcome and map it to an exit code.
fn report(outcome: &Result<bool, ProtocolError>) -> u8 {
    match outcome {
        Ok(true) => {
            println!("holds");
            EXIT_HOLDS
        }
        Ok(false) => {
            println!("does not hold");
            EXIT_DOES_NOT_HOLD
        }
        Err(err) => {
            let stage = err
                .stage()
                .map(|s| format!("stage {} ({s})", s.number()))
                .unwrap_or_else(|| "before verification".to_string());
            println!("rejected at {stage}: {err}");
            if err.is_retryable() {
                EXIT_RETRYABLE
            } else {
                EXIT_REJECTED
            }
        }
    }
}
