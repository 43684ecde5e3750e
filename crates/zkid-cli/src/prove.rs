//! # Prove Subcommand
//!
//! Generates a proof for one credential in the fixture. With `--seed` the
//! proof is signed with the Ed25519 key derived from the seed, so the
//! verifier can recover the prover address from the proof itself.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use zkid_core::{CircuitCode, Did, Purpose};
use zkid_crypto::Ed25519KeyPair;
use zkid_zkp::Ed25519ProofSigner;

use crate::fixture::FixtureArgs;

/// Arguments for the `prove` subcommand.
#[derive(Args, Debug)]
pub struct ProveArgs {
    #[command(flatten)]
    pub fixture: FixtureArgs,

    /// DID of the credential subject.
    #[arg(long)]
    pub did: String,

    /// Purpose the credential was issued for.
    #[arg(long)]
    pub purpose: String,

    /// Circuit code to prove against (e.g. AGE_GTE_18).
    #[arg(long)]
    pub code: String,

    /// Sign the proof with the Ed25519 key derived from this 64-char hex seed.
    #[arg(long)]
    pub seed: Option<String>,

    /// Write the proof here instead of stdout.
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

/// Execute the prove subcommand.
pub fn run_prove(args: &ProveArgs) -> Result<u8> {
    let did = Did::new(args.did.as_str())?;
    let purpose = Purpose::new(args.purpose.as_str())?;
    let code = CircuitCode::new(args.code.as_str())?;

    let fixture = args.fixture.load()?;
    let protocol = fixture.protocol(args.fixture.config()?)?;
    let credential = fixture.credential(&did, &purpose)?;

    let rendered = match &args.seed {
        None => {
            let proof = protocol
                .generate(&credential, &code)
                .context("proof generation failed")?;
            serde_json::to_string_pretty(&proof)?
        }
        Some(seed) => {
            let keypair = Ed25519KeyPair::from_seed_hex(seed).context("invalid --seed")?;
            let signer = Ed25519ProofSigner::new(keypair);
            tracing::info!(address = %signer.address()?, "signing proof");
            let signed = crate::runtime()?
                .block_on(protocol.generate_signed(&credential, &code, &signer))
                .context("proof generation failed")?;
            serde_json::to_string_pretty(&signed)?
        }
    };

    match &args.out {
        Some(path) => {
            std::fs::write(path, format!("{rendered}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "proof written");
        }
        None => println!("{rendered}"),
    }
    Ok(0)
}
