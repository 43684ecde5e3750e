//! # Key Subcommand
//!
//! Ed25519 seed generation and prover address derivation. The address a
//! verifier recovers from a signed proof is the one printed here, so it is
//! what a fixture's `provers` entry must list.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use rand::RngCore;

use zkid_crypto::{address_of, bytes_to_hex, Ed25519KeyPair};

/// Arguments for the `key` subcommand.
#[derive(Args, Debug)]
pub struct KeyArgs {
    #[command(subcommand)]
    pub command: KeyCommand,
}

#[derive(Subcommand, Debug)]
pub enum KeyCommand {
    /// Generate a fresh 32-byte seed and print it with its address.
    Generate,

    /// Derive the prover address and public key for a seed.
    Address {
        /// 64-character hex Ed25519 seed.
        #[arg(long)]
        seed: String,
    },
}

/// Execute the key subcommand.
pub fn run_key(args: &KeyArgs) -> Result<u8> {
    match &args.command {
        KeyCommand::Generate => {
            let mut seed = [0u8; 32];
            rand::rngs::OsRng.fill_bytes(&mut seed);
            let seed_hex = bytes_to_hex(&seed);
            println!("seed:       {seed_hex}");
            print_identity(&Ed25519KeyPair::from_seed(&seed))?;
        }
        KeyCommand::Address { seed } => {
            let keypair = Ed25519KeyPair::from_seed_hex(seed).context("invalid --seed")?;
            print_identity(&keypair)?;
        }
    }
    Ok(0)
}

fn print_identity(keypair: &Ed25519KeyPair) -> Result<()> {
    let public_key = keypair.public_key();
    println!("public key: {}", public_key.to_hex());
    println!("address:    {}", address_of(&public_key)?);
    Ok(())
}
