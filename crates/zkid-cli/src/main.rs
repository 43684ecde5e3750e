//! # zkid CLI entry point
//!
//! Parses command-line arguments, initialises logging, and dispatches to
//! subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use zkid_cli::circuits::{run_circuits, CircuitsArgs};
use zkid_cli::prove::{run_prove, ProveArgs};
use zkid_cli::signing::{run_key, KeyArgs};
use zkid_cli::verify::{run_verify, VerifyArgs};

/// zkid: zero-knowledge credential proofs.
///
/// Lists circuits, generates proofs from issued credentials, verifies them
/// against the prover's identity and the credential's commitment, and
/// derives prover addresses from Ed25519 seeds.
#[derive(Parser, Debug)]
#[command(name = "zkid", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    /// Ignored when RUST_LOG is set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the circuits a fixture registers.
    Circuits(CircuitsArgs),

    /// Generate a proof for a credential in the fixture.
    Prove(ProveArgs),

    /// Verify a proof against the fixture.
    Verify(VerifyArgs),

    /// Ed25519 seed generation and address derivation.
    Key(KeyArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "zkid starting");

    let result = match &cli.command {
        Commands::Circuits(args) => run_circuits(args),
        Commands::Prove(args) => run_prove(args),
        Commands::Verify(args) => run_verify(args),
        Commands::Key(args) => run_key(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
