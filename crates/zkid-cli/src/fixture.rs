//! # Fixture Files
//!
//! A fixture describes a small self-contained deployment: the circuits a
//! verifier accepts, which prover addresses belong to which DIDs, and the
//! credentials an issuer has handed out. The CLI builds in-memory
//! collaborators from it so `prove` and `verify` can run in separate
//! processes against the same world.
//!
//! ```yaml
//! circuits:
//!   - purpose: age-check
//!     predicate: { kind: at_least, field: age, threshold: 18 }
//! provers:
//!   - address: "0x1111"
//!     did: did:ex:1
//! credentials:
//!   - did: did:ex:1
//!     purpose: age-check
//!     salt: s1
//!     fields: { age: 25 }
//! ```
//!
//! Files ending in `.yaml` or `.yml` are read as YAML, everything else as
//! JSON. Credentials are re-issued on load; the commitment depends only on
//! the fields and salt, so every load yields the same commitment.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Deserialize;

use zkid_core::{Did, FieldMapping, ProverAddress, Purpose};
use zkid_vc::{issue_plaintext, Credential, InMemoryCredentialStore};
use zkid_zkp::{
    CircuitDefinition, CircuitRegistry, InMemoryDidResolver, ProofProtocol, ProtocolConfig,
};

/// Arguments shared by every subcommand that needs a fixture.
#[derive(Args, Debug, Clone)]
pub struct FixtureArgs {
    /// Fixture file (JSON, or YAML with a `.yaml`/`.yml` extension).
    #[arg(long, short = 'f')]
    pub fixture: PathBuf,

    /// Timeout for every collaborator call, in milliseconds. Falls back to
    /// `ZKID_RESOLVE_TIMEOUT_MS` and `ZKID_SIGNING_TIMEOUT_MS`.
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

impl FixtureArgs {
    pub fn load(&self) -> Result<Fixture> {
        Fixture::load(&self.fixture)
    }

    pub fn config(&self) -> Result<ProtocolConfig> {
        match self.timeout_ms {
            Some(0) => bail!("--timeout-ms must be greater than zero"),
            Some(ms) => Ok(ProtocolConfig::uniform(Duration::from_millis(ms))),
            None => ProtocolConfig::from_env().context("invalid timeout configuration"),
        }
    }
}

/// Parsed fixture file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
    #[serde(default)]
    pub circuits: Vec<CircuitDefinition>,
    #[serde(default)]
    pub provers: Vec<ProverEntry>,
    #[serde(default)]
    pub credentials: Vec<CredentialEntry>,
}

/// Maps a prover address to its DID.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProverEntry {
    pub address: ProverAddress,
    pub did: Did,
}

/// Plaintext inputs for one issued credential.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialEntry {
    pub did: Did,
    pub purpose: Purpose,
    pub salt: String,
    pub fields: FieldMapping,
}

impl Fixture {
    /// Read and parse a fixture file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read fixture {}", path.display()))?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let fixture: Self = if is_yaml {
            serde_yaml::from_str(&content)
                .with_context(|| format!("invalid YAML fixture {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("invalid JSON fixture {}", path.display()))?
        };
        tracing::debug!(
            path = %path.display(),
            circuits = fixture.circuits.len(),
            provers = fixture.provers.len(),
            credentials = fixture.credentials.len(),
            "fixture loaded"
        );
        Ok(fixture)
    }

    pub fn registry(&self) -> Result<CircuitRegistry> {
        CircuitRegistry::from_definitions(self.circuits.iter().cloned())
            .context("invalid circuit definitions")
    }

    pub fn resolver(&self) -> InMemoryDidResolver {
        self.provers
            .iter()
            .map(|p| (p.address.clone(), p.did.clone()))
            .collect()
    }

    /// Issue every credential entry.
    pub fn issue_all(&self) -> Result<Vec<Credential>> {
        self.credentials
            .iter()
            .map(|entry| {
                issue_plaintext(
                    entry.did.clone(),
                    entry.purpose.clone(),
                    &entry.fields,
                    &entry.salt,
                )
                .with_context(|| {
                    format!("cannot issue credential for {} / {}", entry.did, entry.purpose)
                })
            })
            .collect()
    }

    /// The issued credential for `(did, purpose)`.
    pub fn credential(&self, did: &Did, purpose: &Purpose) -> Result<Credential> {
        let matching: Vec<_> = self
            .credentials
            .iter()
            .filter(|c| &c.did == did && &c.purpose == purpose)
            .collect();
        let entry = match matching.as_slice() {
            [] => bail!("no credential for {did} with purpose {purpose} in fixture"),
            [one] => *one,
            _ => bail!("fixture lists more than one credential for {did} with purpose {purpose}"),
        };
        issue_plaintext(
            entry.did.clone(),
            entry.purpose.clone(),
            &entry.fields,
            &entry.salt,
        )
        .with_context(|| format!("cannot issue credential for {did} / {purpose}"))
    }

    /// A protocol instance backed by this fixture's collaborators.
    pub fn protocol(&self, config: ProtocolConfig) -> Result<ProofProtocol> {
        let store = InMemoryCredentialStore::from_credentials(self.issue_all()?)
            .context("fixture lists a credential twice")?;
        Ok(ProofProtocol::new(
            Arc::new(self.registry()?),
            Arc::new(self.resolver()),
            Arc::new(store),
        )
        .with_config(config))
    }
}
