//! # DID Resolution
//!
//! Verification starts by mapping the prover's address to a DID through a
//! [`DidResolver`]. How a DID method resolves is outside the protocol; the
//! resolver only has to return a DID or say why it cannot.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use zkid_core::{Did, ProverAddress};

/// Resolver failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No DID is associated with the address.
    #[error("no DID known for address {0}")]
    Unknown(ProverAddress),

    /// The resolver backend could not answer.
    #[error("DID resolver unavailable: {0}")]
    Unavailable(String),
}

/// Maps prover addresses to DIDs.
#[async_trait]
pub trait DidResolver: Send + Sync {
    async fn resolve_did(&self, address: &ProverAddress) -> Result<Did, ResolveError>;
}

/// Fixed address-to-DID table.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDidResolver {
    entries: HashMap<ProverAddress, Did>,
    latency: Option<Duration>,
}

impl InMemoryDidResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every resolution by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn insert(&mut self, address: ProverAddress, did: Did) -> Option<Did> {
        self.entries.insert(address, did)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(ProverAddress, Did)> for InMemoryDidResolver {
    fn from_iter<I: IntoIterator<Item = (ProverAddress, Did)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
            latency: None,
        }
    }
}

#[async_trait]
impl DidResolver for InMemoryDidResolver {
    async fn resolve_did(&self, address: &ProverAddress) -> Result<Did, ResolveError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.entries
            .get(address)
            .cloned()
            .ok_or_else(|| ResolveError::Unknown(address.clone()))
    }
}
