//! # Credential Stores
//!
//! The protocol looks credentials up through the [`CredentialStore`] trait.
//! Storage, replication, and access control live behind it.
//!
//! Two in-memory stores ship here:
//!
//! - [`InMemoryCredentialStore`] is keyed exactly by `(did, purpose)` and
//!   refuses to replace an issued credential.
//! - [`SubjectKeyedCredentialStore`] keeps the latest credential per DID and
//!   ignores the requested purpose. Loosely keyed backends like this exist
//!   in practice; the verifier's binding checks must catch what they return.
//!
//! Both accept an artificial latency so callers can exercise timeouts.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use zkid_core::{Did, Purpose};

use crate::credential::Credential;

/// Failure reported by a credential backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No credential exists for the key.
    #[error("no credential for {did} with purpose {purpose}")]
    NotFound {
        /// Subject that was looked up.
        did: Did,
        /// Purpose that was looked up.
        purpose: Purpose,
    },

    /// The backend could not answer.
    #[error("credential store unavailable: {0}")]
    Unavailable(String),

    /// A credential already exists for the key. Issued credentials are
    /// immutable.
    #[error("credential for {did} with purpose {purpose} already exists")]
    Duplicate { did: Did, purpose: Purpose },
}

/// Source of credentials keyed by subject and purpose.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up the credential issued to `did` for `purpose`.
    async fn lookup_credential(&self, did: &Did, purpose: &Purpose)
        -> Result<Credential, StoreError>;
}

/// Exact `(did, purpose)` store.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    credentials: HashMap<(Did, Purpose), Credential>,
    latency: Option<Duration>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every lookup by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Build a store from issued credentials, rejecting repeated keys.
    pub fn from_credentials(
        credentials: impl IntoIterator<Item = Credential>,
    ) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for credential in credentials {
            store.insert(credential)?;
        }
        Ok(store)
    }

    /// Store a credential under its own `(did, purpose)`.
    ///
    /// # Errors
    ///
    /// [`StoreError::Duplicate`] if that key already holds a credential.
    pub fn insert(&mut self, credential: Credential) -> Result<(), StoreError> {
        match self
            .credentials
            .entry((credential.did.clone(), credential.purpose.clone()))
        {
            Entry::Occupied(_) => Err(StoreError::Duplicate {
                did: credential.did,
                purpose: credential.purpose,
            }),
            Entry::Vacant(slot) => {
                slot.insert(credential);
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn lookup_credential(
        &self,
        did: &Did,
        purpose: &Purpose,
    ) -> Result<Credential, StoreError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.credentials
            .get(&(did.clone(), purpose.clone()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                did: did.clone(),
                purpose: purpose.clone(),
            })
    }
}

/// Latest-credential-per-subject store. The purpose argument is ignored.
#[derive(Debug, Default)]
pub struct SubjectKeyedCredentialStore {
    credentials: HashMap<Did, Credential>,
    latency: Option<Duration>,
}

impl SubjectKeyedCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every lookup by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Store a credential as the subject's latest.
    pub fn insert(&mut self, credential: Credential) -> Option<Credential> {
        self.credentials.insert(credential.did.clone(), credential)
    }

    /// Store a credential under an arbitrary subject key. Models a backend
    /// whose index disagrees with the record it returns.
    pub fn insert_for(&mut self, did: Did, credential: Credential) -> Option<Credential> {
        self.credentials.insert(did, credential)
    }
}

#[async_trait]
impl CredentialStore for SubjectKeyedCredentialStore {
    async fn lookup_credential(
        &self,
        did: &Did,
        purpose: &Purpose,
    ) -> Result<Credential, StoreError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.credentials
            .get(did)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                did: did.clone(),
                purpose: purpose.clone(),
            })
    }
}
