//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the identifiers that flow through proof generation
//! and verification. These prevent accidental identifier confusion: you
//! cannot pass a `Purpose` where a `CircuitCode` is expected, or a raw
//! address where a resolved `Did` is required.
//!
//! ## Security Invariant
//!
//! Equality on every identifier is exact string equality. Nothing in this
//! module normalizes case, trims, or otherwise infers that two different
//! strings denote the same identity; the validated constructors reject
//! inputs that would need such treatment instead.
//!
//! All newtypes deserialize through their validated constructor, so a
//! malformed identifier cannot enter the system through a wire format.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// W3C Decentralized Identifier (DID).
///
/// Format: `did:<method>:<method-specific-id>`
/// where method is lowercase alphanumeric and method-specific-id is non-empty.
///
/// # Validation
///
/// - Must start with `did:`
/// - Method name must be at least 1 character, lowercase alphanumeric
/// - Must have a `:` separator after method
/// - Method-specific identifier must be non-empty
///
/// Reference: <https://www.w3.org/TR/did-core/#did-syntax>
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Did(String);

impl Did {
    /// Create a DID from a string, validating format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDid`] if the string does not
    /// match the `did:method:identifier` format.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        Self::split(&s).ok_or_else(|| ValidationError::InvalidDid(s.clone()))?;
        Ok(Self(s))
    }

    /// Split a candidate DID into `(method, identifier)`, or `None` if the
    /// format is invalid.
    fn split(s: &str) -> Option<(&str, &str)> {
        let rest = s.strip_prefix("did:")?;
        let (method, identifier) = rest.split_once(':')?;

        // Method must be non-empty and lowercase alphanumeric
        if method.is_empty()
            || !method
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return None;
        }

        if identifier.is_empty() || identifier.chars().any(char::is_whitespace) {
            return None;
        }

        Some((method, identifier))
    }

    /// Access the DID string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Address a prover is known by at verification time.
///
/// Addresses are opaque: the protocol never parses them, it only hands them
/// to a DID resolver. Signature-based flows derive them from the signer's
/// public key (see `zkid-crypto`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProverAddress(String);

impl ProverAddress {
    /// Create an address, rejecting empty or whitespace-bearing strings.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if !is_token(&s) {
            return Err(ValidationError::InvalidAddress(s));
        }
        Ok(Self(s))
    }

    /// Access the address string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Purpose tag scoping which credential and circuit apply to a proof request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Purpose(String);

impl Purpose {
    /// Create a purpose tag, rejecting empty or whitespace-bearing strings.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if !is_token(&s) {
            return Err(ValidationError::InvalidPurpose(s));
        }
        Ok(Self(s))
    }

    /// Access the purpose string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of a circuit's exact logic version (e.g. `AGE_GTE_18`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CircuitCode(String);

impl CircuitCode {
    /// Create a circuit code, rejecting empty or whitespace-bearing strings.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if !is_token(&s) {
            return Err(ValidationError::InvalidCircuitCode(s));
        }
        Ok(Self(s))
    }

    /// Access the code string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && !s.chars().any(char::is_whitespace)
}

macro_rules! string_newtype_impls {
    ($($ty:ident),*) => {
        $(
            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl TryFrom<String> for $ty {
                type Error = ValidationError;

                fn try_from(value: String) -> Result<Self, Self::Error> {
                    Self::new(value)
                }
            }

            impl From<$ty> for String {
                fn from(value: $ty) -> Self {
                    value.0
                }
            }

            impl std::str::FromStr for $ty {
                type Err = ValidationError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Self::new(s)
                }
            }
        )*
    };
}

string_newtype_impls!(Did, ProverAddress, Purpose, CircuitCode);
