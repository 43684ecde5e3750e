//! # Circuit Registry
//!
//! Maps `(purpose, code)` to a [`Circuit`]. The registry is assembled at
//! startup and read concurrently afterwards; entries only change through
//! a deliberate [`CircuitRegistry::retire`] or registration.
//!
//! ## Pinned Codes
//!
//! [`CircuitRegistry::register`] files a circuit under its computed code.
//! [`CircuitRegistry::register_as`] files it under a code supplied by the
//! caller, typically one loaded from configuration that verifiers and
//! provers agreed on. If the predicate is later edited without updating
//! the pinned code, lookups still succeed but both proof generation and
//! verification report `CircuitCodeMismatch` instead of silently running
//! different logic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use zkid_core::{CircuitCode, Purpose};

use crate::circuit::Circuit;
use crate::error::CircuitError;
use crate::predicate::Predicate;

/// Read access to registered circuits.
pub trait CircuitSource: Send + Sync {
    /// Find the circuit filed under `(purpose, code)`.
    fn lookup(&self, purpose: &Purpose, code: &CircuitCode) -> Option<&Circuit>;
}

/// Serialized form of a registry entry.
///
/// `code` is optional. When present it is pinned via
/// [`CircuitRegistry::register_as`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitDefinition {
    pub purpose: Purpose,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<CircuitCode>,
    pub predicate: Predicate,
}

/// In-memory circuit registry.
#[derive(Debug, Default, Clone)]
pub struct CircuitRegistry {
    circuits: BTreeMap<(Purpose, CircuitCode), Circuit>,
}

impl CircuitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a circuit under its computed code.
    pub fn register(&mut self, circuit: Circuit) -> Result<CircuitCode, CircuitError> {
        let code = circuit.code().clone();
        self.register_as(code.clone(), circuit)?;
        Ok(code)
    }

    /// Register a circuit under an explicitly pinned code.
    pub fn register_as(&mut self, code: CircuitCode, circuit: Circuit) -> Result<(), CircuitError> {
        let key = (circuit.purpose().clone(), code);
        if self.circuits.contains_key(&key) {
            let (purpose, code) = key;
            return Err(CircuitError::DuplicateCircuit { purpose, code });
        }
        if &key.1 != circuit.code() {
            tracing::warn!(
                purpose = %key.0,
                pinned = %key.1,
                computed = %circuit.code(),
                "circuit registered under a code that differs from its logic"
            );
        }
        self.circuits.insert(key, circuit);
        Ok(())
    }

    /// Remove a circuit, returning it if it was registered.
    pub fn retire(&mut self, purpose: &Purpose, code: &CircuitCode) -> Option<Circuit> {
        self.circuits.remove(&(purpose.clone(), code.clone()))
    }

    pub fn contains(&self, purpose: &Purpose, code: &CircuitCode) -> bool {
        self.lookup(purpose, code).is_some()
    }

    pub fn len(&self) -> usize {
        self.circuits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circuits.is_empty()
    }

    /// Iterate `(filed code, circuit)` pairs ordered by purpose, then code.
    pub fn iter(&self) -> impl Iterator<Item = (&CircuitCode, &Circuit)> {
        self.circuits.iter().map(|((_, code), circuit)| (code, circuit))
    }

    /// Build a registry from definitions, pinning codes where given.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = CircuitDefinition>,
    ) -> Result<Self, CircuitError> {
        let mut registry = Self::new();
        for def in definitions {
            let circuit = Circuit::new(def.purpose, def.predicate)?;
            match def.code {
                Some(code) => registry.register_as(code, circuit)?,
                None => {
                    registry.register(circuit)?;
                }
            }
        }
        Ok(registry)
    }
}

impl CircuitSource for CircuitRegistry {
    fn lookup(&self, purpose: &Purpose, code: &CircuitCode) -> Option<&Circuit> {
        self.circuits.get(&(purpose.clone(), code.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purpose(s: &str) -> Purpose {
        Purpose::new(s).unwrap()
    }

    fn code(s: &str) -> CircuitCode {
        CircuitCode::new(s).unwrap()
    }

    fn age_circuit(threshold: i64) -> Circuit {
        Circuit::new(purpose("age-check"), Predicate::at_least("age", threshold)).unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = CircuitRegistry::new();
        let filed = registry.register(age_circuit(18)).unwrap();
        assert_eq!(filed, code("AGE_GTE_18"));
        assert!(registry
            .lookup(&purpose("age-check"), &code("AGE_GTE_18"))
            .is_some());
        assert!(registry
            .lookup(&purpose("income-check"), &code("AGE_GTE_18"))
            .is_none());
        assert!(registry
            .lookup(&purpose("age-check"), &code("AGE_GTE_21"))
            .is_none());
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = CircuitRegistry::new();
        registry.register(age_circuit(18)).unwrap();
        assert!(matches!(
            registry.register(age_circuit(18)),
            Err(CircuitError::DuplicateCircuit { .. })
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_same_code_under_different_purposes() {
        let mut registry = CircuitRegistry::new();
        registry.register(age_circuit(18)).unwrap();
        registry
            .register(Circuit::new(purpose("alcohol-sale"), Predicate::at_least("age", 18)).unwrap())
            .unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_register_as_keeps_pinned_code() {
        let mut registry = CircuitRegistry::new();
        registry.register_as(code("AGE_GTE_18"), age_circuit(21)).unwrap();
        let circuit = registry
            .lookup(&purpose("age-check"), &code("AGE_GTE_18"))
            .unwrap();
        assert_eq!(circuit.code(), &code("AGE_GTE_21"));
    }

    #[test]
    fn test_retire_removes_entry() {
        let mut registry = CircuitRegistry::new();
        registry.register(age_circuit(18)).unwrap();
        assert!(registry.retire(&purpose("age-check"), &code("AGE_GTE_18")).is_some());
        assert!(!registry.contains(&purpose("age-check"), &code("AGE_GTE_18")));
        assert!(registry.is_empty());
        assert!(registry.retire(&purpose("age-check"), &code("AGE_GTE_18")).is_none());
    }

    #[test]
    fn test_from_definitions_json() {
        let defs: Vec<CircuitDefinition> = serde_json::from_str(
            r#"[
                {"purpose": "age-check", "predicate": {"kind": "at_least", "field": "age", "threshold": 18}},
                {"purpose": "residency", "code": "COUNTRY_PK",
                 "predicate": {"kind": "equals", "field": "country", "expected": "PK"}}
            ]"#,
        )
        .unwrap();
        let registry = CircuitRegistry::from_definitions(defs).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(&purpose("age-check"), &code("AGE_GTE_18")));
        assert!(registry.contains(&purpose("residency"), &code("COUNTRY_PK")));
        let codes: Vec<_> = registry.iter().map(|(c, _)| c.as_str().to_string()).collect();
        assert_eq!(codes, vec!["AGE_GTE_18", "COUNTRY_PK"]);
    }

    #[test]
    fn test_from_definitions_rejects_invalid_predicate() {
        let defs = vec![CircuitDefinition {
            purpose: purpose("age-check"),
            code: None,
            predicate: Predicate::at_least("Age", 18),
        }];
        assert!(CircuitRegistry::from_definitions(defs).is_err());
    }
}
