//! # Circuits
//!
//! A [`Circuit`] is a predicate scoped to a purpose. Its identity is its
//! code: a canonical rendering of the predicate logic computed once at
//! construction, so the same logic always yields the same code across
//! processes and restarts.
//!
//! Construction validates the predicate, which makes [`Circuit::code`] and
//! [`Circuit::evaluate`] infallible.

use serde::Serialize;

use zkid_core::{CircuitCode, FieldMapping, Purpose};

use crate::error::CircuitError;
use crate::predicate::Predicate;

/// A validated predicate bound to a purpose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Circuit {
    purpose: Purpose,
    predicate: Predicate,
    code: CircuitCode,
}

impl Circuit {
    /// Build a circuit, validating the predicate and computing its code.
    ///
    /// # Errors
    ///
    /// Returns [`CircuitError::InvalidFieldName`] or
    /// [`CircuitError::EmptyRange`] for malformed predicates.
    pub fn new(purpose: Purpose, predicate: Predicate) -> Result<Self, CircuitError> {
        predicate.validate()?;
        let code = CircuitCode::new(predicate.canonical_code()?)?;
        Ok(Self {
            purpose,
            predicate,
            code,
        })
    }

    pub fn purpose(&self) -> &Purpose {
        &self.purpose
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Canonical code identifying this circuit's logic.
    pub fn code(&self) -> &CircuitCode {
        &self.code
    }

    /// Evaluate the predicate. Missing or mistyped fields evaluate to false.
    pub fn evaluate(&self, fields: &FieldMapping) -> bool {
        self.predicate.evaluate(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn age_check() -> Purpose {
        Purpose::new("age-check").unwrap()
    }

    #[test]
    fn test_identical_logic_shares_code() {
        let a = Circuit::new(age_check(), Predicate::at_least("age", 18)).unwrap();
        let b = Circuit::new(age_check(), Predicate::at_least("age", 18)).unwrap();
        assert_eq!(a.code(), b.code());
        assert_eq!(a.code().as_str(), "AGE_GTE_18");
    }

    #[test]
    fn test_code_ignores_purpose() {
        let a = Circuit::new(age_check(), Predicate::at_least("age", 18)).unwrap();
        let b = Circuit::new(
            Purpose::new("alcohol-sale").unwrap(),
            Predicate::at_least("age", 18),
        )
        .unwrap();
        assert_eq!(a.code(), b.code());
        assert_ne!(a.purpose(), b.purpose());
    }

    #[test]
    fn test_changed_threshold_changes_code() {
        let a = Circuit::new(age_check(), Predicate::at_least("age", 18)).unwrap();
        let b = Circuit::new(age_check(), Predicate::at_least("age", 21)).unwrap();
        assert_ne!(a.code(), b.code());
    }

    #[test]
    fn test_invalid_predicate_is_rejected() {
        assert!(matches!(
            Circuit::new(age_check(), Predicate::at_least("Age", 18)),
            Err(CircuitError::InvalidFieldName(_))
        ));
    }

    #[test]
    fn test_evaluate_delegates_to_predicate() {
        let c = Circuit::new(age_check(), Predicate::at_least("age", 18)).unwrap();
        assert!(c.evaluate(&FieldMapping::new().with("age", 25)));
        assert!(!c.evaluate(&FieldMapping::new().with("age", 10)));
        assert!(!c.evaluate(&FieldMapping::new().with("height", 180)));
    }
}
