//! # Predicates
//!
//! The closed set of statements a circuit can prove about credential
//! fields. Each variant has a canonical code derived only from its logic,
//! so two predicates with the same logic share a code and any change to a
//! threshold, field, or value set produces a different one.
//!
//! ## Code Grammar
//!
//! | Variant | Code |
//! |---|---|
//! | `at_least` | `<FIELD>_GTE_<n>` |
//! | `at_most` | `<FIELD>_LTE_<n>` |
//! | `between` | `<FIELD>_BETWEEN_<min>_<max>` |
//! | `equals` | `<FIELD>_EQ_<digest16>` |
//! | `one_of` | `<FIELD>_IN_<digest16>` |
//! | `present` | `<FIELD>_PRESENT` |
//! | `all_of` | `ALL_<digest16>` |
//!
//! `<FIELD>` is the field name upper-cased. Negative integers render as
//! `NEG<abs>`. `<digest16>` is the first 16 hex characters of the SHA-256
//! of the canonical (JCS) encoding of the argument: the expected value for
//! `equals`, the sorted deduplicated value set for `one_of`, and the sorted
//! deduplicated child codes for `all_of`.
//!
//! ## Evaluation
//!
//! Evaluation is total. A missing field and a field of the wrong shape both
//! make the predicate false; neither is an error. Integer comparisons only
//! hold for `FieldValue::Integer`. An empty `all_of` is false.

use serde::{Deserialize, Serialize};

use zkid_core::{sha256_digest, CanonicalBytes, CanonicalizationError, FieldMapping, FieldValue};

use crate::error::CircuitError;

const DIGEST_PREFIX_LEN: usize = 16;

/// A statement about credential fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// Integer field is at least `threshold`.
    AtLeast { field: String, threshold: i64 },
    /// Integer field is at most `threshold`.
    AtMost { field: String, threshold: i64 },
    /// Integer field lies in `[min, max]`.
    Between { field: String, min: i64, max: i64 },
    /// Field equals `expected` exactly.
    Equals { field: String, expected: FieldValue },
    /// Field equals one of `allowed`.
    OneOf {
        field: String,
        allowed: Vec<FieldValue>,
    },
    /// Field is present and not null.
    Present { field: String },
    /// Every child predicate holds.
    AllOf { predicates: Vec<Predicate> },
}

impl Predicate {
    pub fn at_least(field: impl Into<String>, threshold: i64) -> Self {
        Self::AtLeast {
            field: field.into(),
            threshold,
        }
    }

    pub fn at_most(field: impl Into<String>, threshold: i64) -> Self {
        Self::AtMost {
            field: field.into(),
            threshold,
        }
    }

    pub fn between(field: impl Into<String>, min: i64, max: i64) -> Self {
        Self::Between {
            field: field.into(),
            min,
            max,
        }
    }

    pub fn equals(field: impl Into<String>, expected: impl Into<FieldValue>) -> Self {
        Self::Equals {
            field: field.into(),
            expected: expected.into(),
        }
    }

    pub fn one_of<V: Into<FieldValue>>(
        field: impl Into<String>,
        allowed: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::OneOf {
            field: field.into(),
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    pub fn present(field: impl Into<String>) -> Self {
        Self::Present {
            field: field.into(),
        }
    }

    pub fn all_of(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Self::AllOf {
            predicates: predicates.into_iter().collect(),
        }
    }

    /// Check field names and ranges, recursively.
    pub fn validate(&self) -> Result<(), CircuitError> {
        match self {
            Self::AtLeast { field, .. }
            | Self::AtMost { field, .. }
            | Self::Equals { field, .. }
            | Self::OneOf { field, .. }
            | Self::Present { field } => validate_field_name(field),
            Self::Between { field, min, max } => {
                validate_field_name(field)?;
                if min > max {
                    return Err(CircuitError::EmptyRange {
                        field: field.clone(),
                        min: *min,
                        max: *max,
                    });
                }
                Ok(())
            }
            Self::AllOf { predicates } => predicates.iter().try_for_each(Predicate::validate),
        }
    }

    /// Canonical code string for this predicate's logic.
    pub fn canonical_code(&self) -> Result<String, CanonicalizationError> {
        Ok(match self {
            Self::AtLeast { field, threshold } => {
                format!("{}_GTE_{}", field_token(field), int_token(*threshold))
            }
            Self::AtMost { field, threshold } => {
                format!("{}_LTE_{}", field_token(field), int_token(*threshold))
            }
            Self::Between { field, min, max } => format!(
                "{}_BETWEEN_{}_{}",
                field_token(field),
                int_token(*min),
                int_token(*max)
            ),
            Self::Equals { field, expected } => {
                format!("{}_EQ_{}", field_token(field), digest_prefix(expected)?)
            }
            Self::OneOf { field, allowed } => {
                let set = canonical_set(allowed)?;
                format!("{}_IN_{}", field_token(field), digest_prefix(&set)?)
            }
            Self::Present { field } => format!("{}_PRESENT", field_token(field)),
            Self::AllOf { predicates } => {
                let mut codes = predicates
                    .iter()
                    .map(Predicate::canonical_code)
                    .collect::<Result<Vec<_>, _>>()?;
                codes.sort();
                codes.dedup();
                format!("ALL_{}", digest_prefix(&codes)?)
            }
        })
    }

    /// Evaluate against a field mapping.
    pub fn evaluate(&self, fields: &FieldMapping) -> bool {
        match self {
            Self::AtLeast { field, threshold } => {
                integer(fields, field).is_some_and(|v| v >= *threshold)
            }
            Self::AtMost { field, threshold } => {
                integer(fields, field).is_some_and(|v| v <= *threshold)
            }
            Self::Between { field, min, max } => {
                integer(fields, field).is_some_and(|v| (*min..=*max).contains(&v))
            }
            Self::Equals { field, expected } => fields.get(field) == Some(expected),
            Self::OneOf { field, allowed } => {
                fields.get(field).is_some_and(|v| allowed.contains(v))
            }
            Self::Present { field } => fields.get(field).is_some_and(|v| !v.is_null()),
            Self::AllOf { predicates } => {
                !predicates.is_empty() && predicates.iter().all(|p| p.evaluate(fields))
            }
        }
    }
}

fn integer(fields: &FieldMapping, name: &str) -> Option<i64> {
    fields.get(name).and_then(FieldValue::as_integer)
}

fn validate_field_name(name: &str) -> Result<(), CircuitError> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(CircuitError::InvalidFieldName(name.to_string()))
    }
}

fn field_token(name: &str) -> String {
    name.to_ascii_uppercase()
}

fn int_token(n: i64) -> String {
    if n < 0 {
        format!("NEG{}", n.unsigned_abs())
    } else {
        n.to_string()
    }
}

fn digest_prefix(value: &impl Serialize) -> Result<String, CanonicalizationError> {
    let canonical = CanonicalBytes::new(value)?;
    Ok(sha256_digest(&canonical).hex_prefix(DIGEST_PREFIX_LEN))
}

/// Sort by canonical encoding and drop duplicates, so `one_of` codes do
/// not depend on the order or repetition of the allowed values.
fn canonical_set(values: &[FieldValue]) -> Result<Vec<&FieldValue>, CanonicalizationError> {
    let mut keyed = values
        .iter()
        .map(|v| CanonicalBytes::new(v).map(|c| (c.into_string(), v)))
        .collect::<Result<Vec<_>, _>>()?;
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.dedup_by(|a, b| a.0 == b.0);
    Ok(keyed.into_iter().map(|(_, v)| v).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(p: &Predicate) -> String {
        p.canonical_code().unwrap()
    }

    #[test]
    fn test_threshold_codes_are_readable() {
        assert_eq!(code(&Predicate::at_least("age", 18)), "AGE_GTE_18");
        assert_eq!(code(&Predicate::at_most("debt_ratio", 40)), "DEBT_RATIO_LTE_40");
        assert_eq!(code(&Predicate::between("age", 18, 65)), "AGE_BETWEEN_18_65");
        assert_eq!(code(&Predicate::at_least("balance", -5)), "BALANCE_GTE_NEG5");
        assert_eq!(code(&Predicate::present("passport_no")), "PASSPORT_NO_PRESENT");
    }

    #[test]
    fn test_equals_code_uses_value_digest() {
        let c = code(&Predicate::equals("country", "PK"));
        assert!(c.starts_with("COUNTRY_EQ_"));
        assert_eq!(c.len(), "COUNTRY_EQ_".len() + 16);
        assert_ne!(c, code(&Predicate::equals("country", "AE")));
        // Same text, different type.
        assert_ne!(
            code(&Predicate::equals("level", 1)),
            code(&Predicate::equals("level", "1"))
        );
    }

    #[test]
    fn test_one_of_code_ignores_order_and_duplicates() {
        let a = Predicate::one_of("country", ["PK", "AE", "SG"]);
        let b = Predicate::one_of("country", ["SG", "PK", "AE", "PK"]);
        assert_eq!(code(&a), code(&b));
        assert_ne!(code(&a), code(&Predicate::one_of("country", ["PK", "AE"])));
    }

    #[test]
    fn test_all_of_code_ignores_child_order() {
        let a = Predicate::all_of([Predicate::at_least("age", 18), Predicate::present("name")]);
        let b = Predicate::all_of([Predicate::present("name"), Predicate::at_least("age", 18)]);
        assert_eq!(code(&a), code(&b));
        assert!(code(&a).starts_with("ALL_"));
        let c = Predicate::all_of([Predicate::at_least("age", 21), Predicate::present("name")]);
        assert_ne!(code(&a), code(&c));
    }

    #[test]
    fn test_digest_codes_are_pinned() {
        // sha256("\"PK\"") and sha256("[\"AE\",\"PK\",\"SG\"]"), first 16 hex chars.
        assert_eq!(code(&Predicate::equals("country", "PK")), "COUNTRY_EQ_fe9a01d1cf0e05bd");
        assert_eq!(
            code(&Predicate::one_of("country", ["SG", "PK", "AE"])),
            "COUNTRY_IN_c031443100546ef8"
        );
    }

    #[test]
    fn test_at_least_evaluation() {
        let p = Predicate::at_least("age", 18);
        assert!(p.evaluate(&FieldMapping::new().with("age", 25)));
        assert!(p.evaluate(&FieldMapping::new().with("age", 18)));
        assert!(!p.evaluate(&FieldMapping::new().with("age", 10)));
        assert!(!p.evaluate(&FieldMapping::new()));
        assert!(!p.evaluate(&FieldMapping::new().with("age", "25")));
    }

    #[test]
    fn test_range_evaluation() {
        let p = Predicate::between("age", 18, 65);
        assert!(p.evaluate(&FieldMapping::new().with("age", 18)));
        assert!(p.evaluate(&FieldMapping::new().with("age", 65)));
        assert!(!p.evaluate(&FieldMapping::new().with("age", 66)));
        let q = Predicate::at_most("age", 30);
        assert!(q.evaluate(&FieldMapping::new().with("age", 30)));
        assert!(!q.evaluate(&FieldMapping::new().with("age", 31)));
    }

    #[test]
    fn test_set_and_presence_evaluation() {
        let p = Predicate::one_of("country", ["PK", "AE"]);
        assert!(p.evaluate(&FieldMapping::new().with("country", "AE")));
        assert!(!p.evaluate(&FieldMapping::new().with("country", "US")));

        let present = Predicate::present("name");
        assert!(present.evaluate(&FieldMapping::new().with("name", "Ada")));
        assert!(!present.evaluate(&FieldMapping::new().with("name", FieldValue::Null)));
        assert!(!present.evaluate(&FieldMapping::new()));

        let eq = Predicate::equals("verified", true);
        assert!(eq.evaluate(&FieldMapping::new().with("verified", true)));
        assert!(!eq.evaluate(&FieldMapping::new().with("verified", "true")));
    }

    #[test]
    fn test_all_of_evaluation() {
        let p = Predicate::all_of([Predicate::at_least("age", 18), Predicate::present("name")]);
        assert!(p.evaluate(&FieldMapping::new().with("age", 20).with("name", "Ada")));
        assert!(!p.evaluate(&FieldMapping::new().with("age", 20)));
        assert!(!Predicate::all_of([]).evaluate(&FieldMapping::new().with("age", 20)));
    }

    #[test]
    fn test_validate_field_names() {
        assert!(Predicate::at_least("age", 1).validate().is_ok());
        assert!(Predicate::at_least("date_of_birth2", 1).validate().is_ok());
        for bad in ["", "Age", "1age", "_age", "age-years", "age years", "âge"] {
            assert!(
                matches!(
                    Predicate::at_least(bad, 1).validate(),
                    Err(CircuitError::InvalidFieldName(_))
                ),
                "{bad:?} should be rejected"
            );
        }
        let nested = Predicate::all_of([Predicate::present("ok"), Predicate::present("Bad")]);
        assert!(nested.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_range() {
        assert!(matches!(
            Predicate::between("age", 65, 18).validate(),
            Err(CircuitError::EmptyRange { .. })
        ));
        assert!(Predicate::between("age", 18, 18).validate().is_ok());
    }

    #[test]
    fn test_serde_shape() {
        let p: Predicate =
            serde_json::from_str(r#"{"kind": "at_least", "field": "age", "threshold": 18}"#).unwrap();
        assert_eq!(p, Predicate::at_least("age", 18));

        let q: Predicate = serde_json::from_str(
            r#"{"kind": "all_of", "predicates": [
                {"kind": "one_of", "field": "country", "allowed": ["PK", "AE"]},
                {"kind": "equals", "field": "verified", "expected": true}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            q,
            Predicate::all_of([
                Predicate::one_of("country", ["PK", "AE"]),
                Predicate::equals("verified", true),
            ])
        );
    }
}
