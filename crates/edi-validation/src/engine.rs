//! Validation engine

use regex::Regex;
use tracing::warn;

use crate::rules::{Constraint, Violation, numeric_pattern, validate_data_type, validate_length};
use crate::{Error, Result};

/// Strictness level for validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrictnessLevel {
    /// Strict: any violation is an error
    Strict,
    /// Lenient: violations are logged and the value is kept
    #[default]
    Lenient,
}

impl StrictnessLevel {
    #[must_use]
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            StrictnessLevel::Strict
        } else {
            StrictnessLevel::Lenient
        }
    }
}

/// Validates data element values for one interchange
///
/// The numeric representation depends on the decimal mark announced by the
/// interchange, so a validator is built per parse.
#[derive(Debug, Clone)]
pub struct ElementValidator {
    strictness: StrictnessLevel,
    numeric: Regex,
}

impl ElementValidator {
    /// Create a validator for the given decimal mark
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pattern`] if the numeric pattern cannot be compiled.
    pub fn new(strictness: StrictnessLevel, decimal: char) -> Result<Self> {
        Ok(Self {
            strictness,
            numeric: numeric_pattern(decimal)?,
        })
    }

    #[must_use]
    pub fn strictness(&self) -> StrictnessLevel {
        self.strictness
    }

    /// First violated rule: exact length, then maximum length, then type.
    #[must_use]
    pub fn check(&self, value: &str, constraint: &Constraint) -> Option<Violation> {
        validate_length(value, constraint)
            .and_then(|()| validate_data_type(value, constraint.data_type, &self.numeric))
            .err()
    }

    /// Validate `value` of data element `id`
    ///
    /// # Errors
    ///
    /// In strict mode, returns [`Error::Validation`] for the first violation.
    /// In lenient mode violations are only logged.
    pub fn validate(&self, id: &str, value: &str, constraint: &Constraint) -> Result<()> {
        let Some(violation) = self.check(value, constraint) else {
            return Ok(());
        };
        match self.strictness {
            StrictnessLevel::Strict => Err(Error::Validation {
                id: id.to_string(),
                violation,
            }),
            StrictnessLevel::Lenient => {
                warn!(element = id, value, "data element \"{}\" {}", id, violation);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edi_schema::DataType;

    #[test]
    fn test_strict_rejects_too_long() {
        let validator = ElementValidator::new(StrictnessLevel::Strict, '.').unwrap();
        let constraint = Constraint::new().max_length(3);
        let err = validator.validate("1004", "12345", &constraint).unwrap_err();
        assert_eq!(
            err.to_string(),
            "data element \"1004\" length must be lower than \"3\", got \"5\""
        );
    }

    #[test]
    fn test_lenient_accepts_violations() {
        let validator = ElementValidator::new(StrictnessLevel::Lenient, '.').unwrap();
        let constraint = Constraint::new().max_length(3).data_type(DataType::Numeric);
        assert!(validator.validate("6060", "12X45", &constraint).is_ok());
        assert_eq!(validator.strictness(), StrictnessLevel::Lenient);
    }

    #[test]
    fn test_check_order_length_before_type() {
        let validator = ElementValidator::new(StrictnessLevel::Strict, '.').unwrap();
        let constraint = Constraint::new().max_length(2).data_type(DataType::Numeric);
        assert_eq!(
            validator.check("ABC", &constraint),
            Some(Violation::TooLong { max: 2, actual: 3 })
        );
        assert_eq!(validator.check("AB", &constraint), Some(Violation::NotNumeric));
        assert_eq!(validator.check("12", &constraint), None);
    }

    #[test]
    fn test_decimal_mark_is_honoured() {
        let validator = ElementValidator::new(StrictnessLevel::Strict, ',').unwrap();
        let constraint = Constraint::new().data_type(DataType::Numeric);
        assert!(validator.validate("6060", "12,5", &constraint).is_ok());
        assert!(validator.validate("6060", "12.5", &constraint).is_err());
    }

    #[test]
    fn test_from_strict() {
        assert_eq!(StrictnessLevel::from_strict(true), StrictnessLevel::Strict);
        assert_eq!(StrictnessLevel::from_strict(false), StrictnessLevel::Lenient);
        assert_eq!(StrictnessLevel::default(), StrictnessLevel::Lenient);
    }
}
