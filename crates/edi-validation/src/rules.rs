//! Validation rules

use edi_schema::{DataType, SchemaNode};
use regex::Regex;
use thiserror::Error;

/// Declared constraints of a data element
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Constraint {
    /// Exact length of a non-empty value
    pub length: Option<usize>,
    /// Maximum length
    pub max_length: Option<usize>,
    /// Representation
    pub data_type: DataType,
}

impl Constraint {
    /// Create a new constraint
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set exact length
    #[must_use]
    pub fn length(mut self, len: usize) -> Self {
        self.length = Some(len);
        self
    }

    /// Set max length
    #[must_use]
    pub fn max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    /// Set data type
    #[must_use]
    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }
}

impl From<&SchemaNode> for Constraint {
    fn from(node: &SchemaNode) -> Self {
        Self {
            length: node.length,
            max_length: node.max_length,
            data_type: node.data_type,
        }
    }
}

/// Why a value was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("length must be \"{expected}\", got \"{actual}\"")]
    WrongLength { expected: usize, actual: usize },

    #[error("length must be lower than \"{max}\", got \"{actual}\"")]
    TooLong { max: usize, actual: usize },

    #[error("must be a numeric string")]
    NotNumeric,

    #[error("must be an alphabetic string")]
    NotAlphabetic,
}

/// Validate length constraints
///
/// The exact length only applies to non-empty values; the maximum always
/// applies. Lengths count characters of the raw value as stored, so release
/// characters in front of escaped separators are counted too.
///
/// # Errors
///
/// Returns the first violated length constraint.
pub fn validate_length(value: &str, constraint: &Constraint) -> Result<(), Violation> {
    let len = value.chars().count();

    if let Some(expected) = constraint.length {
        if len > 0 && len != expected {
            return Err(Violation::WrongLength {
                expected,
                actual: len,
            });
        }
    }

    if let Some(max) = constraint.max_length {
        if len > max {
            return Err(Violation::TooLong { max, actual: len });
        }
    }

    Ok(())
}

/// Validate data type of a non-empty value
///
/// `numeric` must match a whole numeric value (see
/// [`numeric_pattern`]); alphabetic values must not contain digits.
///
/// # Errors
///
/// Returns the representation violation, if any.
pub fn validate_data_type(value: &str, data_type: DataType, numeric: &Regex) -> Result<(), Violation> {
    if value.is_empty() {
        return Ok(());
    }
    match data_type {
        DataType::Numeric if !numeric.is_match(value) => Err(Violation::NotNumeric),
        DataType::Alpha if value.chars().any(|c| c.is_ascii_digit()) => Err(Violation::NotAlphabetic),
        _ => Ok(()),
    }
}

/// Pattern of a numeric value using `decimal` as decimal mark
///
/// # Errors
///
/// Fails only if the assembled pattern does not compile.
pub fn numeric_pattern(decimal: char) -> Result<Regex, regex::Error> {
    let decimal = regex::escape(&decimal.to_string());
    Regex::new(&format!("^[0-9]+(?:{decimal}[0-9]+)?$"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_counts_release_characters() {
        let constraint = Constraint::new().max_length(10);
        assert!(validate_length("ABCDEFGH+J", &constraint).is_ok());
        assert_eq!(
            validate_length("ABCDEFGH?+J", &constraint),
            Err(Violation::TooLong { max: 10, actual: 11 })
        );
    }

    #[test]
    fn test_exact_length_ignores_empty_values() {
        let constraint = Constraint::new().length(3);
        assert!(validate_length("", &constraint).is_ok());
        assert!(validate_length("220", &constraint).is_ok());
        assert_eq!(
            validate_length("22", &constraint),
            Err(Violation::WrongLength {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_exact_length_checked_before_max() {
        let constraint = Constraint::new().length(3).max_length(2);
        assert_eq!(
            validate_length("1234", &constraint),
            Err(Violation::WrongLength {
                expected: 3,
                actual: 4
            })
        );
    }

    #[test]
    fn test_max_length() {
        let constraint = Constraint::new().max_length(5);
        assert!(validate_length("12345", &constraint).is_ok());
        assert_eq!(
            validate_length("123456", &constraint),
            Err(Violation::TooLong { max: 5, actual: 6 })
        );
    }

    #[test]
    fn test_length_counts_characters() {
        let constraint = Constraint::new().max_length(3);
        assert!(validate_length("äöü", &constraint).is_ok());
    }

    #[test]
    fn test_numeric_with_decimal_mark() {
        let dot = numeric_pattern('.').unwrap();
        assert!(validate_data_type("10", DataType::Numeric, &dot).is_ok());
        assert!(validate_data_type("10.5", DataType::Numeric, &dot).is_ok());
        assert_eq!(
            validate_data_type("10,5", DataType::Numeric, &dot),
            Err(Violation::NotNumeric)
        );
        assert_eq!(
            validate_data_type("abc", DataType::Numeric, &dot),
            Err(Violation::NotNumeric)
        );

        let comma = numeric_pattern(',').unwrap();
        assert!(validate_data_type("10,5", DataType::Numeric, &comma).is_ok());
        assert!(validate_data_type("10.5", DataType::Numeric, &comma).is_err());
    }

    #[test]
    fn test_alphabetic_rejects_digits() {
        let numeric = numeric_pattern('.').unwrap();
        assert!(validate_data_type("ABC", DataType::Alpha, &numeric).is_ok());
        assert_eq!(
            validate_data_type("AB1", DataType::Alpha, &numeric),
            Err(Violation::NotAlphabetic)
        );
    }

    #[test]
    fn test_empty_and_unconstrained_values_pass() {
        let numeric = numeric_pattern('.').unwrap();
        assert!(validate_data_type("", DataType::Numeric, &numeric).is_ok());
        assert!(validate_data_type("x1", DataType::Alphanumeric, &numeric).is_ok());
        assert!(validate_data_type("x1", DataType::Unspecified, &numeric).is_ok());
    }

    #[test]
    fn test_constraint_from_schema_node() {
        let node = SchemaNode::data_element("2005")
            .with_type(DataType::Numeric)
            .with_length(3);
        let constraint = Constraint::from(&node);
        assert_eq!(constraint.length, Some(3));
        assert_eq!(constraint.max_length, None);
        assert_eq!(constraint.data_type, DataType::Numeric);
    }
}
