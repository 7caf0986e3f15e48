#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # edi-validation
//!
//! Syntax validation of data element values and code list translation.
//!
//! Values are checked against the length and representation declared by
//! their schema definition. In strict mode a violation is an error; in
//! lenient mode it is logged as a warning and the value is accepted as is.
//!
//! ## Example Usage
//!
//! ```rust
//! use edi_schema::{DataType, SchemaNode};
//! use edi_validation::{Constraint, ElementValidator, StrictnessLevel};
//!
//! let definition = SchemaNode::data_element("1004")
//!     .with_type(DataType::Alphanumeric)
//!     .with_max_length(35);
//! let constraint = Constraint::from(&definition);
//!
//! let strict = ElementValidator::new(StrictnessLevel::Strict, '.').unwrap();
//! assert!(strict.validate("1004", "128576", &constraint).is_ok());
//! assert!(strict.validate("1004", &"X".repeat(36), &constraint).is_err());
//! ```

pub mod codelist;
pub mod engine;
pub mod rules;

// Re-export main types
pub use codelist::translate;
pub use engine::{ElementValidator, StrictnessLevel};
pub use rules::{Constraint, Violation, validate_data_type, validate_length};

use thiserror::Error;

/// Errors that can occur during validation
#[derive(Error, Debug)]
pub enum Error {
    #[error("data element \"{id}\" {violation}")]
    Validation { id: String, violation: Violation },

    #[error("Invalid numeric pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
