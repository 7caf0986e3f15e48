#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # edi-edifact
//!
//! EDIFACT interchange parsing and serialization.
//!
//! The tokenizer splits an interchange into its envelope skeleton, the
//! parser matches every message against its message definition and builds
//! a document tree, and the serializers write the tree back as EDIFACT or
//! project it to XML.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use edi_edifact::{EdifactParser, ParserOptions};
//! use edi_schema::DirectorySchemaProvider;
//!
//! let provider = Arc::new(DirectorySchemaProvider::new("testdata/schemas"));
//! let parser = EdifactParser::new(provider)
//!     .with_options(ParserOptions::new().translate_codes(true));
//! let interchange = parser.parse_file("testdata/edi/orders.edi").unwrap();
//! println!("{}", interchange.to_xml(false));
//! ```

pub mod interchange;
pub mod parser;
pub mod serializer;
pub mod syntax;
pub mod tokenizer;
pub mod xml;

pub use interchange::{INTERCHANGE_ID, Interchange};
pub use parser::{EdifactParser, FUNCTIONAL_GROUP_ID, ParserOptions};
pub use serializer::EdifactSerializer;
pub use syntax::Separators;
pub use tokenizer::tokenize;
pub use xml::XmlWriter;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use edi_schema::SchemaProvider;
use thiserror::Error;

/// Errors that can occur when parsing EDIFACT
#[derive(Error, Debug)]
pub enum Error {
    #[error("File not found: {}", .path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported standard: {0}")]
    UnsupportedStandard(String),

    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Mapping not found: {0}")]
    MappingNotFound(String),

    #[error(transparent)]
    Validation(edi_validation::Error),

    #[error("Invalid parser configuration: {0}")]
    Configuration(#[source] edi_validation::Error),

    #[error("Schema error: {0}")]
    Schema(edi_schema::Error),
}

impl From<edi_validation::Error> for Error {
    fn from(err: edi_validation::Error) -> Self {
        match err {
            edi_validation::Error::Validation { .. } => Error::Validation(err),
            edi_validation::Error::Pattern(_) => Error::Configuration(err),
        }
    }
}

impl From<edi_schema::Error> for Error {
    fn from(err: edi_schema::Error) -> Self {
        match err {
            edi_schema::Error::NotFound(message) => Error::MappingNotFound(message),
            other => Error::Schema(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Supported interchange standards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Standard {
    Edifact,
}

impl Standard {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Standard::Edifact => "EDIFACT",
        }
    }

    /// Parser for this standard
    #[must_use]
    pub fn parser(self, provider: Arc<dyn SchemaProvider>) -> EdifactParser {
        match self {
            Standard::Edifact => EdifactParser::new(provider),
        }
    }
}

impl FromStr for Standard {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("EDIFACT") {
            Ok(Standard::Edifact)
        } else {
            Err(Error::UnsupportedStandard(s.to_string()))
        }
    }
}

impl fmt::Display for Standard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_from_str() {
        assert_eq!("EDIFACT".parse::<Standard>().unwrap(), Standard::Edifact);
        assert_eq!("edifact".parse::<Standard>().unwrap(), Standard::Edifact);
        assert!(matches!(
            "X12".parse::<Standard>(),
            Err(Error::UnsupportedStandard(ref name)) if name == "X12"
        ));
        assert_eq!(Standard::Edifact.to_string(), "EDIFACT");
    }

    #[test]
    fn test_schema_not_found_maps_to_mapping_error() {
        let err: Error = edi_schema::Error::NotFound("no mapping found for identifier \"QTY\"".into()).into();
        assert!(matches!(err, Error::MappingNotFound(ref message) if message.contains("QTY")));

        let err: Error = edi_schema::Error::InvalidFormat("bad".into()).into();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_pattern_failure_is_not_a_validation_error() {
        let pattern = regex::Regex::new("(").unwrap_err();
        let err: Error = edi_validation::Error::Pattern(pattern).into();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().starts_with("Invalid parser configuration"));

        let err: Error = edi_validation::Error::Validation {
            id: "1004".into(),
            violation: edi_validation::Violation::NotNumeric,
        }
        .into();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(err.to_string(), "data element \"1004\" must be a numeric string");
    }
}
