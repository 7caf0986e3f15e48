//! # edi-schema
//!
//! Schema model, identifier classification and schema providers for EDIFACT.
//!
//! Definitions are resolved per identifier: a message lists its segments and
//! segment groups, a segment lists its element columns, a composite lists its
//! components. Each referenced identifier is looked up again through the same
//! [`SchemaProvider`] to obtain its own definition.

pub mod identifier;
pub mod loader;
pub mod model;
pub mod provider;
pub mod registry;

pub use identifier::{Classification, Level, Scope, classify};
pub use loader::DirectorySchemaProvider;
pub use model::{Code, DataType, NodeKind, SchemaNode};
pub use provider::{
    DEFAULT_SYNTAX_VERSION, LATEST_DIRECTORY, MemorySchemaProvider, SchemaProvider,
    resolve_directory, resolve_syntax_version,
};
pub use registry::{CacheKey, ConcurrentSchemaRegistry};

use thiserror::Error;

/// Errors that can occur when working with schemas
#[derive(Error, Debug)]
pub enum Error {
    #[error("Schema not found: {0}")]
    NotFound(String),

    #[error("Invalid schema format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
