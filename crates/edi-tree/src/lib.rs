#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # edi-tree
//!
//! Document tree model and traversal APIs for EDIFACT interchanges.
//!
//! A parsed interchange is a tree of [`CompositeElement`] containers, each
//! tagged with the grammar [`Role`] it plays, whose leaves are
//! [`DataElement`] values. The same types are used to build documents from
//! scratch before serializing them.

/// Element primitives: roles, containers and leaves.
pub mod node;
/// Cursor navigation, pre-order iteration and visitor walks.
pub mod traversal;

/// Node primitives for tree structure.
pub use node::{CompositeElement, DataElement, Element, Role};
/// Traversal entry points for navigating trees.
pub use traversal::{Cursor, Descendants, Visitor, walk};

use thiserror::Error;

/// Errors that can occur when working with the tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Node not found at path: {path}")]
    NodeNotFound { path: String },

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Type mismatch at '{path}': expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("Index {index} out of range for container '{id}' with {len} children")]
    IndexOutOfRange { id: String, index: usize, len: usize },
}

impl Error {
    /// Build a node-not-found error with path context.
    pub fn node_not_found(path: impl Into<String>) -> Self {
        Self::NodeNotFound { path: path.into() }
    }

    /// Build an invalid-path error with input path and parsing reason.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Build a type-mismatch error for a node reached at `path`.
    pub fn type_mismatch(
        path: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            path: path.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Crate-local result type for tree operations.
pub type Result<T> = std::result::Result<T, Error>;
