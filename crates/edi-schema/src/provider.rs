//! Schema provider abstraction and the in-memory implementation

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::model::{Code, SchemaNode};
use crate::{Error, Result};

/// Directory used when an interchange does not name one
pub const LATEST_DIRECTORY: &str = "D07A";

/// Syntax version used when none (or an unknown one) is given
pub const DEFAULT_SYNTAX_VERSION: u8 = 4;

/// Source of schema definitions and code lists
///
/// Implementations are shared between parses as `Arc<dyn SchemaProvider>`
/// and must tolerate concurrent lookups.
pub trait SchemaProvider: Send + Sync {
    /// Definition for `id` under the given directory and syntax version.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when no definition exists; other variants when a
    /// definition exists but cannot be read.
    fn lookup(
        &self,
        id: &str,
        directory: Option<&str>,
        syntax_version: Option<u8>,
    ) -> Result<Arc<SchemaNode>>;

    /// Code list of a data element, empty when the element has none.
    ///
    /// # Errors
    ///
    /// Fails only when a code list exists but cannot be read.
    fn codes_for(
        &self,
        id: &str,
        directory: Option<&str>,
        syntax_version: Option<u8>,
    ) -> Result<Arc<[Code]>>;
}

/// Uppercased directory, or [`LATEST_DIRECTORY`] when absent or blank.
#[must_use]
pub fn resolve_directory(directory: Option<&str>) -> String {
    match directory.map(str::trim) {
        Some(dir) if !dir.is_empty() => dir.to_uppercase(),
        _ => LATEST_DIRECTORY.to_string(),
    }
}

/// Syntax version in `1..=4`, or [`DEFAULT_SYNTAX_VERSION`].
#[must_use]
pub fn resolve_syntax_version(syntax_version: Option<u8>) -> u8 {
    match syntax_version {
        Some(version @ 1..=4) => version,
        _ => DEFAULT_SYNTAX_VERSION,
    }
}

/// Provider backed by definitions registered in code
///
/// Definitions registered for a specific directory take precedence over
/// directory-independent ones. Syntax versions are not distinguished.
#[derive(Debug, Default, Clone)]
pub struct MemorySchemaProvider {
    nodes: HashMap<(String, Option<String>), Arc<SchemaNode>>,
    codes: HashMap<String, Arc<[Code]>>,
}

impl MemorySchemaProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition valid for every directory
    pub fn insert(&mut self, node: SchemaNode) {
        self.nodes.insert((node.id.clone(), None), Arc::new(node));
    }

    /// Register a definition for one directory only
    pub fn insert_for_directory(&mut self, directory: &str, node: SchemaNode) {
        self.nodes.insert(
            (node.id.clone(), Some(resolve_directory(Some(directory)))),
            Arc::new(node),
        );
    }

    /// Register the code list of a data element
    pub fn insert_codes(&mut self, id: impl Into<String>, codes: Vec<Code>) {
        self.codes.insert(id.into(), codes.into());
    }

    #[must_use]
    pub fn with(mut self, node: SchemaNode) -> Self {
        self.insert(node);
        self
    }

    #[must_use]
    pub fn with_codes(mut self, id: impl Into<String>, codes: Vec<Code>) -> Self {
        self.insert_codes(id, codes);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl SchemaProvider for MemorySchemaProvider {
    fn lookup(
        &self,
        id: &str,
        directory: Option<&str>,
        _syntax_version: Option<u8>,
    ) -> Result<Arc<SchemaNode>> {
        let scoped = (id.to_string(), Some(resolve_directory(directory)));
        if let Some(node) = self.nodes.get(&scoped) {
            trace!("Directory-specific definition for {}", id);
            return Ok(Arc::clone(node));
        }
        self.nodes
            .get(&(id.to_string(), None))
            .map(Arc::clone)
            .ok_or_else(|| Error::NotFound(format!("no mapping found for identifier \"{id}\"")))
    }

    fn codes_for(
        &self,
        id: &str,
        _directory: Option<&str>,
        _syntax_version: Option<u8>,
    ) -> Result<Arc<[Code]>> {
        Ok(self
            .codes
            .get(id)
            .map_or_else(|| Arc::from(Vec::new()), Arc::clone))
    }
}
