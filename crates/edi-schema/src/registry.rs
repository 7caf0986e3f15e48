//! Concurrent, populate-once cache of resolved definitions

use std::sync::Arc;

use dashmap::DashMap;

use crate::identifier::{Level, Scope};
use crate::model::{Code, SchemaNode};

/// Identity of a cached definition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub id: String,
    pub level: Level,
    pub scope: Scope,
    pub directory: String,
    pub syntax_version: u8,
}

impl CacheKey {
    pub fn new(
        id: impl Into<String>,
        level: Level,
        scope: Scope,
        directory: impl Into<String>,
        syntax_version: u8,
    ) -> Self {
        Self {
            id: id.into(),
            level,
            scope,
            directory: directory.into(),
            syntax_version,
        }
    }
}

/// Registry shared by every lookup of a provider
///
/// Entries are immutable once inserted: a concurrent second insert for the
/// same key keeps the first value and returns it.
#[derive(Debug, Default)]
pub struct ConcurrentSchemaRegistry {
    nodes: DashMap<CacheKey, Arc<SchemaNode>>,
    codes: DashMap<CacheKey, Arc<[Code]>>,
}

impl ConcurrentSchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<Arc<SchemaNode>> {
        self.nodes.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Insert unless present; returns the value now stored under `key`.
    pub fn register(&self, key: CacheKey, node: Arc<SchemaNode>) -> Arc<SchemaNode> {
        Arc::clone(self.nodes.entry(key).or_insert(node).value())
    }

    #[must_use]
    pub fn get_codes(&self, key: &CacheKey) -> Option<Arc<[Code]>> {
        self.codes.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Insert unless present; returns the code list now stored under `key`.
    pub fn register_codes(&self, key: CacheKey, codes: Arc<[Code]>) -> Arc<[Code]> {
        Arc::clone(self.codes.entry(key).or_insert(codes).value())
    }

    /// Number of cached definitions (code lists excluded)
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn key(id: &str) -> CacheKey {
        CacheKey::new(id, Level::Segment, Scope::User, "D96A", 4)
    }

    #[test]
    fn test_register_keeps_first_value() {
        let registry = ConcurrentSchemaRegistry::new();
        let first = registry.register(key("BGM"), Arc::new(SchemaNode::segment("BGM").with_name("first")));
        let second = registry.register(key("BGM"), Arc::new(SchemaNode::segment("BGM").with_name("second")));
        assert_eq!(first.name, "first");
        assert_eq!(second.name, "first");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_keys_differ_by_syntax_version() {
        let registry = ConcurrentSchemaRegistry::new();
        registry.register(key("UNB"), Arc::new(SchemaNode::segment("UNB")));
        let v3 = CacheKey::new("UNB", Level::Segment, Scope::User, "D96A", 3);
        assert!(registry.get(&v3).is_none());
        assert!(registry.get(&key("UNB")).is_some());
    }

    #[test]
    fn test_concurrent_registration() {
        let registry = Arc::new(ConcurrentSchemaRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    registry.register(key("NAD"), Arc::new(SchemaNode::segment("NAD").with_name(n.to_string())))
                })
            })
            .collect();
        let names: Vec<String> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap().name.clone())
            .collect();
        assert!(names.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_codes_cache() {
        let registry = ConcurrentSchemaRegistry::new();
        assert!(registry.get_codes(&key("1001")).is_none());
        registry.register_codes(key("1001"), vec![Code::new("220", "Order")].into());
        assert_eq!(registry.get_codes(&key("1001")).unwrap().len(), 1);
    }
}
