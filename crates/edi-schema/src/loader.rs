//! Directory-backed schema provider
//!
//! Layout under the base directory, every file JSON (`.json`) or YAML
//! (`.yaml`, `.yml`):
//!
//! ```text
//! service_v<N>/segments.*                    service segments of syntax version N
//! service_v<N>/composite_data_elements.*
//! service_v<N>/data_elements.*
//! service_v<N>/messages/<id>.*               service messages (CONTRL, ...)
//! <DIR>/segments.*                           user definitions of directory DIR
//! <DIR>/composite_data_elements.*
//! <DIR>/data_elements.*
//! <DIR>/messages/<id>.*
//! <DIR>/codes.*                              user code lists
//! <DIR>/service_codes_v<max(N,3)>.*          service code lists
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use serde::Deserialize;
use tracing::{debug, info, trace};

use crate::identifier::{Level, Scope, classify, code_scope};
use crate::model::{Code, DataType, NodeKind, SchemaNode};
use crate::provider::{SchemaProvider, resolve_directory, resolve_syntax_version};
use crate::registry::{CacheKey, ConcurrentSchemaRegistry};
use crate::{Error, Result};

const EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Serializable definition format for loading from files
#[derive(Debug, Deserialize)]
struct NodeFile {
    id: String,
    #[serde(default)]
    kind: Option<NodeKind>,
    #[serde(default)]
    required: bool,
    #[serde(default, alias = "maxrepeat")]
    max_repeat: Option<usize>,
    #[serde(default)]
    name: String,
    #[serde(default, alias = "desc")]
    description: String,
    #[serde(default, rename = "type")]
    data_type: Option<String>,
    #[serde(default)]
    length: Option<usize>,
    #[serde(default, alias = "maxlength")]
    max_length: Option<usize>,
    #[serde(default)]
    children: Vec<NodeFile>,
}

/// One entry of a code list file
#[derive(Debug, Deserialize)]
struct CodeListFile {
    id: String,
    #[serde(default)]
    codes: Vec<Code>,
}

impl NodeFile {
    /// Convert to the model; `kind` falls back to `default_kind`, then to the
    /// identifier shape, then to a segment group.
    fn into_node(self, default_kind: Option<NodeKind>) -> Result<SchemaNode> {
        let kind = self
            .kind
            .or(default_kind)
            .or_else(|| classify(&self.id).and_then(|c| c.level.node_kind()))
            .unwrap_or(NodeKind::Group);

        let data_type = match self.data_type.as_deref() {
            None => DataType::Unspecified,
            Some(code) => DataType::from_code(code).ok_or_else(|| {
                Error::InvalidFormat(format!("unknown data type \"{code}\" for \"{}\"", self.id))
            })?,
        };

        let children = self
            .children
            .into_iter()
            .map(|child| child.into_node(None))
            .collect::<Result<Vec<_>>>()?;

        Ok(SchemaNode {
            id: self.id,
            kind,
            required: self.required,
            max_repeat: self.max_repeat.unwrap_or(1).max(1),
            name: self.name,
            description: self.description,
            data_type,
            length: self.length,
            max_length: self.max_length,
            children,
        })
    }
}

/// Schema provider reading definition files from a base directory
///
/// Files are read at most once; resolved definitions are kept in a
/// [`ConcurrentSchemaRegistry`].
pub struct DirectorySchemaProvider {
    base: PathBuf,
    registry: Arc<ConcurrentSchemaRegistry>,
    definition_files: DashMap<PathBuf, Arc<[SchemaNode]>>,
    code_files: DashMap<PathBuf, Arc<[CodeListFile]>>,
}

impl DirectorySchemaProvider {
    /// Create a provider rooted at `base`
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self::with_registry(base, Arc::new(ConcurrentSchemaRegistry::new()))
    }

    /// Create a provider sharing a pre-configured registry
    pub fn with_registry(base: impl Into<PathBuf>, registry: Arc<ConcurrentSchemaRegistry>) -> Self {
        Self {
            base: base.into(),
            registry,
            definition_files: DashMap::new(),
            code_files: DashMap::new(),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Get the registry (for testing/debugging)
    pub fn registry(&self) -> &ConcurrentSchemaRegistry {
        &self.registry
    }

    /// Directory holding definitions of `scope`
    fn scope_dir(&self, scope: Scope, directory: &str, syntax_version: u8) -> PathBuf {
        match scope {
            Scope::Service => self.base.join(format!("service_v{syntax_version}")),
            Scope::User => self.base.join(directory),
        }
    }

    /// First existing `<stem>.<ext>` in `dir`
    fn resolve_file(dir: &Path, stem: &str) -> Option<PathBuf> {
        EXTENSIONS.iter().map(|ext| dir.join(format!("{stem}.{ext}"))).find(|path| {
            trace!("Probing definition file: {:?}", path);
            path.is_file()
        })
    }

    fn decode<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
        trace!("Loading definition file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .is_some_and(|ext| ext == "yaml" || ext == "yml");
        if is_yaml {
            serde_yaml::from_str(&content)
                .map_err(|e| Error::InvalidFormat(format!("{}: YAML parse error: {e}", path.display())))
        } else {
            serde_json::from_str(&content)
                .map_err(|e| Error::InvalidFormat(format!("{}: JSON parse error: {e}", path.display())))
        }
    }

    /// Definitions of a list file, read once
    fn definitions(&self, path: &Path, kind: NodeKind) -> Result<Arc<[SchemaNode]>> {
        if let Some(cached) = self.definition_files.get(path) {
            return Ok(Arc::clone(cached.value()));
        }

        let files: Vec<NodeFile> = Self::decode(path)?;
        let nodes = files
            .into_iter()
            .map(|file| file.into_node(Some(kind)))
            .collect::<Result<Vec<_>>>()?;
        info!("Loaded {} definitions from {:?}", nodes.len(), path);

        let nodes: Arc<[SchemaNode]> = nodes.into();
        Ok(Arc::clone(
            self.definition_files
                .entry(path.to_path_buf())
                .or_insert(nodes)
                .value(),
        ))
    }

    fn load_definition(
        &self,
        id: &str,
        level: Level,
        scope: Scope,
        directory: &str,
        syntax_version: u8,
    ) -> Result<SchemaNode> {
        let dir = self.scope_dir(scope, directory, syntax_version);
        let kind = level
            .node_kind()
            .ok_or_else(|| Error::NotFound(format!("\"{id}\" is not a definition identifier")))?;

        if level == Level::Message {
            let messages = dir.join(level.file_stem());
            let path = Self::resolve_file(&messages, &id.to_lowercase())
                .ok_or_else(|| missing_file(&messages.join(id.to_lowercase())))?;
            let file: NodeFile = Self::decode(&path)?;
            let node = file.into_node(Some(NodeKind::Message))?;
            info!("Loaded message definition {} from {:?}", id, path);
            return Ok(node);
        }

        let path = Self::resolve_file(&dir, level.file_stem())
            .ok_or_else(|| missing_file(&dir.join(level.file_stem())))?;
        self.definitions(&path, kind)?
            .iter()
            .find(|node| node.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("mapping identifier \"{id}\" not found")))
    }

    fn code_lists(&self, path: &Path) -> Result<Arc<[CodeListFile]>> {
        if let Some(cached) = self.code_files.get(path) {
            return Ok(Arc::clone(cached.value()));
        }
        let lists: Vec<CodeListFile> = Self::decode(path)?;
        info!("Loaded {} code lists from {:?}", lists.len(), path);
        let lists: Arc<[CodeListFile]> = lists.into();
        Ok(Arc::clone(
            self.code_files
                .entry(path.to_path_buf())
                .or_insert(lists)
                .value(),
        ))
    }
}

fn missing_file(stem: &Path) -> Error {
    Error::NotFound(format!(
        "mapping file \"{}.{{{}}}\" not found",
        stem.display(),
        EXTENSIONS.join(",")
    ))
}

impl SchemaProvider for DirectorySchemaProvider {
    fn lookup(
        &self,
        id: &str,
        directory: Option<&str>,
        syntax_version: Option<u8>,
    ) -> Result<Arc<SchemaNode>> {
        let classification = classify(id)
            .ok_or_else(|| Error::NotFound(format!("no mapping found for identifier \"{id}\"")))?;
        let directory = resolve_directory(directory);
        let syntax_version = resolve_syntax_version(syntax_version);
        let key = CacheKey::new(
            id,
            classification.level,
            classification.scope,
            directory.clone(),
            syntax_version,
        );

        if let Some(cached) = self.registry.get(&key) {
            debug!("Cache hit for definition: {} ({})", id, directory);
            return Ok(cached);
        }
        trace!("Cache miss for definition: {} ({})", id, directory);

        let node = self.load_definition(
            id,
            classification.level,
            classification.scope,
            &directory,
            syntax_version,
        )?;
        Ok(self.registry.register(key, Arc::new(node)))
    }

    fn codes_for(
        &self,
        id: &str,
        directory: Option<&str>,
        syntax_version: Option<u8>,
    ) -> Result<Arc<[Code]>> {
        let scope = code_scope(id);
        let directory = resolve_directory(directory);
        let syntax_version = resolve_syntax_version(syntax_version);
        let key = CacheKey::new(id, Level::Code, scope, directory.clone(), syntax_version);

        if let Some(cached) = self.registry.get_codes(&key) {
            debug!("Cache hit for codes: {} ({})", id, directory);
            return Ok(cached);
        }

        let stem = match scope {
            Scope::Service => format!("service_codes_v{}", syntax_version.max(3)),
            Scope::User => Level::Code.file_stem().to_string(),
        };
        let codes: Arc<[Code]> = match Self::resolve_file(&self.base.join(&directory), &stem) {
            Some(path) => self
                .code_lists(&path)?
                .iter()
                .find(|list| list.id == id)
                .map_or_else(|| Arc::from(Vec::new()), |list| list.codes.clone().into()),
            None => {
                trace!("No code list file {} in {}", stem, directory);
                Arc::from(Vec::new())
            }
        };
        Ok(self.registry.register_codes(key, codes))
    }
}
