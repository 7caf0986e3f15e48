//! Configuration file
//!
//! ```yaml
//! schema_dir: testdata/schemas
//! strict_validation: false
//! translate_codes: true
//! standard: EDIFACT
//! verbose_xml: false
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read configuration {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Settings read from the YAML configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base directory of the definition files
    pub schema_dir: Option<PathBuf>,
    pub strict_validation: bool,
    pub translate_codes: bool,
    pub standard: Option<String>,
    /// Description comments in XML output
    pub verbose_xml: bool,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        // an empty file is an empty mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config() {
        let config = Config::from_yaml(
            "schema_dir: /srv/schemas\nstrict_validation: true\ntranslate_codes: true\nstandard: edifact\nverbose_xml: true\n",
        )
        .unwrap();
        assert_eq!(config.schema_dir, Some(PathBuf::from("/srv/schemas")));
        assert!(config.strict_validation);
        assert!(config.translate_codes);
        assert_eq!(config.standard.as_deref(), Some("edifact"));
        assert!(config.verbose_xml);
    }

    #[test]
    fn test_partial_and_empty_config() {
        let config = Config::from_yaml("translate_codes: true\n").unwrap();
        assert!(config.translate_codes);
        assert!(!config.strict_validation);
        assert_eq!(config.schema_dir, None);

        assert_eq!(Config::from_yaml("  \n").unwrap(), Config::default());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(Config::from_yaml("color: neon\n").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/edi.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
