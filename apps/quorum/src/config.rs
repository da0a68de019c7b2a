//! # Configuration
//!
//! Optional TOML file tuning the knowledge map and the CLI defaults.
//!
//! ```toml
//! [store]
//! qualifier_mode = "pooled"   # or "per_key"
//!
//! [traversal]
//! max_depth = 8
//!
//! [classifier]
//! query = "* isa {}"
//!
//! [inference]
//! passes = 1
//! ```
//!
//! Lookup order: `--config <FILE>`, then the `QUORUM_CONFIG` environment
//! variable, then built-in defaults. A missing file or section falls back
//! to defaults; an unreadable or invalid file is an error.

use quorum_core::primitives::{DEFAULT_CLASS_QUERY, MAX_TRAVERSAL_DEPTH};
use quorum_core::{KnowledgeMap, PatternTemplate, QualifierMode, QuorumError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "QUORUM_CONFIG";

/// Maximum config file size (64 KB).
const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

// =============================================================================
// SECTIONS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub qualifier_mode: QualifierMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TraversalConfig {
    /// Largest depth the CLI accepts.
    pub max_depth: usize,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self { max_depth: 8 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Membership query template; must contain a `{}` hole.
    pub query: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            query: DEFAULT_CLASS_QUERY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InferenceConfig {
    /// Passes `infer` runs when `--passes` is not given.
    pub passes: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self { passes: 1 }
    }
}

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub store: StoreConfig,
    pub traversal: TraversalConfig,
    pub classifier: ClassifierConfig,
    pub inference: InferenceConfig,
}

impl Config {
    /// Parse and validate TOML text.
    pub fn from_toml(text: &str) -> Result<Self, QuorumError> {
        let config: Self =
            toml::from_str(text).map_err(|e| QuorumError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config file and load it.
    ///
    /// `explicit` wins over `QUORUM_CONFIG`. With neither, defaults apply.
    pub fn load(explicit: Option<&Path>) -> Result<Self, QuorumError> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

        match path {
            Some(path) => Self::load_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load one file. A file that does not exist yields defaults.
    pub fn load_file(path: &Path) -> Result<Self, QuorumError> {
        if !path.exists() {
            tracing::warn!("Config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let metadata = std::fs::metadata(path)
            .map_err(|e| QuorumError::IoError(format!("Cannot read config metadata: {}", e)))?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(QuorumError::ConfigError(format!(
                "config file is {} bytes, maximum is {}",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| QuorumError::IoError(format!("Read config {:?}: {}", path, e)))?;
        let config = Self::from_toml(&text)?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Reject values the knowledge map cannot honour.
    pub fn validate(&self) -> Result<(), QuorumError> {
        if self.traversal.max_depth > MAX_TRAVERSAL_DEPTH {
            return Err(QuorumError::ConfigError(format!(
                "traversal.max_depth {} exceeds the limit of {}",
                self.traversal.max_depth, MAX_TRAVERSAL_DEPTH
            )));
        }
        self.class_template()
            .map_err(|e| QuorumError::ConfigError(format!("classifier.query: {}", e)))?;
        Ok(())
    }

    /// The configured membership template.
    pub fn class_template(&self) -> Result<PatternTemplate, QuorumError> {
        self.classifier.query.parse()
    }

    /// Fail if `depth` is beyond the configured traversal limit.
    pub fn check_depth(&self, depth: usize) -> Result<(), QuorumError> {
        if depth > self.traversal.max_depth {
            return Err(QuorumError::DepthExceeded {
                depth,
                max: self.traversal.max_depth,
            });
        }
        Ok(())
    }

    /// An empty knowledge map using the configured qualifier mode.
    pub fn knowledge_map(&self) -> KnowledgeMap {
        KnowledgeMap::with_mode(self.store.qualifier_mode)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_default() {
        assert_eq!(Config::from_toml("").expect("parse"), Config::default());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = Config::from_toml("[store]\nqualifier_mode = \"per_key\"\n").expect("parse");
        assert_eq!(config.store.qualifier_mode, QualifierMode::PerKey);
        assert_eq!(config.traversal.max_depth, 8);
        assert_eq!(config.inference.passes, 1);
    }

    #[test]
    fn depth_beyond_core_limit_is_rejected() {
        let text = format!("[traversal]\nmax_depth = {}\n", MAX_TRAVERSAL_DEPTH + 1);
        assert!(matches!(
            Config::from_toml(&text),
            Err(QuorumError::ConfigError(_))
        ));
    }

    #[test]
    fn class_query_needs_a_hole() {
        assert!(matches!(
            Config::from_toml("[classifier]\nquery = \"* isa person\"\n"),
            Err(QuorumError::ConfigError(_))
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            Config::from_toml("[store]\nmode = \"pooled\"\n"),
            Err(QuorumError::ConfigError(_))
        ));
    }

    #[test]
    fn check_depth_uses_configured_limit() {
        let config = Config::default();
        assert!(config.check_depth(8).is_ok());
        assert!(matches!(
            config.check_depth(9),
            Err(QuorumError::DepthExceeded { depth: 9, max: 8 })
        ));
    }
}
