//! Resolver configuration
//!
//! Loadable from YAML; every section has defaults so a file only needs the
//! keys it changes.

use crate::rdf::NamespaceManager;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Document retrieval settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: format!("sdx/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Subgraph extraction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Worker threads for per-instance extraction (0 = rayon's global pool)
    pub worker_threads: usize,
    /// Minimum instance count before extraction runs in parallel
    pub parallel_threshold: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            parallel_threshold: 64,
        }
    }
}

/// Top-level resolver configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Default document location for root fields
    pub location: Option<String>,
    /// Per-root-field document locations (field name -> location)
    pub field_locations: IndexMap<String, String>,
    /// Extra namespace prefixes for compact IRIs in schema directives
    pub prefixes: IndexMap<String, String>,
    /// Fail with `AmbiguousSubject` instead of taking the first subject
    pub strict_subjects: bool,
    pub fetch: FetchConfig,
    pub extraction: ExtractionConfig,
}

impl ResolverConfig {
    /// Configuration with a default document location
    pub fn with_location(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..Default::default()
        }
    }

    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Document location for a root field, before any request override
    pub fn location_for(&self, field: &str) -> Option<&str> {
        self.field_locations
            .get(field)
            .or(self.location.as_ref())
            .map(|s| s.as_str())
    }

    /// Default prefixes plus the configured ones
    pub fn namespace_manager(&self) -> NamespaceManager {
        let mut namespaces = NamespaceManager::new();
        for (prefix, iri) in &self.prefixes {
            namespaces.add_prefix(prefix.clone(), iri.clone());
        }
        namespaces
    }
}
