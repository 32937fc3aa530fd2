//! RDF namespace and prefix management
//!
//! This module handles namespace prefixes for compact IRI notation used in
//! schema directives (`@property(iri: "foaf:name")`).

use indexmap::IndexMap;
use oxiri::Iri;
use thiserror::Error;

/// The class-membership predicate
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// Prefix errors
#[derive(Error, Debug)]
pub enum PrefixError {
    /// Unknown prefix
    #[error("Unknown prefix: {0}")]
    UnknownPrefix(String),

    /// Invalid IRI
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),
}

pub type PrefixResult<T> = Result<T, PrefixError>;

/// Namespace manager with common prefixes
#[derive(Debug, Clone)]
pub struct NamespaceManager {
    /// Prefix → IRI mappings, in registration order
    prefixes: IndexMap<String, String>,
}

impl NamespaceManager {
    /// Create a new namespace manager with common prefixes
    pub fn new() -> Self {
        let mut mgr = Self {
            prefixes: IndexMap::new(),
        };

        mgr.add_prefix("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#");
        mgr.add_prefix("rdfs", "http://www.w3.org/2000/01/rdf-schema#");
        mgr.add_prefix("xsd", "http://www.w3.org/2001/XMLSchema#");
        mgr.add_prefix("owl", "http://www.w3.org/2002/07/owl#");
        mgr.add_prefix("foaf", "http://xmlns.com/foaf/0.1/");
        mgr.add_prefix("dc", "http://purl.org/dc/elements/1.1/");
        mgr.add_prefix("dcterms", "http://purl.org/dc/terms/");
        mgr.add_prefix("schema", "http://schema.org/");
        mgr.add_prefix("vcard", "http://www.w3.org/2006/vcard/ns#");
        mgr.add_prefix("ldp", "http://www.w3.org/ns/ldp#");
        mgr.add_prefix("solid", "http://www.w3.org/ns/solid/terms#");

        mgr
    }

    /// Add a prefix, replacing any previous mapping
    pub fn add_prefix(&mut self, prefix: impl Into<String>, iri: impl Into<String>) {
        self.prefixes.insert(prefix.into(), iri.into());
    }

    /// Get IRI for a prefix
    pub fn get_iri(&self, prefix: &str) -> PrefixResult<&str> {
        self.prefixes
            .get(prefix)
            .map(|s| s.as_str())
            .ok_or_else(|| PrefixError::UnknownPrefix(prefix.to_string()))
    }

    /// Expand a compact IRI (prefix:local) to full IRI
    pub fn expand(&self, compact_iri: &str) -> PrefixResult<String> {
        if let Some((prefix, local)) = compact_iri.split_once(':') {
            let iri = self.get_iri(prefix)?;
            Ok(format!("{}{}", iri, local))
        } else {
            Err(PrefixError::InvalidIri(compact_iri.to_string()))
        }
    }

    /// Resolve a directive value to an absolute IRI.
    ///
    /// Values whose prefix is registered are expanded; anything else must
    /// already be an absolute IRI.
    pub fn resolve(&self, value: &str) -> PrefixResult<String> {
        if let Some((prefix, local)) = value.split_once(':') {
            if !local.starts_with("//") && self.prefixes.contains_key(prefix) {
                return self.expand(value);
            }
        }
        Iri::parse(value)
            .map(|iri| iri.into_inner().to_string())
            .map_err(|e| PrefixError::InvalidIri(format!("{value}: {e}")))
    }
}

impl Default for NamespaceManager {
    fn default() -> Self {
        Self::new()
    }
}
