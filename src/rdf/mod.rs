//! RDF support
//!
//! This module implements the quad side of resolution:
//! - RDF terms and quads (named graphs optional)
//! - An ordered, indexed in-memory quad store with wildcard lookups
//! - Document parsing (Turtle, N-Triples, N-Quads, TriG, RDF/XML)
//! - Namespace prefixes for compact IRIs
//!
//! # Example
//!
//! ```rust
//! use sdx::rdf::{QuadStore, Quad, NamedNode, Literal, RdfPredicate};
//!
//! let mut store = QuadStore::new();
//!
//! let subject = NamedNode::new("http://example.org/alice").unwrap();
//! let predicate = RdfPredicate::new("http://xmlns.com/foaf/0.1/name").unwrap();
//! let object = Literal::new_simple_literal("Alice");
//!
//! store.insert(Quad::triple(subject.clone().into(), predicate.clone(), object.into()));
//!
//! let names = store.objects(Some(&subject.into()), Some(&predicate), None);
//! assert_eq!(names[0].value(), "Alice");
//! ```

mod namespace;
mod serialization;
mod store;
mod types;

pub use types::{
    BlankNode, Literal, NamedNode, Quad, RdfError, RdfObject, RdfPredicate,
    RdfResult, RdfSubject, RdfTerm,
};

pub use store::QuadStore;

pub use namespace::{NamespaceManager, PrefixError, PrefixResult, RDF_TYPE};

pub use serialization::{ParseError, ParseResult, RdfFormat, RdfParser};

/// The `rdf:type` predicate
pub fn rdf_type() -> RdfPredicate {
    RdfPredicate::from(NamedNode::from(oxrdf::vocab::rdf::TYPE.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rdf_module_exports() {
        let _store: QuadStore = QuadStore::new();
        let _ns_mgr = NamespaceManager::new();
        assert_eq!(rdf_type().as_str(), RDF_TYPE);
    }
}
