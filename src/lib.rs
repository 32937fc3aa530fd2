//! SDX: GraphQL queries over RDF documents
//!
//! A schema annotates object types with an RDF class (`@is(class: ...)`)
//! and fields with a role (`@identifier`, `@property(iri: ...)`). Queries
//! are answered by fetching the document behind each root field once and
//! extracting, field by field, the closed subgraph each value needs.
//!
//! # Architecture
//!
//! - [`rdf`]: terms, quad store, namespaces and RDF syntaxes
//! - [`schema`]: SDL loader and the metadata side table
//! - [`resolver`]: fetcher, subgraph extractor and field dispatcher
//! - [`query`]: query documents, validation and execution
//! - [`client`]: the facade tying them together
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use sdx::{Request, ResolverConfig, SdxClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SdxClient::from_sdl(
//!     r#"type Query { person(id: ID): Person }
//!        type Person @is(class: "foaf:Person") {
//!          id: ID @identifier
//!          name: String @property(iri: "foaf:name")
//!        }"#,
//!     ResolverConfig::with_location("https://example.org/card.ttl"),
//! )?;
//!
//! let request = Request::new("query($id: ID!) { person(id: $id) { name } }")
//!     .variable("id", "https://example.org/card.ttl#me");
//! let response = client.execute(request).await;
//! assert!(response.is_ok());
//! # Ok(())
//! # }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod error;
pub mod query;
pub mod rdf;
pub mod resolver;
pub mod schema;

// Re-export main types for convenience
pub use client::{ClientError, ClientResult, SdxClient};

pub use config::{ConfigError, ConfigResult, ExtractionConfig, FetchConfig, ResolverConfig};

pub use error::{ResolveError, ResolveResult};

pub use query::{
    parse_query, ExecutionError, GraphQLError, PathSegment, QueryExecutor, QueryParseError,
    Request, Response,
};

pub use rdf::{
    BlankNode, Literal, NamedNode, NamespaceManager, Quad, QuadStore, RdfFormat, RdfObject,
    RdfParser, RdfPredicate, RdfSubject, RdfTerm,
};

pub use resolver::{
    Cancellation, FetchError, FieldResolver, FieldShape, GraphFetcher, HttpGraphFetcher,
    Resolved, SubgraphExtractor,
};

pub use schema::{Schema, SchemaError, SchemaMetadataIndex};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
