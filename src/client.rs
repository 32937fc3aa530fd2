//! Client facade
//!
//! Wires a schema, its metadata index, a fetcher and the executor together.
//!
//! ```rust,no_run
//! use sdx::{ResolverConfig, SdxClient};
//!
//! # async fn run() -> Result<(), sdx::ClientError> {
//! let client = SdxClient::from_sdl(
//!     r#"type Query { people: [Person] }
//!        type Person @is(class: "http://xmlns.com/foaf/0.1/Person") {
//!          name: String @property(iri: "http://xmlns.com/foaf/0.1/name")
//!        }"#,
//!     ResolverConfig::with_location("https://example.org/people.ttl"),
//! )?;
//!
//! let response = client.query("{ people { name } }").await;
//! println!("{}", serde_json::to_string_pretty(&response).unwrap());
//! # Ok(())
//! # }
//! ```

use crate::config::ResolverConfig;
use crate::error::ResolveError;
use crate::query::{QueryExecutor, Request, Response};
use crate::rdf::QuadStore;
use crate::resolver::{Cancellation, FetchError, FieldResolver, GraphFetcher, HttpGraphFetcher};
use crate::schema::{Schema, SchemaError, SchemaMetadataIndex};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Fetcher error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Resolution error: {0}")]
    Resolve(#[from] ResolveError),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Query client over one schema and a default document location
pub struct SdxClient {
    schema: Arc<Schema>,
    index: Arc<SchemaMetadataIndex>,
    fetcher: Arc<dyn GraphFetcher>,
    resolver: Arc<FieldResolver>,
    executor: QueryExecutor,
    config: Arc<ResolverConfig>,
}

impl SdxClient {
    /// Client fetching documents over HTTP or from disk
    pub fn new(schema: Schema, config: ResolverConfig) -> ClientResult<Self> {
        let fetcher = HttpGraphFetcher::new(&config.fetch)?;
        Self::with_fetcher(schema, config, Arc::new(fetcher))
    }

    /// Client over SDL text
    pub fn from_sdl(sdl: &str, config: ResolverConfig) -> ClientResult<Self> {
        Self::new(Schema::parse(sdl)?, config)
    }

    /// Client with a caller-provided fetcher
    pub fn with_fetcher(
        schema: Schema,
        config: ResolverConfig,
        fetcher: Arc<dyn GraphFetcher>,
    ) -> ClientResult<Self> {
        let index = Arc::new(SchemaMetadataIndex::build(&schema, &config.namespace_manager())?);
        debug!(location = ?config.location, "Creating client");

        let schema = Arc::new(schema);
        let config = Arc::new(config);
        let resolver = Arc::new(FieldResolver::new(index.clone(), fetcher.clone(), config.clone()));
        let executor = QueryExecutor::new(schema.clone(), resolver.clone());

        Ok(Self {
            schema,
            index,
            fetcher,
            resolver,
            executor,
            config,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn index(&self) -> &SchemaMetadataIndex {
        &self.index
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Run a query against the configured locations
    pub async fn query(&self, query: &str) -> Response {
        self.executor.execute(&Request::new(query)).await
    }

    pub async fn execute(&self, request: Request) -> Response {
        self.executor.execute(&request).await
    }

    /// Fetch a document and extract the closed subgraph of a type's instances
    pub async fn extract(
        &self,
        location: &str,
        type_name: &str,
        identifier: Option<&str>,
    ) -> ClientResult<QuadStore> {
        let class_iri =
            self.index
                .class_iri_of(type_name)
                .ok_or_else(|| ResolveError::MissingClassMetadata {
                    type_name: type_name.to_string(),
                })?;

        let quads = self.fetcher.fetch(location).await.map_err(ResolveError::from)?;
        let subgraph = self.resolver.extractor().extract(
            &quads,
            class_iri,
            identifier,
            &Cancellation::new(),
        )?;
        Ok(subgraph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::{rdf_type, Literal, NamedNode, Quad};
    use crate::resolver::fetch::FetchResult;
    use async_trait::async_trait;
    use serde::Deserialize;

    const SCHEMA: &str = r#"
        type Query { people: [Person] person(id: ID): Person }
        type Person @is(class: "ex:Person") {
          id: ID @identifier
          name: String @property(iri: "ex:name")
        }
    "#;

    struct MemoryFetcher;

    #[async_trait]
    impl GraphFetcher for MemoryFetcher {
        async fn fetch(&self, _location: &str) -> FetchResult<QuadStore> {
            let person = NamedNode::new("http://example.org/Person").unwrap();
            let name = NamedNode::new("http://example.org/name").unwrap();
            let mut store = QuadStore::new();
            for (iri, label) in [("http://example.org/alice", "Alice"), ("http://example.org/bob", "Bob")] {
                let subject = NamedNode::new(iri).unwrap();
                store.insert(Quad::triple(subject.clone().into(), rdf_type(), person.clone().into()));
                store.insert(Quad::triple(
                    subject.into(),
                    name.clone().into(),
                    Literal::new_simple_literal(label).into(),
                ));
            }
            Ok(store)
        }
    }

    fn client() -> SdxClient {
        let mut config = ResolverConfig::with_location("memory");
        config
            .prefixes
            .insert("ex".to_string(), "http://example.org/".to_string());
        SdxClient::with_fetcher(Schema::parse(SCHEMA).unwrap(), config, Arc::new(MemoryFetcher))
            .unwrap()
    }

    #[tokio::test]
    async fn test_query_with_prefixed_metadata() {
        #[derive(Deserialize)]
        struct Person {
            name: String,
        }
        #[derive(Deserialize)]
        struct Data {
            people: Vec<Person>,
        }

        let response = client().query("{ people { name } }").await;
        assert!(response.is_ok(), "{:?}", response.errors);
        let data: Data = response.data_as().unwrap();
        let names: Vec<_> = data.people.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
    }

    #[tokio::test]
    async fn test_extract_by_type_name() {
        let client = client();
        let subgraph = client
            .extract("memory", "Person", Some("http://example.org/bob"))
            .await
            .unwrap();
        assert_eq!(subgraph.len(), 2);

        let err = client.extract("memory", "Query", None).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Resolve(ResolveError::MissingClassMetadata { .. })
        ));
    }

    #[test]
    fn test_invalid_class_iri_fails_construction() {
        let schema = Schema::parse(r#"
            type Query { people: [Person] }
            type Person @is(class: "not an iri") { name: String }
        "#)
        .unwrap();
        let result = SdxClient::with_fetcher(
            schema,
            ResolverConfig::with_location("memory"),
            Arc::new(MemoryFetcher),
        );
        assert!(matches!(result, Err(ClientError::Schema(_))));
    }
}
