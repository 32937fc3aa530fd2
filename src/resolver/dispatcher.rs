//! Field resolution dispatcher
//!
//! Invoked once per field during execution. Root fields fetch the document
//! and extract the root class; every other field works on the quads handed
//! down by its parent.

use super::classify::{classify, FieldShape};
use super::extractor::SubgraphExtractor;
use super::fetch::GraphFetcher;
use super::{Cancellation, Source};
use crate::config::ResolverConfig;
use crate::error::{ResolveError, ResolveResult};
use crate::query::ast::TypeRef;
use crate::rdf::{rdf_type, NamedNode, QuadStore, RdfObject, RdfPredicate, RdfSubject, RdfTerm};
use crate::schema::{FieldRole, SchemaMetadataIndex};
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything one field resolution sees
#[derive(Debug, Clone)]
pub struct ResolutionContext<'a> {
    pub parent_type: &'a str,
    pub field_name: &'a str,
    pub return_type: &'a TypeRef,
    /// Quads handed down by the parent; ignored by root fields
    pub source: Source,
    /// Identifier filter from the `id` argument
    pub identifier: Option<String>,
    /// Per-request document location override
    pub location: Option<&'a str>,
    pub cancellation: &'a Cancellation,
}

/// Outcome of one field resolution
#[derive(Debug, Clone)]
pub enum Resolved {
    /// Quads of one entity, the source of its own fields
    Subgraph(Source),
    /// One subgraph per list element
    Subgraphs(Vec<Source>),
    Scalar(Option<RdfTerm>),
    Scalars(Vec<RdfTerm>),
    /// Unspecified field: the incoming source, unchanged
    Passthrough(Source),
}

/// Resolves fields against fetched quads using the schema metadata index
pub struct FieldResolver {
    index: Arc<SchemaMetadataIndex>,
    fetcher: Arc<dyn GraphFetcher>,
    extractor: SubgraphExtractor,
    config: Arc<ResolverConfig>,
}

impl FieldResolver {
    pub fn new(
        index: Arc<SchemaMetadataIndex>,
        fetcher: Arc<dyn GraphFetcher>,
        config: Arc<ResolverConfig>,
    ) -> Self {
        Self {
            extractor: SubgraphExtractor::new(&config.extraction),
            index,
            fetcher,
            config,
        }
    }

    pub fn index(&self) -> &SchemaMetadataIndex {
        &self.index
    }

    pub fn extractor(&self) -> &SubgraphExtractor {
        &self.extractor
    }

    /// Shape of a field, read from the metadata index
    pub fn shape(&self, parent_type: &str, field_name: &str, return_type: &TypeRef) -> FieldShape {
        classify(
            self.index.is_root_type(parent_type),
            return_type,
            self.index.is_scalar(return_type.named_type()),
            self.index.field_role(parent_type, field_name),
        )
    }

    /// Resolve one field
    pub async fn resolve(&self, ctx: ResolutionContext<'_>) -> ResolveResult<Resolved> {
        if ctx.cancellation.is_cancelled() {
            return Err(ResolveError::Cancelled);
        }

        let shape = self.shape(ctx.parent_type, ctx.field_name, ctx.return_type);
        debug!(
            parent = ctx.parent_type,
            field = ctx.field_name,
            ?shape,
            "Resolving field"
        );

        match shape {
            FieldShape::RootEntry(inner) => self.resolve_root(&ctx, &inner).await,
            shape => self.resolve_nested(&ctx, &shape).await,
        }
    }

    async fn resolve_root(
        &self,
        ctx: &ResolutionContext<'_>,
        inner: &FieldShape,
    ) -> ResolveResult<Resolved> {
        let class_iri = self.class_iri(ctx.return_type.named_type())?;
        let location = self.location_for(ctx)?;

        let quads = Arc::new(self.fetcher.fetch(&location).await?);
        let subgraph = self
            .extract_blocking(quads, class_iri, ctx.identifier.clone(), ctx.cancellation)
            .await?;

        let missing = || ResolveError::MissingSubject {
            class_iri: class_iri.as_str().to_string(),
            identifier: ctx.identifier.clone(),
        };

        match inner {
            FieldShape::ListOfObject => {
                if subgraph.is_empty() && ctx.identifier.is_some() {
                    return Err(missing());
                }
                let parts = self
                    .extract_all_blocking(Arc::new(subgraph), class_iri, ctx.cancellation)
                    .await?;
                Ok(Resolved::Subgraphs(parts.into_iter().map(Arc::new).collect()))
            }
            _ => {
                if subgraph.is_empty() {
                    return Err(missing());
                }
                Ok(Resolved::Subgraph(Arc::new(subgraph)))
            }
        }
    }

    async fn resolve_nested(
        &self,
        ctx: &ResolutionContext<'_>,
        shape: &FieldShape,
    ) -> ResolveResult<Resolved> {
        let role = self.index.field_role(ctx.parent_type, ctx.field_name);

        match (shape, role) {
            (FieldShape::ListOfScalar, FieldRole::Property(iri)) => {
                let subject = self.enclosing_subject(&ctx.source, ctx.parent_type)?;
                let predicate = RdfPredicate::from(iri.clone());
                let values = ctx
                    .source
                    .objects(Some(&subject), Some(&predicate), None)
                    .into_iter()
                    .map(RdfTerm::from)
                    .collect();
                Ok(Resolved::Scalars(values))
            }
            (FieldShape::ListOfObject, _) => {
                let class_iri = self.class_iri(ctx.return_type.named_type())?;
                let parts = self
                    .extract_all_blocking(ctx.source.clone(), class_iri, ctx.cancellation)
                    .await?;
                Ok(Resolved::Subgraphs(parts.into_iter().map(Arc::new).collect()))
            }
            (FieldShape::SingleScalar, FieldRole::Identifier) => {
                let subject = self.enclosing_subject(&ctx.source, ctx.parent_type)?;
                Ok(Resolved::Scalar(Some(subject.into())))
            }
            (FieldShape::SingleScalar, FieldRole::Property(iri)) => {
                let subject = self.enclosing_subject(&ctx.source, ctx.parent_type)?;
                let predicate = RdfPredicate::from(iri.clone());
                let value = ctx
                    .source
                    .objects(Some(&subject), Some(&predicate), None)
                    .into_iter()
                    .next()
                    .map(RdfTerm::from);
                Ok(Resolved::Scalar(value))
            }
            (FieldShape::SingleObject, _) => {
                let class_iri = self.class_iri(ctx.return_type.named_type())?;
                let subgraph = self
                    .extract_blocking(ctx.source.clone(), class_iri, None, ctx.cancellation)
                    .await?;
                if subgraph.is_empty() {
                    return Err(ResolveError::MissingSubject {
                        class_iri: class_iri.as_str().to_string(),
                        identifier: None,
                    });
                }
                Ok(Resolved::Subgraph(Arc::new(subgraph)))
            }
            _ => {
                warn!(
                    parent = ctx.parent_type,
                    field = ctx.field_name,
                    "Field has no RDF metadata for its shape, passing source through"
                );
                Ok(Resolved::Passthrough(ctx.source.clone()))
            }
        }
    }

    /// `extract` on the blocking pool, keeping async workers free
    async fn extract_blocking(
        &self,
        source: Source,
        class_iri: &NamedNode,
        identifier: Option<String>,
        cancellation: &Cancellation,
    ) -> ResolveResult<QuadStore> {
        let extractor = self.extractor.clone();
        let class_iri = class_iri.clone();
        let cancellation = cancellation.clone();
        tokio::task::spawn_blocking(move || {
            extractor.extract(&source, &class_iri, identifier.as_deref(), &cancellation)
        })
        .await
        .map_err(|e| ResolveError::Task(e.to_string()))?
    }

    /// `extract_all` on the blocking pool; rayon fans out from there
    async fn extract_all_blocking(
        &self,
        source: Source,
        class_iri: &NamedNode,
        cancellation: &Cancellation,
    ) -> ResolveResult<Vec<QuadStore>> {
        let extractor = self.extractor.clone();
        let class_iri = class_iri.clone();
        let cancellation = cancellation.clone();
        tokio::task::spawn_blocking(move || {
            extractor.extract_all(&source, &class_iri, &cancellation)
        })
        .await
        .map_err(|e| ResolveError::Task(e.to_string()))?
    }

    fn class_iri(&self, type_name: &str) -> ResolveResult<&NamedNode> {
        self.index
            .class_iri_of(type_name)
            .ok_or_else(|| ResolveError::MissingClassMetadata {
                type_name: type_name.to_string(),
            })
    }

    /// Request override, then the field's configured location, then the default
    fn location_for(&self, ctx: &ResolutionContext<'_>) -> ResolveResult<String> {
        ctx.location
            .or_else(|| self.config.location_for(ctx.field_name))
            .map(String::from)
            .ok_or_else(|| ResolveError::MissingLocation {
                field: ctx.field_name.to_string(),
            })
    }

    /// First subject typed with the parent's class
    fn enclosing_subject(&self, source: &Source, parent_type: &str) -> ResolveResult<RdfSubject> {
        let class_iri = self.class_iri(parent_type)?;
        let class = RdfObject::from(class_iri.clone());
        let mut subjects = source.subjects(Some(&rdf_type()), Some(&class), None);

        if subjects.len() > 1 {
            if self.config.strict_subjects {
                return Err(ResolveError::AmbiguousSubject {
                    class_iri: class_iri.as_str().to_string(),
                    count: subjects.len(),
                });
            }
            warn!(
                class = class_iri.as_str(),
                count = subjects.len(),
                "Several subjects match, using the first"
            );
        }

        if subjects.is_empty() {
            return Err(ResolveError::MissingSubject {
                class_iri: class_iri.as_str().to_string(),
                identifier: None,
            });
        }
        Ok(subjects.swap_remove(0))
    }
}
