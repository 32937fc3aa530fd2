//! Query execution
//!
//! Walks the selection tree of one query operation, calling the field
//! resolver once per field. Sibling fields and list elements run
//! concurrently; output keeps selection and list order. A failed field is
//! `null` at its path with an error entry, and its siblings are unaffected.

pub mod coerce;
pub mod response;
mod validation;

pub use response::{ErrorExtensions, GraphQLError, PathSegment, Response};

use crate::query::ast::{Document, Field, OperationKind, Selection, TypeRef};
use crate::query::parser::{parse_query, QueryParseError};
use crate::rdf::QuadStore;
use crate::resolver::{Cancellation, FieldResolver, ResolutionContext, Resolved, Source};
use crate::error::{ResolveError, ResolveResult};
use crate::schema::{FieldDefinition, Schema};
use coerce::{check_input, coerce_scalar, value_to_json};
use futures::future::{join_all, BoxFuture, FutureExt};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Request-level errors; the response carries `data: null`
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("{0}")]
    Parse(#[from] QueryParseError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Operation '{0}' is not supported")]
    UnsupportedOperation(OperationKind),

    #[error("Unknown operation{}", .0.as_ref().map(|n| format!(" '{}'", n)).unwrap_or_else(|| ": an operation name is required".to_string()))]
    UnknownOperation(Option<String>),

    #[error("Variable '${name}': {reason}")]
    InvalidVariable { name: String, reason: String },
}

pub type ExecutionResult<T> = Result<T, ExecutionError>;

impl ExecutionError {
    pub fn code(&self) -> &'static str {
        match self {
            ExecutionError::Parse(_) => response::GRAPHQL_PARSE_FAILED,
            ExecutionError::Validation(_) | ExecutionError::UnknownOperation(_) => {
                response::GRAPHQL_VALIDATION_FAILED
            }
            ExecutionError::UnsupportedOperation(_) => response::OPERATION_NOT_SUPPORTED,
            ExecutionError::InvalidVariable { .. } => response::BAD_USER_INPUT,
        }
    }
}

/// A query request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Request {
    pub query: String,
    pub operation_name: Option<String>,
    pub variables: JsonMap<String, JsonValue>,
    /// Document location for every root field of this request
    pub location: Option<String>,
    #[serde(skip)]
    pub cancellation: Cancellation,
}

impl Request {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    pub fn variable(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }
}

/// Per-request state shared by every field resolution
struct ExecutionContext<'a> {
    document: &'a Document,
    variables: &'a JsonMap<String, JsonValue>,
    location: Option<&'a str>,
    cancellation: &'a Cancellation,
}

type Completed = (JsonValue, Vec<GraphQLError>);

/// Executes query documents against a schema through a field resolver
pub struct QueryExecutor {
    schema: Arc<Schema>,
    resolver: Arc<FieldResolver>,
}

impl QueryExecutor {
    pub fn new(schema: Arc<Schema>, resolver: Arc<FieldResolver>) -> Self {
        Self { schema, resolver }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Execute a request; request-level failures become a `data: null` response
    pub async fn execute(&self, request: &Request) -> Response {
        match self.try_execute(request).await {
            Ok(response) => response,
            Err(err) => {
                debug!("Request rejected: {}", err);
                Response::request_error(GraphQLError::new(err.to_string(), Vec::new(), err.code()))
            }
        }
    }

    async fn try_execute(&self, request: &Request) -> ExecutionResult<Response> {
        let document = parse_query(&request.query)?;
        let operation = document
            .operation(request.operation_name.as_deref())
            .ok_or_else(|| ExecutionError::UnknownOperation(request.operation_name.clone()))?;

        if operation.kind != OperationKind::Query {
            return Err(ExecutionError::UnsupportedOperation(operation.kind));
        }

        let root_type = self.schema.query_type();
        validation::validate_operation(&self.schema, &document, operation, root_type)?;

        let mut variables = JsonMap::new();
        for definition in &operation.variables {
            let value = match request.variables.get(&definition.name) {
                Some(value) => value.clone(),
                None => definition
                    .default_value
                    .as_ref()
                    .map(|v| value_to_json(v, &JsonMap::new()))
                    .unwrap_or(JsonValue::Null),
            };
            check_input(&definition.ty, &value).map_err(|reason| {
                ExecutionError::InvalidVariable {
                    name: definition.name.clone(),
                    reason,
                }
            })?;
            variables.insert(definition.name.clone(), value);
        }

        let ctx = ExecutionContext {
            document: &document,
            variables: &variables,
            location: request.location.as_deref(),
            cancellation: &request.cancellation,
        };

        let selections: Vec<&Selection> = operation.selection_set.iter().collect();
        let source: Source = Arc::new(QuadStore::new());
        let (data, errors) = self
            .execute_selection_set(&ctx, root_type, selections, source, Vec::new())
            .await;

        Ok(Response::new(data, errors))
    }

    fn execute_selection_set<'a>(
        &'a self,
        ctx: &'a ExecutionContext<'a>,
        type_name: &'a str,
        selections: Vec<&'a Selection>,
        source: Source,
        path: Vec<PathSegment>,
    ) -> BoxFuture<'a, Completed> {
        async move {
            let mut grouped: IndexMap<&'a str, Vec<&'a Field>> = IndexMap::new();
            collect_fields(ctx.document, type_name, &selections, &mut HashSet::new(), &mut grouped);

            let futures = grouped.into_iter().map(|(key, fields)| {
                let mut field_path = path.clone();
                field_path.push(PathSegment::Key(key.to_string()));
                let source = source.clone();
                async move {
                    let completed = self
                        .execute_field(ctx, type_name, &fields, source, field_path)
                        .await;
                    (key, completed)
                }
            });

            let mut object = JsonMap::new();
            let mut errors = Vec::new();
            for (key, (value, field_errors)) in join_all(futures).await {
                object.insert(key.to_string(), value);
                errors.extend(field_errors);
            }
            (JsonValue::Object(object), errors)
        }
        .boxed()
    }

    async fn execute_field<'a>(
        &'a self,
        ctx: &'a ExecutionContext<'a>,
        parent_type: &'a str,
        fields: &[&'a Field],
        source: Source,
        path: Vec<PathSegment>,
    ) -> Completed {
        let field = fields[0];
        if field.name == "__typename" {
            return (JsonValue::String(parent_type.to_string()), Vec::new());
        }

        let Some(definition) = self.schema.field(parent_type, &field.name) else {
            let error = GraphQLError::new(
                format!("Cannot query field '{}' on type '{}'", field.name, parent_type),
                path,
                response::GRAPHQL_VALIDATION_FAILED,
            );
            return (JsonValue::Null, vec![error]);
        };

        let identifier = match identifier_argument(field, definition, ctx.variables) {
            Ok(identifier) => identifier,
            Err(err) => return (JsonValue::Null, vec![GraphQLError::from_resolve(&err, path)]),
        };

        let resolution = ResolutionContext {
            parent_type,
            field_name: &field.name,
            return_type: &definition.ty,
            source,
            identifier,
            location: ctx.location,
            cancellation: ctx.cancellation,
        };

        match self.resolver.resolve(resolution).await {
            Ok(resolved) => {
                let selections: Vec<&'a Selection> =
                    fields.iter().flat_map(|f| f.selection_set.iter()).collect();
                self.complete_value(ctx, &definition.ty, resolved, selections, path)
                    .await
            }
            Err(err) => {
                warn!(
                    parent = parent_type,
                    field = field.name.as_str(),
                    code = err.code(),
                    "Field resolution failed: {}",
                    err
                );
                (JsonValue::Null, vec![GraphQLError::from_resolve(&err, path)])
            }
        }
    }

    async fn complete_value<'a>(
        &'a self,
        ctx: &'a ExecutionContext<'a>,
        ty: &'a TypeRef,
        resolved: Resolved,
        selections: Vec<&'a Selection>,
        path: Vec<PathSegment>,
    ) -> Completed {
        let type_name = ty.named_type();

        let (value, mut errors) = match resolved {
            Resolved::Passthrough(_) | Resolved::Scalar(None) => {
                (JsonValue::Null, Vec::new())
            }
            Resolved::Scalar(Some(term)) => match coerce_scalar(type_name, &term) {
                Ok(value) => (value, Vec::new()),
                Err(message) => (
                    JsonValue::Null,
                    vec![GraphQLError::new(message, path.clone(), response::COERCION_FAILED)],
                ),
            },
            Resolved::Scalars(terms) => {
                let mut errors = Vec::new();
                let items = terms
                    .iter()
                    .enumerate()
                    .map(|(i, term)| {
                        coerce_scalar(type_name, term).unwrap_or_else(|message| {
                            let mut item_path = path.clone();
                            item_path.push(PathSegment::Index(i));
                            errors.push(GraphQLError::new(message, item_path, response::COERCION_FAILED));
                            JsonValue::Null
                        })
                    })
                    .collect();
                (JsonValue::Array(items), errors)
            }
            Resolved::Subgraph(source) => {
                self.execute_selection_set(ctx, type_name, selections, source, path.clone())
                    .await
            }
            Resolved::Subgraphs(parts) => {
                let futures = parts.into_iter().enumerate().map(|(i, part)| {
                    let mut item_path = path.clone();
                    item_path.push(PathSegment::Index(i));
                    self.execute_selection_set(ctx, type_name, selections.clone(), part, item_path)
                });

                let mut items = Vec::new();
                let mut errors = Vec::new();
                for (value, item_errors) in join_all(futures).await {
                    items.push(value);
                    errors.extend(item_errors);
                }
                (JsonValue::Array(items), errors)
            }
        };

        if value.is_null() && ty.is_non_null() && errors.is_empty() {
            errors.push(GraphQLError::new(
                format!("Cannot return null for non-nullable type '{}'", ty),
                path,
                response::NON_NULL_VIOLATION,
            ));
        }
        (value, errors)
    }
}

/// Group fields by response key, expanding fragments that apply to the type
fn collect_fields<'a>(
    document: &'a Document,
    type_name: &str,
    selections: &[&'a Selection],
    visited: &mut HashSet<&'a str>,
    out: &mut IndexMap<&'a str, Vec<&'a Field>>,
) {
    for &selection in selections {
        match selection {
            Selection::Field(field) => {
                out.entry(field.response_key()).or_default().push(field);
            }
            Selection::FragmentSpread(name) => {
                if !visited.insert(name.as_str()) {
                    continue;
                }
                if let Some(fragment) = document.fragments.get(name) {
                    if fragment.type_condition == type_name {
                        let inner: Vec<&Selection> = fragment.selection_set.iter().collect();
                        collect_fields(document, type_name, &inner, visited, out);
                    }
                }
            }
            Selection::InlineFragment {
                type_condition,
                selection_set,
            } => {
                if type_condition.as_deref().map_or(true, |t| t == type_name) {
                    let inner: Vec<&Selection> = selection_set.iter().collect();
                    collect_fields(document, type_name, &inner, visited, out);
                }
            }
        }
    }
}

/// The `id` argument as an identifier filter, falling back to its default
fn identifier_argument(
    field: &Field,
    definition: &FieldDefinition,
    variables: &JsonMap<String, JsonValue>,
) -> ResolveResult<Option<String>> {
    let value = match field.arguments.get("id") {
        Some(value) => value_to_json(value, variables),
        None => definition
            .arguments
            .get("id")
            .and_then(|argument| argument.default_value.as_ref())
            .map(|value| value_to_json(value, variables))
            .unwrap_or(JsonValue::Null),
    };

    match value {
        JsonValue::Null => Ok(None),
        JsonValue::String(s) => Ok(Some(s)),
        JsonValue::Number(n) => Ok(Some(n.to_string())),
        other => Err(ResolveError::InvalidArgument {
            argument: "id".to_string(),
            reason: format!("expected an identifier, got {}", other),
        }),
    }
}
