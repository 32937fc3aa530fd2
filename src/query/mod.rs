//! Query processing module
//!
//! GraphQL query documents: parsing, validation and execution.
//!
//! - [`parser`]: Pest grammar for executable documents and SDL
//! - [`ast`]: document model shared with the schema loader
//! - [`executor`]: concurrent field execution producing `{ data, errors }`

pub mod ast;
pub mod executor;
pub mod parser;

// Re-export main types
pub use ast::{Document, OperationKind, TypeRef, Value};
pub use executor::{
    ExecutionError, ExecutionResult, GraphQLError, PathSegment, QueryExecutor, Request, Response,
};
pub use parser::{parse_query, QueryParseError, QueryParseResult};
