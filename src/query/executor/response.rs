//! Execution results: `{ data, errors }`

use crate::error::ResolveError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

pub const GRAPHQL_PARSE_FAILED: &str = "GRAPHQL_PARSE_FAILED";
pub const GRAPHQL_VALIDATION_FAILED: &str = "GRAPHQL_VALIDATION_FAILED";
pub const OPERATION_NOT_SUPPORTED: &str = "OPERATION_NOT_SUPPORTED";
pub const BAD_USER_INPUT: &str = "BAD_USER_INPUT";
pub const NON_NULL_VIOLATION: &str = "NON_NULL_VIOLATION";
pub const COERCION_FAILED: &str = "COERCION_FAILED";

/// One step of a response path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(i) => write!(f, "{}", i),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorExtensions {
    pub code: String,
}

/// Error entry of a response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<PathSegment>,
    pub extensions: ErrorExtensions,
}

impl GraphQLError {
    pub fn new(message: impl Into<String>, path: Vec<PathSegment>, code: &str) -> Self {
        Self {
            message: message.into(),
            path,
            extensions: ErrorExtensions {
                code: code.to_string(),
            },
        }
    }

    /// Field error for a failed resolution
    pub fn from_resolve(err: &ResolveError, path: Vec<PathSegment>) -> Self {
        Self::new(err.to_string(), path, err.code())
    }

    pub fn code(&self) -> &str {
        &self.extensions.code
    }

    /// Dotted path, e.g. `people.1.name`
    pub fn path_string(&self) -> String {
        self.path
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Result of executing a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// `null` when the request failed before execution
    pub data: JsonValue,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLError>,
}

impl Response {
    pub fn new(data: JsonValue, errors: Vec<GraphQLError>) -> Self {
        Self { data, errors }
    }

    /// Response for a request that never reached execution
    pub fn request_error(error: GraphQLError) -> Self {
        Self {
            data: JsonValue::Null,
            errors: vec![error],
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Deserialize the data payload into a caller type
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data)
    }

    /// Error reported at the given dotted path
    pub fn error_at(&self, path: &str) -> Option<&GraphQLError> {
        self.errors.iter().find(|e| e.path_string() == path)
    }
}
