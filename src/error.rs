//! Field resolution errors
//!
//! Every variant is field-scoped: the executor turns it into `null` at the
//! field's path plus an error entry carrying [`ResolveError::code`].

use crate::rdf::ParseError;
use crate::resolver::fetch::FetchError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    /// The document could not be retrieved
    #[error(transparent)]
    Fetch(FetchError),

    /// The document was retrieved but is not valid RDF
    #[error("Cannot parse document {location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: ParseError,
    },

    /// The type has no `@is(class: ...)`
    #[error("Type '{type_name}' has no class metadata")]
    MissingClassMetadata { type_name: String },

    /// No subject is an instance of the class (or matches the identifier)
    #[error("No subject of class <{class_iri}>{}", with_identifier(.identifier))]
    MissingSubject {
        class_iri: String,
        identifier: Option<String>,
    },

    /// Several subjects where one was expected (strict mode only)
    #[error("{count} subjects of class <{class_iri}> where one was expected")]
    AmbiguousSubject { class_iri: String, count: usize },

    /// No document location for a root field
    #[error("No document location for root field '{field}'")]
    MissingLocation { field: String },

    /// An argument has the wrong shape
    #[error("Invalid argument '{argument}': {reason}")]
    InvalidArgument { argument: String, reason: String },

    /// The request was cancelled
    #[error("Resolution cancelled")]
    Cancelled,

    /// A blocking extraction task panicked or was aborted
    #[error("Extraction task failed: {0}")]
    Task(String),
}

pub type ResolveResult<T> = Result<T, ResolveError>;

impl ResolveError {
    /// Stable error code reported in `extensions.code`
    pub fn code(&self) -> &'static str {
        match self {
            ResolveError::Fetch(_) => "FETCH_ERROR",
            ResolveError::Parse { .. } => "PARSE_ERROR",
            ResolveError::MissingClassMetadata { .. } => "MISSING_CLASS_METADATA",
            ResolveError::MissingSubject { .. } => "MISSING_SUBJECT",
            ResolveError::AmbiguousSubject { .. } => "AMBIGUOUS_SUBJECT",
            ResolveError::MissingLocation { .. } => "MISSING_LOCATION",
            ResolveError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            ResolveError::Cancelled => "CANCELLED",
            ResolveError::Task(_) => "INTERNAL_ERROR",
        }
    }
}

fn with_identifier(identifier: &Option<String>) -> String {
    identifier
        .as_ref()
        .map(|id| format!(" with identifier '{}'", id))
        .unwrap_or_default()
}

impl From<FetchError> for ResolveError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Parse { location, source } => ResolveError::Parse { location, source },
            other => ResolveError::Fetch(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_parse_error_maps_to_parse() {
        let err: ResolveError = FetchError::Parse {
            location: "mem:doc".to_string(),
            source: ParseError::Unsupported("x".to_string()),
        }
        .into();
        assert_eq!(err.code(), "PARSE_ERROR");

        let err: ResolveError = FetchError::Status {
            location: "http://x".to_string(),
            status: 404,
        }
        .into();
        assert_eq!(err.code(), "FETCH_ERROR");
    }

    #[test]
    fn test_missing_subject_message() {
        let err = ResolveError::MissingSubject {
            class_iri: "http://example.org/Person".to_string(),
            identifier: Some("ex:missing".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "No subject of class <http://example.org/Person> with identifier 'ex:missing'"
        );
        assert_eq!(err.code(), "MISSING_SUBJECT");
    }
}
