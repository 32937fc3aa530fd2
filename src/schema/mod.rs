//! Schema model
//!
//! Object types, their fields and the directives attached to them, loaded
//! from SDL by [`sdl::parse_schema`]. [`SchemaMetadataIndex`] is the side
//! table resolution reads at query time.

pub mod metadata;
pub mod sdl;

pub use metadata::{ClassDescriptor, FieldDescriptor, FieldRole, SchemaMetadataIndex};
pub use sdl::parse_schema;

use crate::query::ast::{Directive, TypeRef, Value};
use crate::query::parser::QueryParseError;
use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

/// Scalars every schema has
pub const BUILTIN_SCALARS: [&str; 5] = ["ID", "String", "Int", "Float", "Boolean"];

/// Schema loading errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Schema syntax error: {0}")]
    Syntax(#[from] QueryParseError),

    #[error("Unknown type '{type_name}' referenced by {referenced_by}")]
    UnknownType {
        type_name: String,
        referenced_by: String,
    },

    #[error("Type '{0}' is defined more than once")]
    DuplicateType(String),

    #[error("Field '{type_name}.{field}' is defined more than once")]
    DuplicateField { type_name: String, field: String },

    #[error("Query root type '{0}' is not defined")]
    MissingQueryType(String),

    #[error("Invalid IRI on {owner}: {reason}")]
    InvalidIri { owner: String, reason: String },

    #[error("Invalid directive on {owner}: {reason}")]
    InvalidDirective { owner: String, reason: String },
}

pub type SchemaResult<T> = Result<T, SchemaError>;

/// Argument of a field
#[derive(Debug, Clone, PartialEq)]
pub struct InputValue {
    pub name: String,
    pub ty: TypeRef,
    pub default_value: Option<Value>,
}

/// Field of an object type
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub name: String,
    pub description: Option<String>,
    pub arguments: IndexMap<String, InputValue>,
    pub ty: TypeRef,
    pub directives: Vec<Directive>,
}

impl FieldDefinition {
    pub fn directive(&self, name: &str) -> Option<&Directive> {
        self.directives.iter().find(|d| d.name == name)
    }
}

/// Object type
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectType {
    pub name: String,
    pub description: Option<String>,
    pub interfaces: Vec<String>,
    pub directives: Vec<Directive>,
    pub fields: IndexMap<String, FieldDefinition>,
}

impl ObjectType {
    pub fn directive(&self, name: &str) -> Option<&Directive> {
        self.directives.iter().find(|d| d.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }
}

/// Loaded schema
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) query_type: String,
    pub(crate) mutation_type: Option<String>,
    pub(crate) subscription_type: Option<String>,
    pub(crate) types: IndexMap<String, ObjectType>,
    pub(crate) scalars: IndexSet<String>,
}

impl Schema {
    /// Parse a schema from SDL
    pub fn parse(sdl: &str) -> SchemaResult<Self> {
        parse_schema(sdl)
    }

    /// Name of the query root type
    pub fn query_type(&self) -> &str {
        &self.query_type
    }

    pub fn mutation_type(&self) -> Option<&str> {
        self.mutation_type.as_deref()
    }

    pub fn subscription_type(&self) -> Option<&str> {
        self.subscription_type.as_deref()
    }

    /// Names of all root operation types
    pub fn root_types(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.query_type.as_str())
            .chain(self.mutation_type.as_deref())
            .chain(self.subscription_type.as_deref())
    }

    pub fn object(&self, name: &str) -> Option<&ObjectType> {
        self.types.get(name)
    }

    /// Object types in definition order
    pub fn objects(&self) -> impl Iterator<Item = &ObjectType> {
        self.types.values()
    }

    pub fn field(&self, type_name: &str, field: &str) -> Option<&FieldDefinition> {
        self.types.get(type_name).and_then(|t| t.field(field))
    }

    pub fn is_scalar(&self, name: &str) -> bool {
        self.scalars.contains(name)
    }

    /// Scalar names, built-ins first
    pub fn scalars(&self) -> impl Iterator<Item = &str> {
        self.scalars.iter().map(|s| s.as_str())
    }
}
