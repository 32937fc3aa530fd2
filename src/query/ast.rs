//! Abstract Syntax Tree for GraphQL documents
//!
//! Shared by executable documents (queries) and the schema loader, which
//! reuses [`Value`], [`TypeRef`] and [`Directive`].

use indexmap::IndexMap;
use std::fmt;

/// Parsed executable document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    /// Operations in document order
    pub operations: Vec<OperationDefinition>,
    /// Named fragments
    pub fragments: IndexMap<String, FragmentDefinition>,
}

impl Document {
    /// Select the operation to run.
    ///
    /// With one operation the name is optional; with several it is required.
    pub fn operation(&self, name: Option<&str>) -> Option<&OperationDefinition> {
        match name {
            Some(name) => self
                .operations
                .iter()
                .find(|op| op.name.as_deref() == Some(name)),
            None if self.operations.len() == 1 => self.operations.first(),
            None => None,
        }
    }
}

/// Operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Query => write!(f, "query"),
            OperationKind::Mutation => write!(f, "mutation"),
            OperationKind::Subscription => write!(f, "subscription"),
        }
    }
}

/// `query Name($var: Type = default) { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDefinition {
    pub kind: OperationKind,
    pub name: Option<String>,
    pub variables: Vec<VariableDefinition>,
    pub selection_set: Vec<Selection>,
}

/// Variable declaration of an operation
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDefinition {
    pub name: String,
    pub ty: TypeRef,
    pub default_value: Option<Value>,
}

/// `fragment Name on Type { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentDefinition {
    pub name: String,
    pub type_condition: String,
    pub selection_set: Vec<Selection>,
}

/// One entry of a selection set
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Field(Field),
    FragmentSpread(String),
    InlineFragment {
        type_condition: Option<String>,
        selection_set: Vec<Selection>,
    },
}

/// Selected field
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub alias: Option<String>,
    pub name: String,
    pub arguments: IndexMap<String, Value>,
    pub selection_set: Vec<Selection>,
}

impl Field {
    /// Key of this field in the response object
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// Directive application (`@name(arg: value)`)
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub name: String,
    pub arguments: IndexMap<String, Value>,
}

impl Directive {
    /// String argument value, if present and a string
    pub fn string_argument(&self, name: &str) -> Option<&str> {
        match self.arguments.get(name) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        }
    }
}

/// Input value literal
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Variable(String),
    Int(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
    Enum(String),
    List(Vec<Value>),
    Object(IndexMap<String, Value>),
}

/// Declared type of a field, argument or variable
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    /// Name of the innermost named type, wrappers peeled
    pub fn named_type(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.named_type(),
        }
    }

    /// The type with an outer non-null wrapper removed
    pub fn nullable(&self) -> &TypeRef {
        match self {
            TypeRef::NonNull(inner) => inner,
            other => other,
        }
    }

    /// Whether the outermost wrapper is non-null
    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }

    /// Element type if this is a (possibly non-null) list
    pub fn list_item(&self) -> Option<&TypeRef> {
        match self.nullable() {
            TypeRef::List(inner) => Some(inner),
            _ => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{}", name),
            TypeRef::List(inner) => write!(f, "[{}]", inner),
            TypeRef::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}
