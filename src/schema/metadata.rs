//! Schema metadata index
//!
//! Built once per schema: maps each object type to its RDF class and each
//! field to its role, so resolution never re-reads directives.

use super::{Schema, SchemaError, SchemaResult};
use crate::query::ast::{Directive, TypeRef};
use crate::rdf::{NamedNode, NamespaceManager};
use indexmap::{IndexMap, IndexSet};
use tracing::debug;

/// Type directive naming the RDF class: `@is(class: "...")`
pub const CLASS_DIRECTIVE: &str = "is";
/// Field directive marking the subject identifier: `@identifier`
pub const IDENTIFIER_DIRECTIVE: &str = "identifier";
/// Field directive naming the predicate: `@property(iri: "...")`
pub const PROPERTY_DIRECTIVE: &str = "property";

/// Object type to RDF class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDescriptor {
    pub type_name: String,
    pub class_iri: NamedNode,
}

/// How a field maps onto RDF
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRole {
    /// The field is the subject's own IRI
    Identifier,
    /// The field is read through this predicate
    Property(NamedNode),
    /// No metadata
    Unspecified,
}

/// Field metadata
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub type_name: String,
    pub field_name: String,
    pub role: FieldRole,
    pub return_type: TypeRef,
}

/// Side table of RDF metadata for every object type and field
#[derive(Debug, Clone, Default)]
pub struct SchemaMetadataIndex {
    classes: IndexMap<String, ClassDescriptor>,
    /// Type name, then field name
    fields: IndexMap<String, IndexMap<String, FieldDescriptor>>,
    root_types: IndexSet<String>,
    scalars: IndexSet<String>,
}

static UNSPECIFIED: FieldRole = FieldRole::Unspecified;

impl SchemaMetadataIndex {
    /// Walk every object type and field of the schema
    pub fn build(schema: &Schema, namespaces: &NamespaceManager) -> SchemaResult<Self> {
        let mut index = Self {
            root_types: schema.root_types().map(String::from).collect(),
            scalars: schema.scalars().map(String::from).collect(),
            ..Default::default()
        };

        for object in schema.objects() {
            if let Some(directive) = object.directive(CLASS_DIRECTIVE) {
                let owner = format!("type {}", object.name);
                let class_iri = directive_iri(directive, "class", &owner, namespaces)?;
                index.classes.insert(
                    object.name.clone(),
                    ClassDescriptor {
                        type_name: object.name.clone(),
                        class_iri,
                    },
                );
            }

            for field in object.fields.values() {
                let owner = format!("field {}.{}", object.name, field.name);
                let identifier = field.directive(IDENTIFIER_DIRECTIVE);
                let property = field.directive(PROPERTY_DIRECTIVE);

                let role = match (identifier, property) {
                    (Some(_), Some(_)) => {
                        return Err(SchemaError::InvalidDirective {
                            owner,
                            reason: "@identifier and @property are mutually exclusive".to_string(),
                        })
                    }
                    (Some(_), None) => FieldRole::Identifier,
                    (None, Some(directive)) => {
                        FieldRole::Property(directive_iri(directive, "iri", &owner, namespaces)?)
                    }
                    (None, None) => FieldRole::Unspecified,
                };

                index.fields.entry(object.name.clone()).or_default().insert(
                    field.name.clone(),
                    FieldDescriptor {
                        type_name: object.name.clone(),
                        field_name: field.name.clone(),
                        role,
                        return_type: field.ty.clone(),
                    },
                );
            }
        }

        debug!(
            classes = index.classes.len(),
            fields = index.fields.values().map(IndexMap::len).sum::<usize>(),
            "Built schema metadata index"
        );
        Ok(index)
    }

    /// Class IRI of a type; list and non-null wrappers are peeled first
    pub fn class_iri(&self, ty: &TypeRef) -> Option<&NamedNode> {
        self.class_iri_of(ty.named_type())
    }

    pub fn class_iri_of(&self, type_name: &str) -> Option<&NamedNode> {
        self.classes.get(type_name).map(|c| &c.class_iri)
    }

    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(type_name)?.get(field_name)
    }

    /// Role of a field, `Unspecified` when the field is unknown
    pub fn field_role(&self, type_name: &str, field_name: &str) -> &FieldRole {
        self.field(type_name, field_name)
            .map(|f| &f.role)
            .unwrap_or(&UNSPECIFIED)
    }

    pub fn is_root_type(&self, type_name: &str) -> bool {
        self.root_types.contains(type_name)
    }

    pub fn is_scalar(&self, type_name: &str) -> bool {
        self.scalars.contains(type_name)
    }

    /// Class descriptors in schema order
    pub fn classes(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.classes.values()
    }

    /// Field descriptors in schema order
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values().flat_map(IndexMap::values)
    }
}

fn directive_iri(
    directive: &Directive,
    argument: &str,
    owner: &str,
    namespaces: &NamespaceManager,
) -> SchemaResult<NamedNode> {
    let value = directive
        .string_argument(argument)
        .ok_or_else(|| SchemaError::InvalidDirective {
            owner: owner.to_string(),
            reason: format!("@{} requires a string '{}' argument", directive.name, argument),
        })?;

    let iri = namespaces
        .resolve(value)
        .map_err(|e| SchemaError::InvalidIri {
            owner: owner.to_string(),
            reason: e.to_string(),
        })?;

    NamedNode::new(&iri).map_err(|e| SchemaError::InvalidIri {
        owner: owner.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(sdl: &str) -> SchemaResult<SchemaMetadataIndex> {
        let schema = Schema::parse(sdl).unwrap();
        SchemaMetadataIndex::build(&schema, &NamespaceManager::new())
    }

    #[test]
    fn test_build_index() {
        let index = index(
            r#"
            type Query { people: [Person] }
            type Person @is(class: "foaf:Person") {
              id: ID @identifier
              name: String @property(iri: "http://xmlns.com/foaf/0.1/name")
              nick: String
            }
            "#,
        )
        .unwrap();

        let list = TypeRef::List(Box::new(TypeRef::Named("Person".to_string())));
        assert_eq!(
            index.class_iri(&list).map(|n| n.as_str()),
            Some("http://xmlns.com/foaf/0.1/Person")
        );
        assert_eq!(index.field_role("Person", "id"), &FieldRole::Identifier);
        assert!(matches!(
            index.field_role("Person", "name"),
            FieldRole::Property(iri) if iri.as_str() == "http://xmlns.com/foaf/0.1/name"
        ));
        assert_eq!(index.field_role("Person", "nick"), &FieldRole::Unspecified);
        assert_eq!(index.field_role("Person", "missing"), &FieldRole::Unspecified);
        assert!(index.class_iri_of("Query").is_none());
        assert!(index.is_root_type("Query"));
        assert!(!index.is_root_type("Person"));
        assert!(index.is_scalar("ID"));
        assert_eq!(index.classes().count(), 1);
    }

    #[test]
    fn test_fields_grouped_by_type_in_schema_order() {
        let index = index(
            r#"
            type Query { people: [Person] }
            type Person @is(class: "foaf:Person") {
              id: ID @identifier
              name: String @property(iri: "foaf:name")
            }
            "#,
        )
        .unwrap();

        let names: Vec<_> = index
            .fields()
            .map(|f| format!("{}.{}", f.type_name, f.field_name))
            .collect();
        assert_eq!(names, vec!["Query.people", "Person.id", "Person.name"]);

        assert_eq!(index.field("Person", "name").unwrap().field_name, "name");
        assert!(index.field("Nobody", "name").is_none());
        assert_eq!(index.field_role("Nobody", "name"), &FieldRole::Unspecified);
    }

    #[test]
    fn test_invalid_iri_fails_build() {
        let err = index(
            r#"
            type Query { a: String }
            type Person @is(class: "not an iri") { name: String }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidIri { .. }));
    }

    #[test]
    fn test_directive_without_argument() {
        let err = index(
            r#"
            type Query { a: String @property }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDirective { .. }));
    }

    #[test]
    fn test_conflicting_roles() {
        let err = index(
            r#"
            type Query { a: String @identifier @property(iri: "http://example.org/a") }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDirective { .. }));
    }
}
