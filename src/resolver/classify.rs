//! Field shape classification

use crate::query::ast::TypeRef;
use crate::schema::FieldRole;

/// What a field resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldShape {
    /// Field of a root operation type; the inner shape applies after the
    /// document is fetched and the root class extracted
    RootEntry(Box<FieldShape>),
    ListOfScalar,
    ListOfObject,
    SingleScalar,
    SingleObject,
    /// Role does not fit the shape; the source passes through unchanged
    Unspecified,
}

impl FieldShape {
    /// Shape with any root wrapper removed
    pub fn inner(&self) -> &FieldShape {
        match self {
            FieldShape::RootEntry(inner) => inner,
            other => other,
        }
    }
}

/// Classify a field from its parent kind, return type and role.
///
/// `returns_scalar` tells whether the peeled return type is a scalar.
pub fn classify(
    parent_is_root: bool,
    return_type: &TypeRef,
    returns_scalar: bool,
    role: &FieldRole,
) -> FieldShape {
    let shape = match (return_type.list_item().is_some(), returns_scalar, role) {
        (true, true, FieldRole::Property(_)) => FieldShape::ListOfScalar,
        (true, true, _) => FieldShape::Unspecified,
        (true, false, _) => FieldShape::ListOfObject,
        (false, true, FieldRole::Identifier | FieldRole::Property(_)) => FieldShape::SingleScalar,
        (false, true, FieldRole::Unspecified) => FieldShape::Unspecified,
        (false, false, _) => FieldShape::SingleObject,
    };

    if parent_is_root {
        FieldShape::RootEntry(Box::new(shape))
    } else {
        shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::NamedNode;

    fn named(name: &str) -> TypeRef {
        TypeRef::Named(name.to_string())
    }

    fn list(inner: TypeRef) -> TypeRef {
        TypeRef::List(Box::new(inner))
    }

    fn non_null(inner: TypeRef) -> TypeRef {
        TypeRef::NonNull(Box::new(inner))
    }

    fn property() -> FieldRole {
        FieldRole::Property(NamedNode::new("http://xmlns.com/foaf/0.1/name").unwrap())
    }

    #[test]
    fn test_scalar_shapes() {
        assert_eq!(
            classify(false, &named("String"), true, &property()),
            FieldShape::SingleScalar
        );
        assert_eq!(
            classify(false, &non_null(named("ID")), true, &FieldRole::Identifier),
            FieldShape::SingleScalar
        );
        assert_eq!(
            classify(false, &list(named("String")), true, &property()),
            FieldShape::ListOfScalar
        );
    }

    #[test]
    fn test_object_shapes() {
        assert_eq!(
            classify(false, &named("Person"), false, &FieldRole::Unspecified),
            FieldShape::SingleObject
        );
        assert_eq!(
            classify(false, &non_null(list(non_null(named("Person")))), false, &FieldRole::Unspecified),
            FieldShape::ListOfObject
        );
    }

    #[test]
    fn test_role_mismatch_is_unspecified() {
        assert_eq!(
            classify(false, &named("String"), true, &FieldRole::Unspecified),
            FieldShape::Unspecified
        );
        assert_eq!(
            classify(false, &list(named("ID")), true, &FieldRole::Identifier),
            FieldShape::Unspecified
        );
    }

    #[test]
    fn test_root_entry_wraps_inner_shape() {
        let shape = classify(true, &list(named("Person")), false, &FieldRole::Unspecified);
        assert_eq!(shape, FieldShape::RootEntry(Box::new(FieldShape::ListOfObject)));
        assert_eq!(shape.inner(), &FieldShape::ListOfObject);

        let shape = classify(true, &named("Person"), false, &FieldRole::Unspecified);
        assert_eq!(shape.inner(), &FieldShape::SingleObject);
    }
}
