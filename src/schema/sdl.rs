//! SDL loader
//!
//! Reads object types, scalars, `schema { ... }` root declarations and type
//! extensions. Directive definitions are accepted and ignored; directives
//! applied to types and fields are kept for the metadata index.

use super::{
    FieldDefinition, InputValue, ObjectType, Schema, SchemaError, SchemaResult, BUILTIN_SCALARS,
};
use crate::query::ast::{OperationKind, Value};
use crate::query::parser::{
    parse_directives, parse_operation_kind, parse_type_ref, parse_value, GraphqlParser,
    QueryParseError, Rule,
};
use indexmap::{IndexMap, IndexSet};
use pest::iterators::Pair;
use pest::Parser;
use tracing::debug;

/// Parse an SDL document into a validated [`Schema`]
pub fn parse_schema(input: &str) -> SchemaResult<Schema> {
    let root = GraphqlParser::parse(Rule::schema_document, input)
        .map_err(QueryParseError::from)?
        .next()
        .ok_or_else(|| QueryParseError::SemanticError("Empty schema document".to_string()))?;

    let mut roots: IndexMap<OperationKind, String> = IndexMap::new();
    let mut types: IndexMap<String, ObjectType> = IndexMap::new();
    let mut extensions = Vec::new();
    let mut scalars: IndexSet<String> = BUILTIN_SCALARS.iter().map(|s| s.to_string()).collect();

    for definition in root.into_inner() {
        match definition.as_rule() {
            Rule::schema_definition => {
                for inner in definition.into_inner() {
                    if inner.as_rule() == Rule::root_operation_type {
                        let mut parts = inner.into_inner();
                        if let (Some(kind), Some(name)) = (parts.next(), parts.next()) {
                            roots.insert(parse_operation_kind(kind.as_str()), name.as_str().to_string());
                        }
                    }
                }
            }
            Rule::scalar_definition => {
                if let Some(name) = definition.into_inner().find(|p| p.as_rule() == Rule::name) {
                    scalars.insert(name.as_str().to_string());
                }
            }
            Rule::object_definition => {
                let object = parse_object(definition)?;
                if types.contains_key(&object.name) || scalars.contains(&object.name) {
                    return Err(SchemaError::DuplicateType(object.name));
                }
                types.insert(object.name.clone(), object);
            }
            Rule::object_extension => {
                extensions.push(parse_object(definition)?);
            }
            _ => {}
        }
    }

    for extension in extensions {
        let target = types.get_mut(&extension.name).ok_or_else(|| SchemaError::UnknownType {
            type_name: extension.name.clone(),
            referenced_by: "type extension".to_string(),
        })?;
        target.interfaces.extend(extension.interfaces);
        target.directives.extend(extension.directives);
        for (name, field) in extension.fields {
            if target.fields.contains_key(&name) {
                return Err(SchemaError::DuplicateField {
                    type_name: target.name.clone(),
                    field: name,
                });
            }
            target.fields.insert(name, field);
        }
    }

    let query_type = roots
        .shift_remove(&OperationKind::Query)
        .unwrap_or_else(|| "Query".to_string());
    if !types.contains_key(&query_type) {
        return Err(SchemaError::MissingQueryType(query_type));
    }
    let mutation_type = roots
        .shift_remove(&OperationKind::Mutation)
        .or_else(|| types.contains_key("Mutation").then(|| "Mutation".to_string()));
    let subscription_type = roots
        .shift_remove(&OperationKind::Subscription)
        .or_else(|| types.contains_key("Subscription").then(|| "Subscription".to_string()));

    let schema = Schema {
        query_type,
        mutation_type,
        subscription_type,
        types,
        scalars,
    };
    validate(&schema)?;

    debug!(
        types = schema.types.len(),
        scalars = schema.scalars.len(),
        "Loaded schema"
    );
    Ok(schema)
}

fn parse_object(pair: Pair<Rule>) -> SchemaResult<ObjectType> {
    let mut object = ObjectType {
        name: String::new(),
        description: None,
        interfaces: Vec::new(),
        directives: Vec::new(),
        fields: IndexMap::new(),
    };

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::string | Rule::block_string => object.description = description(inner)?,
            Rule::name => object.name = inner.as_str().to_string(),
            Rule::implements => {
                object.interfaces = inner
                    .into_inner()
                    .filter(|p| p.as_rule() == Rule::name)
                    .map(|p| p.as_str().to_string())
                    .collect();
            }
            Rule::directives => object.directives = parse_directives(inner)?,
            Rule::fields_definition => {
                for field in inner.into_inner() {
                    let field = parse_field_definition(field)?;
                    if object.fields.contains_key(&field.name) {
                        return Err(SchemaError::DuplicateField {
                            type_name: object.name.clone(),
                            field: field.name,
                        });
                    }
                    object.fields.insert(field.name.clone(), field);
                }
            }
            _ => {}
        }
    }

    Ok(object)
}

fn parse_field_definition(pair: Pair<Rule>) -> SchemaResult<FieldDefinition> {
    let mut name = String::new();
    let mut description_text = None;
    let mut arguments = IndexMap::new();
    let mut ty = None;
    let mut directives = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::string | Rule::block_string => description_text = description(inner)?,
            Rule::name => name = inner.as_str().to_string(),
            Rule::arguments_definition => {
                for input in inner.into_inner() {
                    let input = parse_input_value(input)?;
                    arguments.insert(input.name.clone(), input);
                }
            }
            Rule::type_ref => ty = Some(parse_type_ref(inner)?),
            Rule::directives => directives = parse_directives(inner)?,
            _ => {}
        }
    }

    let ty = ty.ok_or_else(|| {
        SchemaError::Syntax(QueryParseError::SemanticError(format!(
            "Field '{}' has no type",
            name
        )))
    })?;

    Ok(FieldDefinition {
        name,
        description: description_text,
        arguments,
        ty,
        directives,
    })
}

fn parse_input_value(pair: Pair<Rule>) -> SchemaResult<InputValue> {
    let mut name = String::new();
    let mut ty = None;
    let mut default_value = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::name => name = inner.as_str().to_string(),
            Rule::type_ref => ty = Some(parse_type_ref(inner)?),
            Rule::default_value => {
                if let Some(value) = inner.into_inner().next() {
                    default_value = Some(parse_value(value)?);
                }
            }
            _ => {}
        }
    }

    let ty = ty.ok_or_else(|| {
        SchemaError::Syntax(QueryParseError::SemanticError(format!(
            "Argument '{}' has no type",
            name
        )))
    })?;

    Ok(InputValue {
        name,
        ty,
        default_value,
    })
}

fn description(pair: Pair<Rule>) -> SchemaResult<Option<String>> {
    match parse_value(pair)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// Every referenced type must exist; arguments must be scalars
fn validate(schema: &Schema) -> SchemaResult<()> {
    let known = |name: &str| schema.types.contains_key(name) || schema.scalars.contains(name);

    for object in schema.types.values() {
        for field in object.fields.values() {
            let owner = format!("{}.{}", object.name, field.name);
            let named = field.ty.named_type();
            if !known(named) {
                return Err(SchemaError::UnknownType {
                    type_name: named.to_string(),
                    referenced_by: owner,
                });
            }
            for argument in field.arguments.values() {
                let named = argument.ty.named_type();
                if !schema.scalars.contains(named) {
                    return Err(SchemaError::UnknownType {
                        type_name: named.to_string(),
                        referenced_by: format!("argument '{}' of {}", argument.name, owner),
                    });
                }
            }
        }
    }

    for root in [&schema.mutation_type, &schema.subscription_type]
        .into_iter()
        .flatten()
    {
        if !schema.types.contains_key(root) {
            return Err(SchemaError::UnknownType {
                type_name: root.clone(),
                referenced_by: "schema definition".to_string(),
            });
        }
    }

    Ok(())
}
