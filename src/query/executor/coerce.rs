//! Scalar and input coercion

use crate::query::ast::{TypeRef, Value};
use crate::rdf::RdfTerm;
use serde_json::{Map as JsonMap, Number, Value as JsonValue};

/// Coerce an RDF term to the JSON form of a scalar type.
///
/// `Int` is a 32-bit integer; `Boolean` accepts `true/false/1/0`; every
/// other scalar is the term's value as a string.
pub fn coerce_scalar(type_name: &str, term: &RdfTerm) -> Result<JsonValue, String> {
    let value = term.value();
    match type_name {
        "Int" => value
            .trim()
            .parse::<i32>()
            .map(JsonValue::from)
            .map_err(|_| format!("Int cannot represent value: {:?}", value)),
        "Float" => value
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(JsonValue::Number)
            .ok_or_else(|| format!("Float cannot represent value: {:?}", value)),
        "Boolean" => match value.trim() {
            "true" | "1" => Ok(JsonValue::Bool(true)),
            "false" | "0" => Ok(JsonValue::Bool(false)),
            _ => Err(format!("Boolean cannot represent value: {:?}", value)),
        },
        _ => Ok(JsonValue::String(value.to_string())),
    }
}

/// Literal value to JSON, substituting variables (unknown ones become null)
pub fn value_to_json(value: &Value, variables: &JsonMap<String, JsonValue>) -> JsonValue {
    match value {
        Value::Variable(name) => variables.get(name).cloned().unwrap_or(JsonValue::Null),
        Value::Int(i) => JsonValue::from(*i),
        Value::Float(f) => Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::String(s) | Value::Enum(s) => JsonValue::String(s.clone()),
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::Null => JsonValue::Null,
        Value::List(items) => {
            JsonValue::Array(items.iter().map(|v| value_to_json(v, variables)).collect())
        }
        Value::Object(fields) => JsonValue::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), value_to_json(v, variables)))
                .collect(),
        ),
    }
}

/// Check a provided input against a declared type
pub fn check_input(ty: &TypeRef, value: &JsonValue) -> Result<(), String> {
    match (ty, value) {
        (TypeRef::NonNull(_), JsonValue::Null) => Err(format!("Expected non-null {}", ty)),
        (TypeRef::NonNull(inner), value) => check_input(inner, value),
        (_, JsonValue::Null) => Ok(()),
        (TypeRef::List(inner), JsonValue::Array(items)) => {
            items.iter().try_for_each(|item| check_input(inner, item))
        }
        // A single value is accepted where a list is expected
        (TypeRef::List(inner), value) => check_input(inner, value),
        (TypeRef::Named(name), value) => check_scalar_input(name, value),
    }
}

fn check_scalar_input(type_name: &str, value: &JsonValue) -> Result<(), String> {
    let ok = match type_name {
        "ID" => value.is_string() || value.is_i64() || value.is_u64(),
        "Int" => value
            .as_i64()
            .is_some_and(|i| i32::try_from(i).is_ok()),
        "Float" => value.is_number(),
        "Boolean" => value.is_boolean(),
        "String" => value.is_string(),
        _ => !value.is_object() && !value.is_array(),
    };
    if ok {
        Ok(())
    } else {
        Err(format!("{} cannot represent {}", type_name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::{Literal, NamedNode};
    use serde_json::json;

    fn literal(value: &str) -> RdfTerm {
        RdfTerm::Literal(Literal::new_simple_literal(value))
    }

    #[test]
    fn test_coerce_scalars() {
        assert_eq!(coerce_scalar("Int", &literal("42")).unwrap(), json!(42));
        assert!(coerce_scalar("Int", &literal("4294967296")).is_err());
        assert!(coerce_scalar("Int", &literal("forty")).is_err());
        assert_eq!(coerce_scalar("Float", &literal("1.5")).unwrap(), json!(1.5));
        assert_eq!(coerce_scalar("Boolean", &literal("1")).unwrap(), json!(true));
        assert_eq!(coerce_scalar("Boolean", &literal("false")).unwrap(), json!(false));
        assert!(coerce_scalar("Boolean", &literal("yes")).is_err());
        assert_eq!(coerce_scalar("DateTime", &literal("2024-01-01")).unwrap(), json!("2024-01-01"));

        let iri = RdfTerm::NamedNode(NamedNode::new("http://example.org/alice").unwrap());
        assert_eq!(coerce_scalar("ID", &iri).unwrap(), json!("http://example.org/alice"));
    }

    #[test]
    fn test_value_to_json_substitutes_variables() {
        let mut variables = JsonMap::new();
        variables.insert("id".to_string(), json!("http://example.org/bob"));

        let value = Value::List(vec![
            Value::Variable("id".to_string()),
            Value::Variable("unknown".to_string()),
            Value::Int(3),
        ]);
        assert_eq!(
            value_to_json(&value, &variables),
            json!(["http://example.org/bob", null, 3])
        );
    }

    #[test]
    fn test_check_input() {
        let id = TypeRef::NonNull(Box::new(TypeRef::Named("ID".to_string())));
        assert!(check_input(&id, &json!("x")).is_ok());
        assert!(check_input(&id, &json!(7)).is_ok());
        assert!(check_input(&id, &JsonValue::Null).is_err());
        assert!(check_input(&id, &json!(true)).is_err());

        let ints = TypeRef::List(Box::new(TypeRef::Named("Int".to_string())));
        assert!(check_input(&ints, &json!([1, 2])).is_ok());
        assert!(check_input(&ints, &json!(1)).is_ok());
        assert!(check_input(&ints, &json!([1.5])).is_err());
    }
}
