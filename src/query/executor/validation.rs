//! Document validation against the schema

use super::ExecutionError;
use crate::query::ast::{Document, OperationDefinition, Selection, Value};
use crate::schema::Schema;
use std::collections::HashSet;

/// Validate the selected operation before anything is fetched
pub(super) fn validate_operation(
    schema: &Schema,
    document: &Document,
    operation: &OperationDefinition,
    root_type: &str,
) -> Result<(), ExecutionError> {
    let declared: HashSet<&str> = operation.variables.iter().map(|v| v.name.as_str()).collect();
    let mut validator = Validator {
        schema,
        document,
        declared,
        fragment_stack: Vec::new(),
    };
    validator.selections(root_type, &operation.selection_set)
}

struct Validator<'a> {
    schema: &'a Schema,
    document: &'a Document,
    declared: HashSet<&'a str>,
    fragment_stack: Vec<&'a str>,
}

impl<'a> Validator<'a> {
    fn selections(&mut self, type_name: &str, selections: &'a [Selection]) -> Result<(), ExecutionError> {
        for selection in selections {
            match selection {
                Selection::Field(field) => {
                    if field.name == "__typename" {
                        if !field.selection_set.is_empty() {
                            return Err(invalid("Field '__typename' must not have a selection"));
                        }
                        continue;
                    }

                    let definition = self.schema.field(type_name, &field.name).ok_or_else(|| {
                        invalid(format!(
                            "Cannot query field '{}' on type '{}'",
                            field.name, type_name
                        ))
                    })?;

                    for (name, value) in &field.arguments {
                        if !definition.arguments.contains_key(name) {
                            return Err(invalid(format!(
                                "Unknown argument '{}' on field '{}.{}'",
                                name, type_name, field.name
                            )));
                        }
                        self.variables_declared(value)?;
                    }

                    let field_type = definition.ty.named_type();
                    if self.schema.is_scalar(field_type) {
                        if !field.selection_set.is_empty() {
                            return Err(invalid(format!(
                                "Field '{}' of scalar type '{}' must not have a selection",
                                field.name, definition.ty
                            )));
                        }
                    } else if field.selection_set.is_empty() {
                        return Err(invalid(format!(
                            "Field '{}' of type '{}' must have a selection of subfields",
                            field.name, definition.ty
                        )));
                    } else {
                        let field_type = field_type.to_string();
                        self.selections(&field_type, &field.selection_set)?;
                    }
                }
                Selection::FragmentSpread(name) => {
                    let fragment = self
                        .document
                        .fragments
                        .get(name)
                        .ok_or_else(|| invalid(format!("Unknown fragment '{}'", name)))?;
                    if self.fragment_stack.contains(&name.as_str()) {
                        return Err(invalid(format!("Fragment '{}' spreads itself", name)));
                    }
                    self.type_condition(type_name, &fragment.type_condition)?;

                    self.fragment_stack.push(name);
                    self.selections(type_name, &fragment.selection_set)?;
                    self.fragment_stack.pop();
                }
                Selection::InlineFragment {
                    type_condition,
                    selection_set,
                } => {
                    if let Some(condition) = type_condition {
                        self.type_condition(type_name, condition)?;
                    }
                    self.selections(type_name, selection_set)?;
                }
            }
        }
        Ok(())
    }

    fn type_condition(&self, type_name: &str, condition: &str) -> Result<(), ExecutionError> {
        if self.schema.object(condition).is_none() {
            return Err(invalid(format!("Unknown type '{}' in type condition", condition)));
        }
        if condition != type_name {
            return Err(invalid(format!(
                "Fragment on '{}' cannot be spread within type '{}'",
                condition, type_name
            )));
        }
        Ok(())
    }

    fn variables_declared(&self, value: &Value) -> Result<(), ExecutionError> {
        match value {
            Value::Variable(name) if !self.declared.contains(name.as_str()) => {
                Err(invalid(format!("Variable '${}' is not defined", name)))
            }
            Value::List(items) => items.iter().try_for_each(|v| self.variables_declared(v)),
            Value::Object(fields) => fields.values().try_for_each(|v| self.variables_declared(v)),
            _ => Ok(()),
        }
    }
}

fn invalid(message: impl Into<String>) -> ExecutionError {
    ExecutionError::Validation(message.into())
}
