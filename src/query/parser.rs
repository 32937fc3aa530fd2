//! GraphQL document parser using Pest
//!
//! The grammar covers executable documents and schema definition documents;
//! the value, type and directive helpers here are shared with the schema
//! loader.

use crate::query::ast::*;
use indexmap::IndexMap;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

#[derive(Parser)]
#[grammar = "query/graphql.pest"]
pub struct GraphqlParser;

/// Query parser errors
#[derive(Error, Debug)]
pub enum QueryParseError {
    /// Pest parsing error
    #[error("Parse error: {0}")]
    PestError(#[from] Box<pest::error::Error<Rule>>),

    /// Well-formed but invalid document
    #[error("Semantic error: {0}")]
    SemanticError(String),
}

impl From<pest::error::Error<Rule>> for QueryParseError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        QueryParseError::PestError(Box::new(err))
    }
}

pub type QueryParseResult<T> = Result<T, QueryParseError>;

/// Parse a GraphQL executable document
pub fn parse_query(input: &str) -> QueryParseResult<Document> {
    let root = GraphqlParser::parse(Rule::executable_document, input)?
        .next()
        .ok_or_else(|| QueryParseError::SemanticError("Empty document".to_string()))?;

    let mut document = Document::default();

    for inner in root.into_inner() {
        match inner.as_rule() {
            Rule::operation_definition => {
                document.operations.push(parse_operation(inner)?);
            }
            Rule::fragment_definition => {
                let fragment = parse_fragment_definition(inner)?;
                if document.fragments.contains_key(&fragment.name) {
                    return Err(QueryParseError::SemanticError(format!(
                        "Duplicate fragment '{}'",
                        fragment.name
                    )));
                }
                document.fragments.insert(fragment.name.clone(), fragment);
            }
            _ => {}
        }
    }

    if document.operations.is_empty() {
        return Err(QueryParseError::SemanticError(
            "Document contains no operation".to_string(),
        ));
    }
    if document.operations.len() > 1 && document.operations.iter().any(|op| op.name.is_none()) {
        return Err(QueryParseError::SemanticError(
            "Anonymous operation must be the only operation in the document".to_string(),
        ));
    }

    Ok(document)
}

fn parse_operation(pair: Pair<Rule>) -> QueryParseResult<OperationDefinition> {
    let mut kind = OperationKind::Query;
    let mut name = None;
    let mut variables = Vec::new();
    let mut selection_set = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::operation_type => {
                kind = parse_operation_kind(inner.as_str());
            }
            Rule::name => {
                name = Some(inner.as_str().to_string());
            }
            Rule::variable_definitions => {
                for def in inner.into_inner() {
                    variables.push(parse_variable_definition(def)?);
                }
            }
            Rule::selection_set => {
                selection_set = parse_selection_set(inner)?;
            }
            _ => {}
        }
    }

    Ok(OperationDefinition {
        kind,
        name,
        variables,
        selection_set,
    })
}

pub(crate) fn parse_operation_kind(text: &str) -> OperationKind {
    match text {
        "mutation" => OperationKind::Mutation,
        "subscription" => OperationKind::Subscription,
        _ => OperationKind::Query,
    }
}

fn parse_variable_definition(pair: Pair<Rule>) -> QueryParseResult<VariableDefinition> {
    let mut name = String::new();
    let mut ty = None;
    let mut default_value = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::variable => {
                name = inner.as_str().trim_start_matches('$').to_string();
            }
            Rule::type_ref => {
                ty = Some(parse_type_ref(inner)?);
            }
            Rule::default_value => {
                if let Some(value) = inner.into_inner().next() {
                    default_value = Some(parse_value(value)?);
                }
            }
            _ => {}
        }
    }

    Ok(VariableDefinition {
        ty: ty.ok_or_else(|| {
            QueryParseError::SemanticError(format!("Variable '${}' has no type", name))
        })?,
        name,
        default_value,
    })
}

fn parse_selection_set(pair: Pair<Rule>) -> QueryParseResult<Vec<Selection>> {
    let mut selections = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::field => selections.push(Selection::Field(parse_field(inner)?)),
            Rule::fragment_spread => {
                let name = inner
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::fragment_name)
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                selections.push(Selection::FragmentSpread(name));
            }
            Rule::inline_fragment => {
                let mut type_condition = None;
                let mut selection_set = Vec::new();
                for frag_inner in inner.into_inner() {
                    match frag_inner.as_rule() {
                        Rule::type_condition => {
                            type_condition = Some(parse_type_condition(frag_inner));
                        }
                        Rule::selection_set => {
                            selection_set = parse_selection_set(frag_inner)?;
                        }
                        _ => {}
                    }
                }
                selections.push(Selection::InlineFragment {
                    type_condition,
                    selection_set,
                });
            }
            _ => {}
        }
    }

    Ok(selections)
}

fn parse_field(pair: Pair<Rule>) -> QueryParseResult<Field> {
    let mut alias = None;
    let mut name = String::new();
    let mut arguments = IndexMap::new();
    let mut selection_set = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::alias => {
                alias = inner.into_inner().next().map(|p| p.as_str().to_string());
            }
            Rule::name => {
                name = inner.as_str().to_string();
            }
            Rule::arguments => {
                arguments = parse_arguments(inner)?;
            }
            Rule::selection_set => {
                selection_set = parse_selection_set(inner)?;
            }
            _ => {}
        }
    }

    Ok(Field {
        alias,
        name,
        arguments,
        selection_set,
    })
}

fn parse_fragment_definition(pair: Pair<Rule>) -> QueryParseResult<FragmentDefinition> {
    let mut name = String::new();
    let mut type_condition = String::new();
    let mut selection_set = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::fragment_name => name = inner.as_str().to_string(),
            Rule::type_condition => type_condition = parse_type_condition(inner),
            Rule::selection_set => selection_set = parse_selection_set(inner)?,
            _ => {}
        }
    }

    Ok(FragmentDefinition {
        name,
        type_condition,
        selection_set,
    })
}

fn parse_type_condition(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .find(|p| p.as_rule() == Rule::name)
        .map(|p| p.as_str().to_string())
        .unwrap_or_default()
}

/// Parse an `arguments` pair into an ordered map, rejecting duplicates
pub(crate) fn parse_arguments(pair: Pair<Rule>) -> QueryParseResult<IndexMap<String, Value>> {
    let mut arguments = IndexMap::new();

    for argument in pair.into_inner() {
        let mut parts = argument.into_inner();
        let (Some(name), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        let name = name.as_str().to_string();
        if arguments.contains_key(&name) {
            return Err(QueryParseError::SemanticError(format!(
                "Duplicate argument '{}'",
                name
            )));
        }
        arguments.insert(name, parse_value(value)?);
    }

    Ok(arguments)
}

/// Parse a `directives` pair
pub(crate) fn parse_directives(pair: Pair<Rule>) -> QueryParseResult<Vec<Directive>> {
    let mut directives = Vec::new();

    for directive in pair.into_inner() {
        let mut name = String::new();
        let mut arguments = IndexMap::new();
        for inner in directive.into_inner() {
            match inner.as_rule() {
                Rule::name => name = inner.as_str().to_string(),
                Rule::arguments => arguments = parse_arguments(inner)?,
                _ => {}
            }
        }
        directives.push(Directive { name, arguments });
    }

    Ok(directives)
}

/// Parse a `value` pair (or any of its alternatives)
pub(crate) fn parse_value(pair: Pair<Rule>) -> QueryParseResult<Value> {
    match pair.as_rule() {
        Rule::value => match pair.into_inner().next() {
            Some(inner) => parse_value(inner),
            None => Err(QueryParseError::SemanticError("Empty value".to_string())),
        },
        Rule::variable => Ok(Value::Variable(
            pair.as_str().trim_start_matches('$').to_string(),
        )),
        Rule::int => pair.as_str().parse::<i64>().map(Value::Int).map_err(|_| {
            QueryParseError::SemanticError(format!("Integer out of range: {}", pair.as_str()))
        }),
        Rule::float => pair.as_str().parse::<f64>().map(Value::Float).map_err(|_| {
            QueryParseError::SemanticError(format!("Invalid float: {}", pair.as_str()))
        }),
        Rule::string => {
            let raw = pair.into_inner().next().map(|p| p.as_str()).unwrap_or("");
            Ok(Value::String(unescape(raw)?))
        }
        Rule::block_string => {
            let raw = pair.into_inner().next().map(|p| p.as_str()).unwrap_or("");
            Ok(Value::String(block_string_value(raw)))
        }
        Rule::boolean => Ok(Value::Boolean(pair.as_str() == "true")),
        Rule::null => Ok(Value::Null),
        Rule::enum_value => Ok(Value::Enum(pair.as_str().to_string())),
        Rule::list => pair
            .into_inner()
            .map(parse_value)
            .collect::<QueryParseResult<Vec<_>>>()
            .map(Value::List),
        Rule::object => {
            let mut fields = IndexMap::new();
            for field in pair.into_inner() {
                let mut parts = field.into_inner();
                if let (Some(name), Some(value)) = (parts.next(), parts.next()) {
                    fields.insert(name.as_str().to_string(), parse_value(value)?);
                }
            }
            Ok(Value::Object(fields))
        }
        other => Err(QueryParseError::SemanticError(format!(
            "Unexpected value rule {:?}",
            other
        ))),
    }
}

/// Parse a `type_ref` pair (or any of its alternatives)
pub(crate) fn parse_type_ref(pair: Pair<Rule>) -> QueryParseResult<TypeRef> {
    let rule = pair.as_rule();
    match rule {
        Rule::named_type => Ok(TypeRef::Named(pair.as_str().trim().to_string())),
        Rule::type_ref | Rule::non_null_type | Rule::list_type => {
            let inner = pair.into_inner().next().ok_or_else(|| {
                QueryParseError::SemanticError("Empty type reference".to_string())
            })?;
            let inner = parse_type_ref(inner)?;
            Ok(match rule {
                Rule::non_null_type => TypeRef::NonNull(Box::new(inner)),
                Rule::list_type => TypeRef::List(Box::new(inner)),
                _ => inner,
            })
        }
        other => Err(QueryParseError::SemanticError(format!(
            "Unexpected type rule {:?}",
            other
        ))),
    }
}

/// Resolve escape sequences of a quoted string body
fn unescape(raw: &str) -> QueryParseResult<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('b') => out.push('\u{0008}'),
            Some('f') => out.push('\u{000C}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32)
                    .ok_or_else(|| {
                        QueryParseError::SemanticError(format!("Invalid unicode escape \\u{}", hex))
                    })?;
                out.push(code);
            }
            other => {
                return Err(QueryParseError::SemanticError(format!(
                    "Invalid escape sequence \\{}",
                    other.map(String::from).unwrap_or_default()
                )))
            }
        }
    }

    Ok(out)
}

/// Block string value: common indentation and surrounding blank lines removed
fn block_string_value(raw: &str) -> String {
    let raw = raw.replace("\\\"\"\"", "\"\"\"");
    let lines: Vec<&str> = raw.lines().collect();

    let common_indent = lines
        .iter()
        .skip(1)
        .filter_map(|line| {
            let indent = line.len() - line.trim_start_matches([' ', '\t']).len();
            (indent < line.len()).then_some(indent)
        })
        .min()
        .unwrap_or(0);

    let mut out: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                *line
            } else if line.len() >= common_indent {
                &line[common_indent..]
            } else {
                line.trim_start()
            }
        })
        .collect();

    while out.first().is_some_and(|l| l.trim().is_empty()) {
        out.remove(0);
    }
    while out.last().is_some_and(|l| l.trim().is_empty()) {
        out.pop();
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_field(doc: &Document) -> &Field {
        match &doc.operations[0].selection_set[0] {
            Selection::Field(f) => f,
            other => panic!("expected field, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_shorthand_query() {
        let doc = parse_query("{ person { name } }").unwrap();
        assert_eq!(doc.operations.len(), 1);
        assert_eq!(doc.operations[0].kind, OperationKind::Query);
        assert!(doc.operations[0].name.is_none());

        let person = first_field(&doc);
        assert_eq!(person.name, "person");
        assert_eq!(person.selection_set.len(), 1);
    }

    #[test]
    fn test_parse_named_operation_with_variables() {
        let doc = parse_query(
            r#"query GetPerson($id: ID! = "http://example.org/alice", $n: [Int]) {
                p: person(id: $id) { name }
            }"#,
        )
        .unwrap();

        let op = &doc.operations[0];
        assert_eq!(op.name.as_deref(), Some("GetPerson"));
        assert_eq!(op.variables.len(), 2);
        assert_eq!(op.variables[0].name, "id");
        assert_eq!(op.variables[0].ty.to_string(), "ID!");
        assert_eq!(
            op.variables[0].default_value,
            Some(Value::String("http://example.org/alice".to_string()))
        );
        assert_eq!(op.variables[1].ty.to_string(), "[Int]");

        let person = first_field(&doc);
        assert_eq!(person.alias.as_deref(), Some("p"));
        assert_eq!(person.response_key(), "p");
        assert_eq!(person.arguments.get("id"), Some(&Value::Variable("id".to_string())));
    }

    #[test]
    fn test_parse_argument_values() {
        let doc = parse_query(
            r#"{ f(a: 1, b: -2.5e3, c: true, d: null, e: RED, g: [1 2], h: {x: "y"}) }"#,
        )
        .unwrap();
        let args = &first_field(&doc).arguments;

        assert_eq!(args["a"], Value::Int(1));
        assert_eq!(args["b"], Value::Float(-2500.0));
        assert_eq!(args["c"], Value::Boolean(true));
        assert_eq!(args["d"], Value::Null);
        assert_eq!(args["e"], Value::Enum("RED".to_string()));
        assert_eq!(args["g"], Value::List(vec![Value::Int(1), Value::Int(2)]));
        match &args["h"] {
            Value::Object(fields) => assert_eq!(fields["x"], Value::String("y".to_string())),
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_fragments() {
        let doc = parse_query(
            r#"
            query { people { ...PersonFields ... on Person { age } } }
            fragment PersonFields on Person { name __typename }
            "#,
        )
        .unwrap();

        let people = first_field(&doc);
        assert!(matches!(&people.selection_set[0], Selection::FragmentSpread(n) if n == "PersonFields"));
        match &people.selection_set[1] {
            Selection::InlineFragment { type_condition, selection_set } => {
                assert_eq!(type_condition.as_deref(), Some("Person"));
                assert_eq!(selection_set.len(), 1);
            }
            other => panic!("expected inline fragment, got {:?}", other),
        }

        let fragment = &doc.fragments["PersonFields"];
        assert_eq!(fragment.type_condition, "Person");
        assert_eq!(fragment.selection_set.len(), 2);
    }

    #[test]
    fn test_string_escapes() {
        let doc = parse_query(r#"{ f(s: "a\"b\\c\ndé") }"#).unwrap();
        assert_eq!(
            first_field(&doc).arguments["s"],
            Value::String("a\"b\\c\nd\u{e9}".to_string())
        );
    }

    #[test]
    fn test_block_string_dedent() {
        let doc = parse_query("{ f(s: \"\"\"\n    hello\n      world\n  \"\"\") }").unwrap();
        assert_eq!(
            first_field(&doc).arguments["s"],
            Value::String("hello\n  world".to_string())
        );
    }

    #[test]
    fn test_comments_and_commas_ignored() {
        let doc = parse_query("# leading\n{ a, b # trailing\n c }").unwrap();
        assert_eq!(doc.operations[0].selection_set.len(), 3);
    }

    #[test]
    fn test_mutation_kind_is_parsed() {
        let doc = parse_query("mutation { addPerson }").unwrap();
        assert_eq!(doc.operations[0].kind, OperationKind::Mutation);
    }

    #[test]
    fn test_syntax_error() {
        let result = parse_query("{ person { name }");
        assert!(matches!(result, Err(QueryParseError::PestError(_))));
    }

    #[test]
    fn test_duplicate_fragment_rejected() {
        let result = parse_query("{ a } fragment F on T { x } fragment F on T { y }");
        assert!(matches!(result, Err(QueryParseError::SemanticError(_))));
    }

    #[test]
    fn test_anonymous_with_other_operations_rejected() {
        let result = parse_query("{ a } query B { b }");
        assert!(matches!(result, Err(QueryParseError::SemanticError(_))));
    }

    #[test]
    fn test_duplicate_argument_rejected() {
        let result = parse_query("{ a(id: 1, id: 2) }");
        assert!(matches!(result, Err(QueryParseError::SemanticError(_))));
    }
}
