//! Turtle-family parsers (Turtle, N-Triples, N-Quads, TriG)

use super::{ParseError, ParseResult};
use crate::rdf::{BlankNode, Literal, NamedNode, Quad, RdfObject, RdfPredicate, RdfSubject};
use oxiri::Iri;
use rio_api::model;
use rio_api::parser::{QuadsParser, TriplesParser};
use rio_turtle::{NQuadsParser, NTriplesParser, TriGParser, TurtleParser};
use std::io::Cursor;

pub(super) fn parse_turtle(input: &str, base: Option<Iri<String>>) -> ParseResult<Vec<Quad>> {
    let mut parser = TurtleParser::new(Cursor::new(input), base);
    collect_triples(&mut parser)
}

pub(super) fn parse_ntriples(input: &str) -> ParseResult<Vec<Quad>> {
    let mut parser = NTriplesParser::new(Cursor::new(input));
    collect_triples(&mut parser)
}

pub(super) fn parse_nquads(input: &str) -> ParseResult<Vec<Quad>> {
    let mut parser = NQuadsParser::new(Cursor::new(input));
    collect_quads(&mut parser)
}

pub(super) fn parse_trig(input: &str, base: Option<Iri<String>>) -> ParseResult<Vec<Quad>> {
    let mut parser = TriGParser::new(Cursor::new(input), base);
    collect_quads(&mut parser)
}

/// Drain a triples parser into default-graph quads
pub(super) fn collect_triples<P>(parser: &mut P) -> ParseResult<Vec<Quad>>
where
    P: TriplesParser,
    ParseError: From<P::Error>,
{
    let mut quads = Vec::new();
    parser.parse_all(&mut |t| -> ParseResult<()> {
        quads.push(Quad::new(
            convert_subject(t.subject)?,
            convert_predicate(t.predicate)?,
            convert_object(t.object)?,
            None,
        ));
        Ok(())
    })?;
    Ok(quads)
}

fn collect_quads<P>(parser: &mut P) -> ParseResult<Vec<Quad>>
where
    P: QuadsParser,
    ParseError: From<P::Error>,
{
    let mut quads = Vec::new();
    parser.parse_all(&mut |q| -> ParseResult<()> {
        quads.push(Quad::new(
            convert_subject(q.subject)?,
            convert_predicate(q.predicate)?,
            convert_object(q.object)?,
            convert_graph(q.graph_name)?,
        ));
        Ok(())
    })?;
    Ok(quads)
}

fn convert_subject(s: model::Subject<'_>) -> ParseResult<RdfSubject> {
    match s {
        model::Subject::NamedNode(n) => Ok(NamedNode::new(n.iri)?.into()),
        model::Subject::BlankNode(b) => Ok(BlankNode::with_id(b.id)?.into()),
        _ => Err(ParseError::Unsupported("quoted triple in subject position".to_string())),
    }
}

fn convert_predicate(p: model::NamedNode<'_>) -> ParseResult<RdfPredicate> {
    Ok(RdfPredicate::new(p.iri)?)
}

fn convert_object(o: model::Term<'_>) -> ParseResult<RdfObject> {
    match o {
        model::Term::NamedNode(n) => Ok(NamedNode::new(n.iri)?.into()),
        model::Term::BlankNode(b) => Ok(BlankNode::with_id(b.id)?.into()),
        model::Term::Literal(l) => {
            let literal = match l {
                model::Literal::Simple { value } => Literal::new_simple_literal(value),
                model::Literal::LanguageTaggedString { value, language } => {
                    Literal::new_language_tagged_literal(value, language)?
                }
                model::Literal::Typed { value, datatype } => {
                    Literal::new_typed_literal(value, NamedNode::new(datatype.iri)?)
                }
            };
            Ok(literal.into())
        }
        _ => Err(ParseError::Unsupported("quoted triple in object position".to_string())),
    }
}

fn convert_graph(g: Option<model::GraphName<'_>>) -> ParseResult<Option<NamedNode>> {
    match g {
        None => Ok(None),
        Some(model::GraphName::NamedNode(n)) => Ok(Some(NamedNode::new(n.iri)?)),
        Some(model::GraphName::BlankNode(b)) => Err(ParseError::Unsupported(format!(
            "blank node graph name _:{}",
            b.id
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::rdf::serialization::{ParseError, RdfFormat, RdfParser};
    use crate::rdf::{RdfObject, RdfSubject, RDF_TYPE};

    #[test]
    fn test_turtle_with_prefixes_and_base() {
        let input = r#"
            @prefix foaf: <http://xmlns.com/foaf/0.1/> .
            <#me> a foaf:Person ;
                foaf:name "Alice"@en ;
                foaf:knows [ foaf:name "Bob" ] .
        "#;
        let quads =
            RdfParser::parse(input, RdfFormat::Turtle, Some("https://pod.example/card")).unwrap();

        assert_eq!(quads.len(), 4);
        assert_eq!(quads[0].subject.value(), "https://pod.example/card#me");
        assert_eq!(quads[0].predicate.as_str(), RDF_TYPE);
        assert_eq!(quads[1].object.value(), "Alice");
        assert!(quads.iter().any(|q| matches!(q.object, RdfObject::BlankNode(_))));
        assert!(quads
            .iter()
            .any(|q| matches!(q.subject, RdfSubject::BlankNode(_)) && q.object.value() == "Bob"));
    }

    #[test]
    fn test_ntriples_keeps_duplicates() {
        let input = "<http://example.org/a> <http://example.org/p> \"x\" .\n\
                     <http://example.org/a> <http://example.org/p> \"x\" .\n";
        let quads = RdfParser::parse(input, RdfFormat::NTriples, None).unwrap();
        assert_eq!(quads.len(), 2);
        assert_eq!(quads[0], quads[1]);
    }

    #[test]
    fn test_nquads_graph_names() {
        let input = "<http://example.org/a> <http://example.org/p> <http://example.org/b> <http://example.org/g> .\n\
                     <http://example.org/b> <http://example.org/p> \"1\"^^<http://www.w3.org/2001/XMLSchema#integer> .\n";
        let quads = RdfParser::parse(input, RdfFormat::NQuads, None).unwrap();
        assert_eq!(quads[0].graph.as_ref().map(|g| g.as_str()), Some("http://example.org/g"));
        assert!(quads[1].graph.is_none());
    }

    #[test]
    fn test_trig_named_graph() {
        let input = r#"
            @prefix ex: <http://example.org/> .
            ex:g { ex:a ex:p ex:b . }
        "#;
        let quads = RdfParser::parse(input, RdfFormat::TriG, None).unwrap();
        assert_eq!(quads.len(), 1);
        assert_eq!(quads[0].graph.as_ref().map(|g| g.as_str()), Some("http://example.org/g"));
    }

    #[test]
    fn test_malformed_turtle() {
        let err = RdfParser::parse("<http://example.org/a> <http://example.org/p> .", RdfFormat::Turtle, None)
            .unwrap_err();
        assert!(matches!(err, ParseError::Turtle(_)));
    }
}
