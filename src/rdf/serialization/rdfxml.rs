//! RDF/XML parser

use super::turtle::collect_triples;
use super::ParseResult;
use crate::rdf::Quad;
use oxiri::Iri;
use rio_xml::RdfXmlParser;
use std::io::Cursor;

pub(super) fn parse_rdfxml(input: &str, base: Option<Iri<String>>) -> ParseResult<Vec<Quad>> {
    let mut parser = RdfXmlParser::new(Cursor::new(input), base);
    collect_triples(&mut parser)
}

#[cfg(test)]
mod tests {
    use crate::rdf::serialization::{ParseError, RdfFormat, RdfParser};

    #[test]
    fn test_rdfxml_document() {
        let input = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:foaf="http://xmlns.com/foaf/0.1/">
  <foaf:Person rdf:about="http://example.org/alice">
    <foaf:name>Alice</foaf:name>
  </foaf:Person>
</rdf:RDF>"#;
        let quads = RdfParser::parse(input, RdfFormat::RdfXml, None).unwrap();
        assert_eq!(quads.len(), 2);
        assert!(quads.iter().all(|q| q.subject.value() == "http://example.org/alice"));
        assert!(quads.iter().any(|q| q.object.value() == "Alice"));
        assert!(quads.iter().any(|q| q.object.value() == "http://xmlns.com/foaf/0.1/Person"));
    }

    #[test]
    fn test_malformed_rdfxml() {
        let err = RdfParser::parse("<rdf:RDF", RdfFormat::RdfXml, None).unwrap_err();
        assert!(matches!(err, ParseError::RdfXml(_)));
    }
}
