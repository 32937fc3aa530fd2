//! RDF document parsing
//!
//! Supports:
//! - Turtle (TTL), also used for `text/n3` documents
//! - N-Triples (NT)
//! - N-Quads (NQ)
//! - TriG
//! - RDF/XML
//!
//! Parsers produce an ordered quad sequence; duplicates are kept as parsed.

mod rdfxml;
mod turtle;

use super::types::{Quad, RdfError};
use oxiri::Iri;
use thiserror::Error;

/// RDF serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RdfFormat {
    /// Turtle format (.ttl)
    Turtle,
    /// N-Triples format (.nt)
    NTriples,
    /// N-Quads format (.nq)
    NQuads,
    /// TriG format (.trig)
    TriG,
    /// RDF/XML format (.rdf)
    RdfXml,
}

impl RdfFormat {
    /// All formats, in content negotiation preference order
    pub const ALL: [RdfFormat; 5] = [
        RdfFormat::Turtle,
        RdfFormat::NTriples,
        RdfFormat::NQuads,
        RdfFormat::TriG,
        RdfFormat::RdfXml,
    ];

    /// Canonical media type
    pub fn media_type(self) -> &'static str {
        match self {
            RdfFormat::Turtle => "text/turtle",
            RdfFormat::NTriples => "application/n-triples",
            RdfFormat::NQuads => "application/n-quads",
            RdfFormat::TriG => "application/trig",
            RdfFormat::RdfXml => "application/rdf+xml",
        }
    }

    /// Format for a `Content-Type` header value, parameters ignored
    pub fn from_media_type(content_type: &str) -> Option<Self> {
        let mime: mime::Mime = content_type.trim().parse().ok()?;
        match mime.essence_str() {
            "text/turtle" | "application/x-turtle" | "text/n3" => Some(RdfFormat::Turtle),
            "application/n-triples" => Some(RdfFormat::NTriples),
            "application/n-quads" => Some(RdfFormat::NQuads),
            "application/trig" => Some(RdfFormat::TriG),
            "application/rdf+xml" | "application/xml" | "text/xml" => Some(RdfFormat::RdfXml),
            _ => None,
        }
    }

    /// Format for a file extension
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "ttl" | "turtle" | "n3" => Some(RdfFormat::Turtle),
            "nt" => Some(RdfFormat::NTriples),
            "nq" => Some(RdfFormat::NQuads),
            "trig" => Some(RdfFormat::TriG),
            "rdf" | "owl" | "xml" => Some(RdfFormat::RdfXml),
            _ => None,
        }
    }

    /// Format guessed from the extension of a location's last path segment
    pub fn from_location(location: &str) -> Option<Self> {
        let path = location
            .split(['?', '#'])
            .next()
            .unwrap_or(location);
        let segment = path.rsplit('/').next()?;
        let (_, extension) = segment.rsplit_once('.')?;
        Self::from_extension(extension)
    }

    /// `Accept` header value offering every supported format
    pub fn accept_header() -> String {
        Self::ALL
            .iter()
            .enumerate()
            .map(|(i, format)| match i {
                0 => format.media_type().to_string(),
                _ => format!("{};q=0.9", format.media_type()),
            })
            .chain(std::iter::once("*/*;q=0.1".to_string()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RdfFormat::Turtle => "Turtle",
            RdfFormat::NTriples => "N-Triples",
            RdfFormat::NQuads => "N-Quads",
            RdfFormat::TriG => "TriG",
            RdfFormat::RdfXml => "RDF/XML",
        };
        f.write_str(name)
    }
}

/// Parse errors
#[derive(Error, Debug)]
pub enum ParseError {
    /// Turtle-family syntax error
    #[error("Turtle syntax error: {0}")]
    Turtle(#[from] rio_turtle::TurtleError),

    /// RDF/XML syntax error
    #[error("RDF/XML syntax error: {0}")]
    RdfXml(#[from] rio_xml::RdfXmlError),

    /// A parsed term was rejected by the term model
    #[error("Invalid term: {0}")]
    Term(#[from] RdfError),

    /// Construct outside the supported term model
    #[error("Unsupported construct: {0}")]
    Unsupported(String),

    /// The base IRI is not an absolute IRI
    #[error("Invalid base IRI: {0}")]
    InvalidBase(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// RDF parser
pub struct RdfParser;

impl RdfParser {
    /// Parse an RDF document into quads, in document order.
    ///
    /// Relative IRIs are resolved against `base_iri` when given.
    pub fn parse(input: &str, format: RdfFormat, base_iri: Option<&str>) -> ParseResult<Vec<Quad>> {
        let base = base_iri.map(parse_base).transpose()?;
        match format {
            RdfFormat::Turtle => turtle::parse_turtle(input, base),
            RdfFormat::NTriples => turtle::parse_ntriples(input),
            RdfFormat::NQuads => turtle::parse_nquads(input),
            RdfFormat::TriG => turtle::parse_trig(input, base),
            RdfFormat::RdfXml => rdfxml::parse_rdfxml(input, base),
        }
    }
}

fn parse_base(base: &str) -> ParseResult<Iri<String>> {
    Iri::parse(base.to_string()).map_err(|e| ParseError::InvalidBase(format!("{base}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_negotiation() {
        assert_eq!(RdfFormat::from_media_type("text/turtle"), Some(RdfFormat::Turtle));
        assert_eq!(
            RdfFormat::from_media_type("text/turtle; charset=utf-8"),
            Some(RdfFormat::Turtle)
        );
        assert_eq!(
            RdfFormat::from_media_type("application/rdf+xml"),
            Some(RdfFormat::RdfXml)
        );
        assert_eq!(RdfFormat::from_media_type("text/html"), None);
        assert_eq!(RdfFormat::from_media_type("not a mime"), None);
    }

    #[test]
    fn test_format_from_location() {
        assert_eq!(
            RdfFormat::from_location("https://pod.example/profile/card.ttl#me"),
            Some(RdfFormat::Turtle)
        );
        assert_eq!(RdfFormat::from_location("/tmp/data.nq"), Some(RdfFormat::NQuads));
        assert_eq!(RdfFormat::from_location("https://pod.example/profile/card"), None);
    }

    #[test]
    fn test_accept_header_lists_all_formats() {
        let accept = RdfFormat::accept_header();
        assert!(accept.starts_with("text/turtle, "));
        for format in RdfFormat::ALL {
            assert!(accept.contains(format.media_type()));
        }
    }

    #[test]
    fn test_invalid_base_rejected() {
        let err = RdfParser::parse("", RdfFormat::Turtle, Some("relative/base")).unwrap_err();
        assert!(matches!(err, ParseError::InvalidBase(_)));
    }
}
