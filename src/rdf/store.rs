//! In-memory quad store
//!
//! Quads are kept in insertion order with duplicates preserved. Two position
//! indexes (by subject and by predicate) narrow lookups; every result is
//! returned in store order regardless of which index served it.

use super::types::{NamedNode, Quad, RdfObject, RdfPredicate, RdfSubject};
use indexmap::IndexSet;
use rustc_hash::FxHashMap;

/// Ordered quad collection with subject and predicate indexes
#[derive(Debug, Clone, Default)]
pub struct QuadStore {
    /// All quads (primary storage, store order)
    quads: Vec<Quad>,

    /// Subject -> positions in `quads`, ascending
    subject_index: FxHashMap<RdfSubject, Vec<usize>>,

    /// Predicate -> positions in `quads`, ascending
    predicate_index: FxHashMap<RdfPredicate, Vec<usize>>,
}

impl QuadStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append quads to the store
    pub fn add(&mut self, quads: impl IntoIterator<Item = Quad>) {
        for quad in quads {
            self.insert(quad);
        }
    }

    /// Append one quad to the store
    pub fn insert(&mut self, quad: Quad) {
        let position = self.quads.len();
        self.subject_index
            .entry(quad.subject.clone())
            .or_default()
            .push(position);
        self.predicate_index
            .entry(quad.predicate.clone())
            .or_default()
            .push(position);
        self.quads.push(quad);
    }

    /// Number of quads, duplicates included
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// All quads in store order
    pub fn quads(&self) -> &[Quad] {
        &self.quads
    }

    /// Iterate over all quads in store order
    pub fn iter(&self) -> impl Iterator<Item = &Quad> {
        self.quads.iter()
    }

    /// Consume the store, returning its quads in store order
    pub fn into_quads(self) -> Vec<Quad> {
        self.quads
    }

    /// Quads matching the given positions (None = wildcard), in store order
    pub fn match_quads(
        &self,
        subject: Option<&RdfSubject>,
        predicate: Option<&RdfPredicate>,
        object: Option<&RdfObject>,
        graph: Option<&NamedNode>,
    ) -> Vec<&Quad> {
        self.candidates(subject, predicate)
            .filter(|quad| {
                object.map_or(true, |o| &quad.object == o)
                    && graph.map_or(true, |g| quad.graph.as_ref() == Some(g))
            })
            .collect()
    }

    /// Distinct subjects of matching quads, in first-discovery order
    pub fn subjects(
        &self,
        predicate: Option<&RdfPredicate>,
        object: Option<&RdfObject>,
        graph: Option<&NamedNode>,
    ) -> Vec<RdfSubject> {
        self.match_quads(None, predicate, object, graph)
            .into_iter()
            .map(|quad| quad.subject.clone())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect()
    }

    /// Objects of matching quads, in store order
    pub fn objects(
        &self,
        subject: Option<&RdfSubject>,
        predicate: Option<&RdfPredicate>,
        graph: Option<&NamedNode>,
    ) -> Vec<RdfObject> {
        self.match_quads(subject, predicate, None, graph)
            .into_iter()
            .map(|quad| quad.object.clone())
            .collect()
    }

    /// Whether any quad has this subject
    pub fn has_subject(&self, subject: &RdfSubject) -> bool {
        self.subject_index.contains_key(subject)
    }

    fn candidates<'a>(
        &'a self,
        subject: Option<&RdfSubject>,
        predicate: Option<&RdfPredicate>,
    ) -> Box<dyn Iterator<Item = &'a Quad> + 'a> {
        let positions = match (subject, predicate) {
            (Some(s), Some(p)) => {
                let by_subject = self.positions_for_subject(s);
                let by_predicate = self.positions_for_predicate(p);
                // Walk the shorter list, filter on the other position.
                let (short, filter_subject) = if by_subject.len() <= by_predicate.len() {
                    (by_subject, false)
                } else {
                    (by_predicate, true)
                };
                let subject = s.clone();
                let predicate = p.clone();
                return Box::new(short.iter().map(move |&i| &self.quads[i]).filter(move |quad| {
                    if filter_subject {
                        quad.subject == subject
                    } else {
                        quad.predicate == predicate
                    }
                }));
            }
            (Some(s), None) => self.positions_for_subject(s),
            (None, Some(p)) => self.positions_for_predicate(p),
            (None, None) => return Box::new(self.quads.iter()),
        };
        Box::new(positions.iter().map(move |&i| &self.quads[i]))
    }

    fn positions_for_subject(&self, subject: &RdfSubject) -> &[usize] {
        self.subject_index
            .get(subject)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn positions_for_predicate(&self, predicate: &RdfPredicate) -> &[usize] {
        self.predicate_index
            .get(predicate)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl From<Vec<Quad>> for QuadStore {
    fn from(quads: Vec<Quad>) -> Self {
        let mut store = Self::new();
        store.add(quads);
        store
    }
}

impl FromIterator<Quad> for QuadStore {
    fn from_iter<I: IntoIterator<Item = Quad>>(iter: I) -> Self {
        let mut store = Self::new();
        store.add(iter);
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::types::{Literal, NamedNode};
    use crate::rdf::RDF_TYPE;

    fn iri(s: &str) -> NamedNode {
        NamedNode::new(s).unwrap()
    }

    fn name_quad(subject: &str, name: &str) -> Quad {
        Quad::triple(
            iri(subject).into(),
            RdfPredicate::new("http://xmlns.com/foaf/0.1/name").unwrap(),
            Literal::new_simple_literal(name).into(),
        )
    }

    fn type_quad(subject: &str, class: &str) -> Quad {
        Quad::triple(
            iri(subject).into(),
            RdfPredicate::new(RDF_TYPE).unwrap(),
            iri(class).into(),
        )
    }

    #[test]
    fn test_add_preserves_duplicates_and_order() {
        let mut store = QuadStore::new();
        store.add(vec![
            name_quad("http://example.org/alice", "Alice"),
            name_quad("http://example.org/alice", "Alice"),
            name_quad("http://example.org/bob", "Bob"),
        ]);

        assert_eq!(store.len(), 3);
        assert_eq!(store.quads()[0], store.quads()[1]);
        assert_eq!(store.quads()[2].object.value(), "Bob");
    }

    #[test]
    fn test_match_by_subject() {
        let store: QuadStore = vec![
            name_quad("http://example.org/alice", "Alice"),
            name_quad("http://example.org/bob", "Bob"),
            type_quad("http://example.org/alice", "http://example.org/Person"),
        ]
        .into();

        let alice: RdfSubject = iri("http://example.org/alice").into();
        let results = store.match_quads(Some(&alice), None, None, None);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].object.value(), "Alice");
        assert_eq!(results[1].object.value(), "http://example.org/Person");
    }

    #[test]
    fn test_subjects_are_distinct_in_discovery_order() {
        let store: QuadStore = vec![
            type_quad("http://example.org/bob", "http://example.org/Person"),
            type_quad("http://example.org/alice", "http://example.org/Person"),
            type_quad("http://example.org/bob", "http://example.org/Person"),
            type_quad("http://example.org/acme", "http://example.org/Company"),
        ]
        .into();

        let rdf_type = RdfPredicate::new(RDF_TYPE).unwrap();
        let person: RdfObject = iri("http://example.org/Person").into();
        let subjects = store.subjects(Some(&rdf_type), Some(&person), None);
        let values: Vec<_> = subjects.iter().map(|s| s.value()).collect();
        assert_eq!(values, vec!["http://example.org/bob", "http://example.org/alice"]);
    }

    #[test]
    fn test_objects_in_store_order() {
        let store: QuadStore = vec![
            name_quad("http://example.org/alice", "Alice"),
            name_quad("http://example.org/bob", "Bob"),
            name_quad("http://example.org/alice", "Ally"),
        ]
        .into();

        let alice: RdfSubject = iri("http://example.org/alice").into();
        let name = RdfPredicate::new("http://xmlns.com/foaf/0.1/name").unwrap();
        let objects = store.objects(Some(&alice), Some(&name), None);
        let values: Vec<_> = objects.iter().map(|o| o.value()).collect();
        assert_eq!(values, vec!["Alice", "Ally"]);
    }

    #[test]
    fn test_graph_filter() {
        let graph = iri("http://example.org/g");
        let mut quad = name_quad("http://example.org/alice", "Alice");
        quad.graph = Some(graph.clone());
        let store: QuadStore = vec![quad, name_quad("http://example.org/alice", "Default")].into();

        assert_eq!(store.match_quads(None, None, None, Some(&graph)).len(), 1);
        assert_eq!(store.match_quads(None, None, None, None).len(), 2);
    }

    #[test]
    fn test_wildcard_match_returns_everything() {
        let store: QuadStore = vec![
            name_quad("http://example.org/alice", "Alice"),
            name_quad("http://example.org/bob", "Bob"),
        ]
        .into();
        assert_eq!(store.match_quads(None, None, None, None).len(), 2);
        assert!(store.has_subject(&iri("http://example.org/bob").into()));
        assert!(!store.has_subject(&iri("http://example.org/carol").into()));
    }
}
