//! Subgraph extraction
//!
//! `extract` returns the quads reachable from the instances of a class:
//! each root's quads in store order, with every node object expanded
//! depth-first right after the quad that reaches it. Roots start visited
//! and no subject is expanded twice, so cyclic graphs terminate.

use super::Cancellation;
use crate::config::ExtractionConfig;
use crate::error::{ResolveError, ResolveResult};
use crate::rdf::{rdf_type, NamedNode, Quad, QuadStore, RdfObject, RdfSubject};
use rayon::prelude::*;
use rayon::ThreadPool;
use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Extracts closed subgraphs, fanning out per-instance work on a rayon pool
#[derive(Debug, Clone)]
pub struct SubgraphExtractor {
    pool: Option<Arc<ThreadPool>>,
    parallel_threshold: usize,
}

impl Default for SubgraphExtractor {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

impl SubgraphExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        let pool = if config.worker_threads == 0 {
            None
        } else {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(config.worker_threads)
                .thread_name(|i| format!("sdx-extract-{}", i))
                .build()
            {
                Ok(pool) => Some(Arc::new(pool)),
                Err(e) => {
                    warn!("Cannot build extraction pool, using the global pool: {}", e);
                    None
                }
            }
        };

        Self {
            pool,
            parallel_threshold: config.parallel_threshold.max(1),
        }
    }

    /// Subjects typed with the class, in discovery order
    pub fn instances(quads: &QuadStore, class_iri: &NamedNode) -> Vec<RdfSubject> {
        let class = RdfObject::from(class_iri.clone());
        quads.subjects(Some(&rdf_type()), Some(&class), None)
    }

    /// Closed subgraph of the class instances, optionally restricted to the
    /// instance whose value equals `identifier`
    pub fn extract(
        &self,
        quads: &QuadStore,
        class_iri: &NamedNode,
        identifier: Option<&str>,
        cancellation: &Cancellation,
    ) -> ResolveResult<QuadStore> {
        let mut roots = Self::instances(quads, class_iri);
        if let Some(id) = identifier {
            roots.retain(|root| root.value() == id);
        }

        let subgraph = expand(quads, &roots, cancellation)?;
        debug!(
            class = class_iri.as_str(),
            identifier,
            roots = roots.len(),
            quads = subgraph.len(),
            "Extracted subgraph"
        );
        Ok(subgraph)
    }

    /// One closed subgraph per instance of the class, in discovery order
    pub fn extract_all(
        &self,
        quads: &QuadStore,
        class_iri: &NamedNode,
        cancellation: &Cancellation,
    ) -> ResolveResult<Vec<QuadStore>> {
        let roots = Self::instances(quads, class_iri);
        let single = |root: &RdfSubject| expand(quads, std::slice::from_ref(root), cancellation);

        let subgraphs = if roots.len() >= self.parallel_threshold {
            let run = || roots.par_iter().map(single).collect::<ResolveResult<Vec<_>>>();
            match &self.pool {
                Some(pool) => pool.install(run),
                None => run(),
            }
        } else {
            roots.iter().map(single).collect::<ResolveResult<Vec<_>>>()
        }?;

        debug!(
            class = class_iri.as_str(),
            instances = subgraphs.len(),
            "Partitioned instances"
        );
        Ok(subgraphs)
    }
}

/// Depth-first pre-order expansion from the given roots
fn expand(
    quads: &QuadStore,
    roots: &[RdfSubject],
    cancellation: &Cancellation,
) -> ResolveResult<QuadStore> {
    if cancellation.is_cancelled() {
        return Err(ResolveError::Cancelled);
    }

    let mut visited: FxHashSet<RdfSubject> = roots.iter().cloned().collect();
    let mut out = QuadStore::new();

    for root in roots {
        let mut stack: Vec<std::vec::IntoIter<&Quad>> =
            vec![quads.match_quads(Some(root), None, None, None).into_iter()];

        while let Some(frame) = stack.last_mut() {
            if cancellation.is_cancelled() {
                return Err(ResolveError::Cancelled);
            }
            let Some(quad) = frame.next() else {
                stack.pop();
                continue;
            };

            out.insert(quad.clone());
            if let Some(next) = quad.object.as_subject() {
                if visited.insert(next.clone()) {
                    stack.push(quads.match_quads(Some(&next), None, None, None).into_iter());
                }
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::{BlankNode, Literal, RdfPredicate};

    fn iri(s: &str) -> NamedNode {
        NamedNode::new(&format!("http://example.org/{}", s)).unwrap()
    }

    fn pred(s: &str) -> RdfPredicate {
        iri(s).into()
    }

    fn typed(s: &str, class: &str) -> Quad {
        Quad::triple(iri(s).into(), rdf_type(), iri(class).into())
    }

    fn link(s: &str, p: &str, o: &str) -> Quad {
        Quad::triple(iri(s).into(), pred(p), iri(o).into())
    }

    fn lit(s: &str, p: &str, value: &str) -> Quad {
        Quad::triple(iri(s).into(), pred(p), Literal::new_simple_literal(value).into())
    }

    fn people() -> QuadStore {
        QuadStore::from(vec![
            typed("alice", "Person"),
            lit("alice", "name", "Alice"),
            link("alice", "address", "addr1"),
            typed("bob", "Person"),
            lit("bob", "name", "Bob"),
            lit("addr1", "city", "Paris"),
            lit("carol", "name", "Carol"),
        ])
    }

    #[test]
    fn test_extract_depth_first_order() {
        let extractor = SubgraphExtractor::default();
        let subgraph = extractor
            .extract(&people(), &iri("Person"), None, &Cancellation::new())
            .unwrap();

        let expected = vec![
            typed("alice", "Person"),
            lit("alice", "name", "Alice"),
            link("alice", "address", "addr1"),
            lit("addr1", "city", "Paris"),
            typed("bob", "Person"),
            lit("bob", "name", "Bob"),
        ];
        assert_eq!(subgraph.into_quads(), expected);
    }

    #[test]
    fn test_extract_with_identifier() {
        let extractor = SubgraphExtractor::default();
        let store = people();
        let subgraph = extractor
            .extract(&store, &iri("Person"), Some("http://example.org/bob"), &Cancellation::new())
            .unwrap();
        assert_eq!(subgraph.len(), 2);
        assert!(subgraph.iter().all(|q| q.subject.value() == "http://example.org/bob"));

        let missing = extractor
            .extract(&store, &iri("Person"), Some("ex:missing"), &Cancellation::new())
            .unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn test_extract_terminates_on_cycle() {
        let store = QuadStore::from(vec![
            typed("a", "Node"),
            link("a", "knows", "b"),
            link("b", "knows", "a"),
        ]);
        let subgraph = SubgraphExtractor::default()
            .extract(&store, &iri("Node"), None, &Cancellation::new())
            .unwrap();

        assert_eq!(subgraph.len(), 3);
        assert_eq!(subgraph.quads()[1], link("a", "knows", "b"));
        assert_eq!(subgraph.quads()[2], link("b", "knows", "a"));
    }

    #[test]
    fn test_blank_nodes_are_followed() {
        let blank = BlankNode::with_id("addr").unwrap();
        let store = QuadStore::from(vec![
            typed("alice", "Person"),
            Quad::triple(iri("alice").into(), pred("address"), blank.clone().into()),
            Quad::triple(blank.into(), pred("city"), Literal::new_simple_literal("Paris").into()),
        ]);
        let subgraph = SubgraphExtractor::default()
            .extract(&store, &iri("Person"), None, &Cancellation::new())
            .unwrap();
        assert_eq!(subgraph.len(), 3);
    }

    #[test]
    fn test_extract_all_partitions_in_discovery_order() {
        let parts = SubgraphExtractor::default()
            .extract_all(&people(), &iri("Person"), &Cancellation::new())
            .unwrap();

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].quads()[0].subject.value(), "http://example.org/alice");
        assert_eq!(parts[0].len(), 4);
        assert_eq!(parts[1].quads()[0].subject.value(), "http://example.org/bob");
    }

    #[test]
    fn test_parallel_extract_all_matches_sequential() {
        let mut quads = Vec::new();
        for i in 0..50 {
            let name = format!("p{}", i);
            quads.push(typed(&name, "Person"));
            quads.push(lit(&name, "name", &name));
            quads.push(link(&name, "knows", &format!("p{}", (i + 1) % 50)));
        }
        let store = QuadStore::from(quads);

        let sequential = SubgraphExtractor::new(&ExtractionConfig {
            worker_threads: 0,
            parallel_threshold: usize::MAX,
        })
        .extract_all(&store, &iri("Person"), &Cancellation::new())
        .unwrap();
        let parallel = SubgraphExtractor::new(&ExtractionConfig {
            worker_threads: 4,
            parallel_threshold: 1,
        })
        .extract_all(&store, &iri("Person"), &Cancellation::new())
        .unwrap();

        assert_eq!(sequential.len(), 50);
        for (a, b) in sequential.iter().zip(&parallel) {
            assert_eq!(a.quads(), b.quads());
        }
    }

    #[test]
    fn test_cancelled_extraction() {
        let cancellation = Cancellation::new();
        cancellation.cancel();
        let result =
            SubgraphExtractor::default().extract(&people(), &iri("Person"), None, &cancellation);
        assert!(matches!(result, Err(ResolveError::Cancelled)));
    }

    #[test]
    fn test_no_instances() {
        let subgraph = SubgraphExtractor::default()
            .extract(&people(), &iri("Robot"), None, &Cancellation::new())
            .unwrap();
        assert!(subgraph.is_empty());
    }
}
