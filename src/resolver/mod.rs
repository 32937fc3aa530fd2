//! Field resolution engine
//!
//! For each field met while answering a query the dispatcher decides whether
//! it is a root entry point, a scalar, an object, or a list of either, and
//! extracts exactly the quads needed to answer it and its descendants.
//!
//! - [`fetch`]: one retrieval + one parse per root field
//! - [`extractor`]: closed subgraph extraction with visited-subject tracking
//! - [`classify`]: the pure field shape function
//! - [`dispatcher`]: per-field resolution, threading quads to children

pub mod classify;
pub mod dispatcher;
pub mod extractor;
pub mod fetch;

pub use classify::{classify, FieldShape};
pub use dispatcher::{FieldResolver, Resolved, ResolutionContext};
pub use extractor::SubgraphExtractor;
pub use fetch::{FetchError, GraphFetcher, HttpGraphFetcher};

use crate::rdf::QuadStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Quads visible at one resolution step
pub type Source = Arc<QuadStore>;

/// Caller-driven cancellation handle, shared by clones
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; every clone observes it
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_shared_by_clones() {
        let handle = Cancellation::new();
        let clone = handle.clone();
        assert!(!clone.is_cancelled());
        handle.cancel();
        assert!(clone.is_cancelled());
    }
}
