//! Shared Graph
//!
//! The graph has no internal locking. Callers that share one across threads
//! (parallel transformers reading while a single rebuild loop writes) wrap
//! it in a [`SharedGraph`], which hands out read guards to any number of
//! readers and a write guard to exactly one writer.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::directed::Graph;
use super::node::GraphNode;

/// A cloneable, lock-protected handle to a [`Graph`].
pub struct SharedGraph<N> {
    inner: Arc<RwLock<Graph<N>>>,
}

impl<N> Clone for SharedGraph<N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<N: GraphNode> SharedGraph<N> {
    pub fn new(graph: Graph<N>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(graph)),
        }
    }

    /// Acquire shared access for traversals and lookups.
    pub fn read(&self) -> RwLockReadGuard<'_, Graph<N>> {
        self.inner.read()
    }

    /// Acquire exclusive access for mutations.
    pub fn write(&self) -> RwLockWriteGuard<'_, Graph<N>> {
        self.inner.write()
    }

    /// Run `f` with exclusive access and return its result.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut Graph<N>) -> R) -> R {
        f(&mut self.inner.write())
    }
}

impl<N: GraphNode> Default for SharedGraph<N> {
    fn default() -> Self {
        Self::new(Graph::new())
    }
}
