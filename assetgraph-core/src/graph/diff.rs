//! Graph Diffing
//!
//! Mutations that report exactly what they changed.
//!
//! # Cascading Removal
//!
//! Removing an edge can leave its target with no incoming edges. Such an
//! orphan is removed too, which removes its outgoing edges, which can orphan
//! further nodes, and so on. Every node and edge dropped this way is collected
//! into a [`Subgraph`] so callers can evict whatever they cached for it.
//!
//! The cascade runs on an explicit worklist instead of mutual recursion
//! between `remove_node` and `remove_edge`, so chains of any length are safe.
//!
//! # Root Exemption
//!
//! The root node never has incoming edges by construction. It is therefore
//! never pruned as an orphan; it only leaves the graph through an explicit
//! [`Graph::remove_node`] call.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

use super::directed::Graph;
use super::node::{Edge, GraphNode, NodeId};

/// A set of nodes and edges produced by a mutation.
///
/// This is a delta, not a committed graph: an edge in a `Subgraph` may point
/// at a node that is still alive in the graph it was removed from.
#[derive(Debug, Clone)]
pub struct Subgraph<N> {
    nodes: IndexMap<NodeId, N>,
    edges: IndexSet<Edge>,
}

impl<N> Default for Subgraph<N> {
    fn default() -> Self {
        Self {
            nodes: IndexMap::new(),
            edges: IndexSet::new(),
        }
    }
}

impl<N: GraphNode> Subgraph<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &N> + '_ {
        self.nodes.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> + '_ {
        self.nodes.keys()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter()
    }

    pub fn get_node(&self, id: &str) -> Option<&N> {
        self.nodes.get(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn contains_edge(&self, edge: &Edge) -> bool {
        self.edges.contains(edge)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Fold another delta into this one.
    pub fn extend(&mut self, other: Subgraph<N>) {
        self.nodes.extend(other.nodes);
        self.edges.extend(other.edges);
    }

    pub(super) fn insert_node(&mut self, node: N) {
        self.nodes.insert(node.id().clone(), node);
    }

    pub(super) fn insert_edge(&mut self, edge: Edge) {
        self.edges.insert(edge);
    }
}

/// The structural change made by [`Graph::replace_nodes_connected_to`].
#[derive(Debug, Clone)]
pub struct GraphDelta<N> {
    pub added: Subgraph<N>,
    pub removed: Subgraph<N>,
}

impl<N> Default for GraphDelta<N> {
    fn default() -> Self {
        Self {
            added: Subgraph::default(),
            removed: Subgraph::default(),
        }
    }
}

impl<N: GraphNode> GraphDelta<N> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// A pending step of a cascading removal.
#[derive(Debug)]
enum Removal {
    Node(NodeId),
    Edge(Edge),
}

impl<N: GraphNode> Graph<N> {
    /// Remove a node, every edge touching it, and everything orphaned as a
    /// result.
    ///
    /// Removing a node that is not in the graph is a no-op and returns an
    /// empty subgraph.
    pub fn remove_node(&mut self, id: &str) -> Subgraph<N> {
        let mut removed = Subgraph::new();
        self.cascade(vec![Removal::Node(NodeId::new(id))], &mut removed);
        removed
    }

    /// Remove every outgoing edge of a node, and everything orphaned as a
    /// result, but keep the node itself.
    pub fn remove_edges(&mut self, id: &str) -> Subgraph<N> {
        let from = NodeId::new(id);
        let pending = self
            .successor_ids(id)
            .into_iter()
            .rev()
            .map(|to| Removal::Edge(Edge::new(&from, to)))
            .collect();

        let mut removed = Subgraph::new();
        self.cascade(pending, &mut removed);
        removed
    }

    /// Remove a single edge. If its target is left without incoming edges,
    /// the target is removed as well, recursively.
    pub fn remove_edge(&mut self, edge: &Edge) -> Subgraph<N> {
        let mut removed = Subgraph::new();
        self.cascade(vec![Removal::Edge(edge.clone())], &mut removed);
        removed
    }

    /// Re-identify a node: every edge pointing at `from` is redirected to
    /// `to_node`, then `from` is removed along with anything it orphans.
    ///
    /// If `from` was the root, `to_node` becomes the root.
    pub fn replace_node(&mut self, from: &str, to_node: N) -> Subgraph<N> {
        let to = to_node.id().clone();
        self.add_node(to_node);
        if to.as_str() == from {
            return Subgraph::new();
        }

        for source in self.predecessor_ids(from) {
            self.add_edge(Edge::new(&source, &to));
            self.unlink(&source, from);
        }
        if self.is_root(from) {
            self.root = Some(to);
        }

        self.remove_node(from)
    }

    /// Make `to_nodes` the exact set of direct successors of `from`.
    ///
    /// Successors that already exist keep their identity and edges; only
    /// their payload is replaced. New successors are inserted. Edges from
    /// `from` to anything not in `to_nodes` are removed with cascading orphan
    /// pruning. The returned delta lists what was added and what was removed;
    /// reused successors appear in neither.
    ///
    /// If `from` is not in the graph nothing is changed and the delta is
    /// empty.
    pub fn replace_nodes_connected_to<I>(&mut self, from: &str, to_nodes: I) -> GraphDelta<N>
    where
        N: Clone,
        I: IntoIterator<Item = N>,
    {
        if !self.has_node(from) {
            debug!(from, "replace skipped, unknown source node");
            return GraphDelta::default();
        }

        let from_id = NodeId::new(from);
        let edges_before = self.successor_ids(from);
        let mut delta = GraphDelta::default();
        let mut wanted = HashSet::new();

        for node in to_nodes {
            let id = node.id().clone();
            wanted.insert(id.clone());

            if self.has_node(&id) {
                self.update_node(node);
            } else {
                delta.added.insert_node(node.clone());
                self.add_node(node);
            }

            let edge = Edge::new(&from_id, id);
            if self.add_edge(edge.clone()) {
                delta.added.insert_edge(edge);
            }
        }

        let stale: Vec<Removal> = edges_before
            .into_iter()
            .filter(|to| !wanted.contains(to))
            .rev()
            .map(|to| Removal::Edge(Edge::new(&from_id, to)))
            .collect();
        self.cascade(stale, &mut delta.removed);

        debug!(
            from = %from_id,
            added_nodes = delta.added.node_count(),
            added_edges = delta.added.edge_count(),
            removed_nodes = delta.removed.node_count(),
            removed_edges = delta.removed.edge_count(),
            "replaced successors"
        );
        delta
    }

    /// Drain the worklist, recording every node and edge actually removed.
    fn cascade(&mut self, mut pending: Vec<Removal>, removed: &mut Subgraph<N>) {
        while let Some(step) = pending.pop() {
            match step {
                Removal::Node(id) => {
                    if let Some(node) = self.nodes.swap_remove(id.as_str()) {
                        trace!(node = %id, "removed node");
                        removed.insert_node(node);
                    }
                    if self.is_root(&id) {
                        self.root = None;
                    }

                    // Incoming edges first so they come off the stack last.
                    pending.extend(
                        self.predecessor_ids(&id)
                            .into_iter()
                            .rev()
                            .map(|from| Removal::Edge(Edge::new(from, &id))),
                    );
                    pending.extend(
                        self.successor_ids(&id)
                            .into_iter()
                            .rev()
                            .map(|to| Removal::Edge(Edge::new(&id, to))),
                    );
                }
                Removal::Edge(edge) => {
                    if !self.unlink(&edge.from, &edge.to) {
                        continue;
                    }
                    trace!(%edge, "removed edge");

                    let orphaned = self.has_node(&edge.to)
                        && !self.is_root(&edge.to)
                        && self.is_orphaned_node(&edge.to);
                    if orphaned {
                        pending.push(Removal::Node(edge.to.clone()));
                    }
                    removed.insert_edge(edge);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;

    fn node(id: &str) -> Node<u32> {
        Node::new(id, 0)
    }

    /// Build a graph rooted at "root" from a list of edges.
    fn graph_of(edges: &[(&str, &str)]) -> Graph<Node<u32>> {
        let mut graph = Graph::new();
        graph.set_root_node(node("root"));
        for (from, to) in edges {
            graph.add_node(node(from));
            graph.add_node(node(to));
            graph.add_edge(Edge::new(*from, *to));
        }
        graph
    }

    #[test]
    fn remove_edge_prunes_orphan() {
        let mut graph = graph_of(&[("root", "a"), ("a", "b")]);

        let removed = graph.remove_edge(&Edge::new("a", "b"));

        assert!(removed.contains_edge(&Edge::new("a", "b")));
        assert!(removed.contains_node("b"));
        assert_eq!(removed.node_count(), 1);
        assert!(!graph.has_node("b"));
        assert!(graph.has_node("a"));
    }

    #[test]
    fn remove_edge_keeps_node_with_other_parent() {
        let mut graph = graph_of(&[("root", "a"), ("a", "b"), ("root", "b")]);

        let removed = graph.remove_edge(&Edge::new("a", "b"));

        assert_eq!(removed.edge_count(), 1);
        assert_eq!(removed.node_count(), 0);
        assert!(graph.has_node("b"));
    }

    #[test]
    fn remove_node_cascades_down_chain() {
        let mut graph = graph_of(&[("root", "a"), ("a", "b"), ("b", "c")]);

        let removed = graph.remove_node("a");

        for id in ["a", "b", "c"] {
            assert!(removed.contains_node(id), "{id} should be removed");
            assert!(!graph.has_node(id));
        }
        for (from, to) in [("root", "a"), ("a", "b"), ("b", "c")] {
            assert!(removed.contains_edge(&Edge::new(from, to)));
        }
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn remove_node_twice_is_noop() {
        let mut graph = graph_of(&[("root", "a")]);

        assert!(!graph.remove_node("a").is_empty());
        assert!(graph.remove_node("a").is_empty());
        assert!(graph.remove_node("never-existed").is_empty());
    }

    #[test]
    fn remove_edges_keeps_source() {
        let mut graph = graph_of(&[("root", "a"), ("a", "b"), ("a", "c")]);

        let removed = graph.remove_edges("a");

        assert!(graph.has_node("a"));
        assert!(!graph.has_node("b"));
        assert!(!graph.has_node("c"));
        assert_eq!(removed.edge_count(), 2);
        assert_eq!(removed.node_count(), 2);
    }

    #[test]
    fn root_is_never_pruned_as_orphan() {
        let mut graph = graph_of(&[("root", "a"), ("a", "root")]);

        let removed = graph.remove_edge(&Edge::new("a", "root"));

        assert!(!removed.contains_node("root"));
        assert!(graph.has_node("root"));
    }

    #[test]
    fn removing_root_clears_designation() {
        let mut graph = graph_of(&[("root", "a")]);

        graph.remove_node("root");

        assert!(graph.root_id().is_none());
        assert!(graph.is_empty());
    }

    #[test]
    fn replace_node_rewires_parents() {
        let mut graph = graph_of(&[("root", "old"), ("old", "child"), ("other", "old")]);

        let removed = graph.replace_node("old", node("new"));

        assert!(graph.has_edge(&Edge::new("root", "new")));
        assert!(graph.has_edge(&Edge::new("other", "new")));
        assert!(!graph.has_node("old"));
        assert!(removed.contains_node("old"));
        assert!(removed.contains_node("child"));
    }

    #[test]
    fn replace_node_moves_root() {
        let mut graph = graph_of(&[("root", "a")]);

        let removed = graph.replace_node("root", node("entry"));

        assert_eq!(graph.root_id().map(NodeId::as_str), Some("entry"));
        // Only incoming edges are rewired, so the old root's children go with it.
        assert!(removed.contains_node("root"));
        assert!(removed.contains_node("a"));
        assert!(!graph.has_edge(&Edge::new("entry", "a")));
    }

    #[test]
    fn replace_nodes_connected_to_reuses_survivors() {
        let mut graph = graph_of(&[("root", "x"), ("root", "y"), ("y", "y-child")]);

        let delta = graph.replace_nodes_connected_to("root", vec![Node::new("x", 9), node("z")]);

        assert!(delta.added.contains_node("z"));
        assert!(delta.added.contains_edge(&Edge::new("root", "z")));
        assert_eq!(delta.added.node_count(), 1);
        assert_eq!(delta.added.edge_count(), 1);

        assert!(delta.removed.contains_node("y"));
        assert!(delta.removed.contains_node("y-child"));
        assert!(delta.removed.contains_edge(&Edge::new("root", "y")));
        assert!(!delta.removed.contains_node("x"));

        assert_eq!(graph.get_node("x").map(|n| n.value), Some(9));
        assert!(graph.has_edge(&Edge::new("root", "x")));
    }

    #[test]
    fn replace_nodes_connected_to_links_existing_nodes() {
        let mut graph = graph_of(&[("root", "a"), ("root", "b")]);

        let delta = graph.replace_nodes_connected_to("a", vec![node("b")]);

        assert!(graph.has_edge(&Edge::new("a", "b")));
        assert!(delta.added.contains_edge(&Edge::new("a", "b")));
        assert_eq!(delta.added.node_count(), 0);
        assert!(delta.removed.is_empty());
    }

    #[test]
    fn replace_from_unknown_node_changes_nothing() {
        let mut graph = graph_of(&[("root", "a")]);

        let delta = graph.replace_nodes_connected_to("ghost", vec![node("a"), node("new")]);

        assert!(delta.is_empty());
        assert!(!graph.has_node("ghost"));
        assert!(!graph.has_node("new"));
        assert_eq!(graph.edge_count(), 1);
        assert!(Graph::from_serialized(graph.to_serialized()).is_ok());
    }

    #[test]
    fn replace_with_same_successors_is_empty_delta() {
        let mut graph = graph_of(&[("root", "a"), ("root", "b")]);

        let delta = graph.replace_nodes_connected_to("root", vec![node("a"), node("b")]);

        assert!(delta.is_empty());
        assert_eq!(graph.edge_count(), 2);
    }
}
