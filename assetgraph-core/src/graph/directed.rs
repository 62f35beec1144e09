//! Directed Graph
//!
//! The structural half of the graph: node storage, edge storage and the
//! lookups every other operation is built from.
//!
//! # Storage
//!
//! Nodes live in an insertion-ordered map keyed by [`NodeId`]. Edges are not
//! stored as a flat list; instead the graph keeps a forward map (node to its
//! successors) and a reverse map (node to its predecessors). Both maps are
//! keyed by id rather than by node, so an edge may be added before its target
//! node exists. Empty adjacency sets are pruned as soon as they drain.

use indexmap::map::Entry;
use indexmap::{IndexMap, IndexSet};

use super::node::{Edge, GraphNode, NodeId};

/// A mutable directed graph over payloads of type `N`.
#[derive(Debug, Clone)]
pub struct Graph<N> {
    /// All nodes, indexed by ID.
    pub(super) nodes: IndexMap<NodeId, N>,

    /// Successors of each node (edges leaving it).
    pub(super) outbound: IndexMap<NodeId, IndexSet<NodeId>>,

    /// Predecessors of each node (edges arriving at it).
    pub(super) inbound: IndexMap<NodeId, IndexSet<NodeId>>,

    pub(super) edge_count: usize,

    /// Designated entry point for traversal.
    pub(super) root: Option<NodeId>,
}

impl<N> Default for Graph<N> {
    fn default() -> Self {
        Self {
            nodes: IndexMap::new(),
            outbound: IndexMap::new(),
            inbound: IndexMap::new(),
            edge_count: 0,
            root: None,
        }
    }
}

impl<N: GraphNode> Graph<N> {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, overwriting any node already stored under its id.
    pub fn add_node(&mut self, node: N) -> &N {
        match self.nodes.entry(node.id().clone()) {
            Entry::Occupied(mut entry) => {
                entry.insert(node);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(node),
        }
    }

    /// Check whether a node with the given id is in the graph.
    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Get a node by id.
    pub fn get_node(&self, id: &str) -> Option<&N> {
        self.nodes.get(id)
    }

    /// Replace the payload of an existing node, leaving its edges untouched.
    ///
    /// Returns the previous payload. If no node with that id exists the graph
    /// is left unchanged and `None` is returned.
    pub fn update_node(&mut self, node: N) -> Option<N> {
        let id = node.id().clone();
        self.nodes
            .get_mut(id.as_str())
            .map(|slot| std::mem::replace(slot, node))
    }

    /// Designate the traversal entry point, adding the node if needed.
    pub fn set_root_node(&mut self, node: N) -> &N {
        self.root = Some(node.id().clone());
        self.add_node(node)
    }

    /// Get the root node, if one is set and still present.
    pub fn root_node(&self) -> Option<&N> {
        self.root.as_deref().and_then(|id| self.nodes.get(id))
    }

    /// Get the root node's id.
    pub fn root_id(&self) -> Option<&NodeId> {
        self.root.as_ref()
    }

    pub(super) fn is_root(&self, id: &str) -> bool {
        self.root.as_deref() == Some(id)
    }

    /// Insert an edge. Returns `false` if the edge was already present.
    ///
    /// Endpoints are not validated: an edge may be added before its target,
    /// as long as the target is added before any traversal reaches it.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        let inserted = self
            .outbound
            .entry(edge.from.clone())
            .or_default()
            .insert(edge.to.clone());

        if inserted {
            self.inbound.entry(edge.to).or_default().insert(edge.from);
            self.edge_count += 1;
        }
        inserted
    }

    /// Exact `(from, to)` membership test.
    pub fn has_edge(&self, edge: &Edge) -> bool {
        self.outbound
            .get(edge.from.as_str())
            .is_some_and(|targets| targets.contains(edge.to.as_str()))
    }

    /// Iterate over every edge in the graph.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.outbound.iter().flat_map(|(from, targets)| {
            targets.iter().map(move |to| Edge {
                from: from.clone(),
                to: to.clone(),
            })
        })
    }

    /// Iterate over every node in the graph.
    pub fn nodes(&self) -> impl Iterator<Item = &N> + '_ {
        self.nodes.values()
    }

    /// Iterate over every node id in the graph.
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> + '_ {
        self.nodes.keys()
    }

    /// All nodes with an edge ending at `id`.
    pub fn nodes_connected_to(&self, id: &str) -> Vec<&N> {
        self.resolve(self.inbound.get(id))
    }

    /// All nodes with an edge starting from `id`.
    pub fn nodes_connected_from(&self, id: &str) -> Vec<&N> {
        self.resolve(self.outbound.get(id))
    }

    fn resolve(&self, ids: Option<&IndexSet<NodeId>>) -> Vec<&N> {
        ids.into_iter()
            .flatten()
            .filter_map(|id| self.nodes.get(id.as_str()))
            .collect()
    }

    /// Union `other` into this graph. Nodes from `other` win on conflict;
    /// the root of this graph is kept.
    pub fn merge(&mut self, other: Graph<N>) {
        let edges: Vec<Edge> = other.edges().collect();
        for node in other.nodes.into_values() {
            self.add_node(node);
        }
        for edge in edges {
            self.add_edge(edge);
        }
    }

    /// Linear scan for every node matching `predicate`.
    pub fn find_nodes<F>(&self, mut predicate: F) -> Vec<&N>
    where
        F: FnMut(&N) -> bool,
    {
        self.nodes.values().filter(|node| predicate(node)).collect()
    }

    /// True when no edge in the graph targets `id`.
    pub fn is_orphaned_node(&self, id: &str) -> bool {
        self.inbound.get(id).map_or(true, IndexSet::is_empty)
    }

    /// Get the total number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the total number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edge_count == 0
    }

    /// Drop a single edge from both adjacency maps, without any cascade.
    pub(super) fn unlink(&mut self, from: &str, to: &str) -> bool {
        let Some(targets) = self.outbound.get_mut(from) else {
            return false;
        };
        if !targets.swap_remove(to) {
            return false;
        }
        if targets.is_empty() {
            self.outbound.swap_remove(from);
        }

        if let Some(sources) = self.inbound.get_mut(to) {
            sources.swap_remove(from);
            if sources.is_empty() {
                self.inbound.swap_remove(to);
            }
        }
        self.edge_count -= 1;
        true
    }

    pub(super) fn successor_ids(&self, id: &str) -> Vec<NodeId> {
        self.outbound
            .get(id)
            .map(|targets| targets.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub(super) fn predecessor_ids(&self, id: &str) -> Vec<NodeId> {
        self.inbound
            .get(id)
            .map(|sources| sources.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;

    fn node(id: &str) -> Node<u32> {
        Node::new(id, 0)
    }

    #[test]
    fn add_and_get_nodes() {
        let mut graph = Graph::new();
        graph.add_node(node("a"));
        graph.add_node(Node::new("a", 7));

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.get_node("a").map(|n| n.value), Some(7));
        assert!(graph.get_node("missing").is_none());
    }

    #[test]
    fn edges_have_set_semantics() {
        let mut graph: Graph<Node<u32>> = Graph::new();
        assert!(graph.add_edge(Edge::new("a", "b")));
        assert!(!graph.add_edge(Edge::new("a", "b")));

        assert_eq!(graph.edge_count(), 1);
        assert!(graph.has_edge(&Edge::new("a", "b")));
        assert!(!graph.has_edge(&Edge::new("b", "a")));
    }

    #[test]
    fn update_node_requires_existing_id() {
        let mut graph = Graph::new();
        assert!(graph.update_node(Node::new("a", 1)).is_none());
        assert!(!graph.has_node("a"));

        graph.add_node(node("a"));
        graph.add_edge(Edge::new("a", "a"));
        let previous = graph.update_node(Node::new("a", 2));

        assert_eq!(previous.map(|n| n.value), Some(0));
        assert_eq!(graph.get_node("a").map(|n| n.value), Some(2));
        assert!(graph.has_edge(&Edge::new("a", "a")));
    }

    #[test]
    fn connected_lookups_follow_direction() {
        let mut graph = Graph::new();
        graph.set_root_node(node("root"));
        graph.add_node(node("a"));
        graph.add_node(node("b"));
        graph.add_edge(Edge::new("root", "a"));
        graph.add_edge(Edge::new("root", "b"));
        graph.add_edge(Edge::new("a", "b"));

        let from_root: Vec<_> = graph
            .nodes_connected_from("root")
            .into_iter()
            .map(|n| n.id.to_string())
            .collect();
        assert_eq!(from_root, vec!["a", "b"]);

        let to_b: Vec<_> = graph
            .nodes_connected_to("b")
            .into_iter()
            .map(|n| n.id.to_string())
            .collect();
        assert_eq!(to_b, vec!["root", "a"]);

        assert!(graph.is_orphaned_node("root"));
        assert!(!graph.is_orphaned_node("b"));
    }

    #[test]
    fn merge_overwrites_conflicting_nodes() {
        let mut left = Graph::new();
        left.set_root_node(node("root"));
        left.add_node(Node::new("shared", 1));
        left.add_edge(Edge::new("root", "shared"));

        let mut right = Graph::new();
        right.add_node(Node::new("shared", 2));
        right.add_node(node("extra"));
        right.add_edge(Edge::new("shared", "extra"));

        left.merge(right);

        assert_eq!(left.node_count(), 3);
        assert_eq!(left.edge_count(), 2);
        assert_eq!(left.get_node("shared").map(|n| n.value), Some(2));
        assert_eq!(left.root_id().map(NodeId::as_str), Some("root"));
    }

    #[test]
    fn find_nodes_scans_payloads() {
        let mut graph = Graph::new();
        for (id, value) in [("a", 1), ("b", 2), ("c", 3)] {
            graph.add_node(Node::new(id, value));
        }

        let odd = graph.find_nodes(|n| n.value % 2 == 1);
        assert_eq!(odd.len(), 2);
    }
}
