//! Graph Serialization
//!
//! A graph crosses process boundaries as a plain triple of nodes, edges and
//! an optional root id. The triple is encoded as MessagePack for caches and
//! as JSON for debugging output.
//!
//! Loading validates the triple: every edge must connect two nodes in the
//! triple, every node must be stored under its own id, and the root (if any)
//! must be one of the nodes. Iteration order is not preserved bit-for-bit.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::directed::Graph;
use super::node::{Edge, GraphNode, NodeId};
use crate::error::GraphError;

/// The wire form of a [`Graph`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedGraph<N> {
    pub nodes: Vec<(NodeId, N)>,
    pub edges: Vec<(NodeId, NodeId)>,
    #[serde(default)]
    pub root_node_id: Option<NodeId>,
}

impl<N: GraphNode + Clone> Graph<N> {
    /// Snapshot the graph into its wire form.
    pub fn to_serialized(&self) -> SerializedGraph<N> {
        SerializedGraph {
            nodes: self
                .nodes
                .iter()
                .map(|(id, node)| (id.clone(), node.clone()))
                .collect(),
            edges: self.edges().map(|edge| (edge.from, edge.to)).collect(),
            root_node_id: self.root.clone(),
        }
    }
}

impl<N: GraphNode> Graph<N> {
    /// Rebuild a graph from its wire form.
    pub fn from_serialized(serialized: SerializedGraph<N>) -> Result<Self, GraphError> {
        let mut graph = Graph::new();

        for (key, node) in serialized.nodes {
            if node.id() != &key {
                return Err(GraphError::IdMismatch {
                    key,
                    actual: node.id().clone(),
                });
            }
            graph.add_node(node);
        }

        for (from, to) in serialized.edges {
            if !graph.has_node(&from) || !graph.has_node(&to) {
                return Err(GraphError::DanglingEdge { from, to });
            }
            graph.add_edge(Edge { from, to });
        }

        if let Some(root) = serialized.root_node_id {
            if !graph.has_node(&root) {
                return Err(GraphError::MissingRoot(root));
            }
            graph.root = Some(root);
        }

        Ok(graph)
    }
}

impl<N: GraphNode + Clone + Serialize> Graph<N> {
    /// Encode the graph as MessagePack.
    pub fn to_msgpack(&self) -> Result<Vec<u8>, GraphError> {
        Ok(rmp_serde::to_vec_named(&self.to_serialized())?)
    }

    /// Encode the graph as JSON.
    pub fn to_json(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string(&self.to_serialized())?)
    }
}

impl<N: GraphNode + DeserializeOwned> Graph<N> {
    /// Decode a graph previously produced by [`Graph::to_msgpack`].
    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, GraphError> {
        let serialized: SerializedGraph<N> = rmp_serde::from_slice(bytes)?;
        Self::from_serialized(serialized)
    }

    /// Decode a graph previously produced by [`Graph::to_json`].
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        let serialized: SerializedGraph<N> = serde_json::from_str(json)?;
        Self::from_serialized(serialized)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::graph::Node;

    fn sample() -> Graph<Node<String>> {
        let mut graph = Graph::new();
        graph.set_root_node(Node::new("root", "entry".to_string()));
        graph.add_node(Node::new("a", "a.js".to_string()));
        graph.add_node(Node::new("b", "b.css".to_string()));
        graph.add_edge(Edge::new("root", "a"));
        graph.add_edge(Edge::new("a", "b"));
        graph.add_edge(Edge::new("root", "b"));
        graph
    }

    fn edge_set(graph: &Graph<Node<String>>) -> BTreeSet<Edge> {
        graph.edges().collect()
    }

    #[test]
    fn msgpack_round_trip_preserves_structure() {
        let graph = sample();
        let bytes = graph.to_msgpack().unwrap();
        let loaded: Graph<Node<String>> = Graph::from_msgpack(&bytes).unwrap();

        assert_eq!(edge_set(&loaded), edge_set(&graph));
        assert_eq!(loaded.root_id(), graph.root_id());
        assert_eq!(
            loaded.get_node("a").map(|n| n.value.as_str()),
            Some("a.js")
        );
    }

    #[test]
    fn json_uses_camel_case_triple() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["rootNodeId"], "root");
        assert_eq!(value["nodes"].as_array().map(Vec::len), Some(3));
        assert_eq!(value["edges"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn dangling_edges_are_rejected() {
        let serialized = SerializedGraph {
            nodes: vec![(NodeId::new("a"), Node::new("a", String::new()))],
            edges: vec![(NodeId::new("a"), NodeId::new("ghost"))],
            root_node_id: None,
        };

        let err = Graph::from_serialized(serialized).unwrap_err();
        assert!(matches!(err, GraphError::DanglingEdge { .. }));
    }

    #[test]
    fn mismatched_ids_are_rejected() {
        let serialized = SerializedGraph {
            nodes: vec![(NodeId::new("a"), Node::new("b", String::new()))],
            edges: vec![],
            root_node_id: None,
        };

        let err = Graph::from_serialized(serialized).unwrap_err();
        assert!(matches!(err, GraphError::IdMismatch { .. }));
    }

    #[test]
    fn missing_root_is_rejected() {
        let serialized: SerializedGraph<Node<String>> = SerializedGraph {
            nodes: vec![],
            edges: vec![],
            root_node_id: Some(NodeId::new("root")),
        };

        let err = Graph::from_serialized(serialized).unwrap_err();
        assert!(matches!(err, GraphError::MissingRoot(_)));
    }
}
