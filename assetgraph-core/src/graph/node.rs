//! Graph Nodes
//!
//! This module defines the identifiers, edges and payload trait that the
//! graph is generic over.

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Stable identifier for a node in a graph.
///
/// Backed by a shared string so that cloning an id (which the adjacency maps
/// do constantly) never copies the underlying bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Arc<str>);

impl NodeId {
    /// Create an id from any string-like value.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl From<&NodeId> for NodeId {
    fn from(id: &NodeId) -> Self {
        id.clone()
    }
}

impl Deref for NodeId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A directed edge between two node ids.
///
/// Edges form a set inside a graph: inserting the same `(from, to)` pair
/// twice has no effect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
}

impl Edge {
    /// Create an edge from `from` to `to`.
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// A payload that can live in a [`Graph`](super::Graph).
///
/// The graph never inspects a payload beyond its id.
pub trait GraphNode {
    /// The stable identifier the graph keys this payload by.
    fn id(&self) -> &NodeId;
}

/// A generic node: an id paired with an arbitrary value.
///
/// Useful when the payload type does not carry its own identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node<T> {
    pub id: NodeId,
    pub value: T,
}

impl<T> Node<T> {
    /// Create a new node.
    pub fn new(id: impl Into<NodeId>, value: T) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }
}

impl<T> GraphNode for Node<T> {
    fn id(&self) -> &NodeId {
        &self.id
    }
}
