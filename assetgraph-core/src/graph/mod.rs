//! Dependency Graph
//!
//! This module implements the generic directed graph that every bundling
//! phase builds on: assets, their dependencies and the edges between them.
//!
//! # Overview
//!
//! - Nodes are arbitrary payloads implementing [`GraphNode`], keyed by a
//!   stable [`NodeId`].
//! - Edges are `(from, to)` pairs with set semantics.
//! - An optional root node is the default entry point for traversal.
//!
//! # Incremental Updates
//!
//! Mutations that remove structure return exactly what they removed, and
//! [`Graph::replace_nodes_connected_to`] returns both what it added and what
//! it removed. Consumers use these deltas to invalidate caches for changed
//! assets instead of rebuilding everything downstream.
//!
//! # Design Decisions
//!
//! 1. Nodes are stored by id in a single arena. Callers never hold a mutable
//!    reference into it; they replace payloads with [`Graph::update_node`]
//!    and re-fetch by id to observe the change.
//!
//! 2. We maintain both forward and reverse adjacency so that predecessor
//!    lookups and the orphan check do not scan the whole edge set.
//!
//! 3. Edges may transiently reference a node that has not been added yet.
//!    Every removal cleans up all edges touching the removed node, so no
//!    public operation leaves a dangling edge behind.

mod diff;
mod directed;
mod node;
mod serialize;
mod shared;
mod traverse;

pub use diff::{GraphDelta, Subgraph};
pub use directed::Graph;
pub use node::{Edge, GraphNode, Node, NodeId};
pub use serialize::SerializedGraph;
pub use shared::SharedGraph;
pub use traverse::TraversalActions;
