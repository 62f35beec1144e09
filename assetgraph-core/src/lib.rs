//! Asset Graph Core
//!
//! This crate provides the dependency graph engine at the heart of an
//! incremental asset bundler. It implements:
//!
//! - A generic directed graph with cascading, orphan-pruning removal
//! - Incremental successor replacement that reports the minimal delta
//! - Content-derived asset ids and order-independent invalidation hashes
//! - The asset record stored as the graph's node payload
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `graph`: Generic graph storage, diffing, traversal and serialization
//! - `identity`: Asset ids, invalidations and invalidation hashing
//! - `asset`: Asset records, dependencies and target environments
//! - `cache`: The key/blob store interface generated output lives in
//!
//! # Example
//!
//! ```rust
//! use assetgraph_core::asset::{AssetGraph, AssetOptions, AssetRecord};
//! use assetgraph_core::graph::GraphNode;
//!
//! let entry = AssetRecord::new(AssetOptions::new("src/index.js", "js", true)).unwrap();
//! let app = AssetRecord::new(AssetOptions::new("src/app.js", "js", true)).unwrap();
//! let util = AssetRecord::new(AssetOptions::new("src/util.js", "js", true)).unwrap();
//!
//! let mut graph = AssetGraph::new();
//! let entry_id = graph.set_root_node(entry).id().clone();
//!
//! // First resolution of the entry's imports.
//! let delta = graph.replace_nodes_connected_to(&entry_id, vec![app.clone(), util.clone()]);
//! assert_eq!(delta.added.node_count(), 2);
//!
//! // The entry stopped importing util: only util is removed.
//! let delta = graph.replace_nodes_connected_to(&entry_id, vec![app]);
//! assert!(delta.removed.contains_node(util.id()));
//! assert_eq!(graph.node_count(), 2);
//! ```

pub mod asset;
pub mod cache;
pub mod error;
pub mod graph;
pub mod identity;

pub use error::{AssetError, CacheError, GraphError, IdentityError};
