//! Error types shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

use crate::graph::NodeId;

/// Errors raised while loading or encoding a graph.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("edge {from} -> {to} references a node that is not in the graph")]
    DanglingEdge { from: NodeId, to: NodeId },

    #[error("node stored under {key} reports id {actual}")]
    IdMismatch { key: NodeId, actual: NodeId },

    #[error("root node {0} is not in the graph")]
    MissingRoot(NodeId),

    #[error("failed to encode graph: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("failed to decode graph: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("invalid graph JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while computing identities and invalidation hashes.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("unknown invalidation kind: {0:?}")]
    UnknownInvalidationKind(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while constructing or checking asset records.
#[derive(Debug, Error, PartialEq)]
pub enum AssetError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),

    #[error("asset id {stored} is stale, inputs hash to {expected}")]
    StaleIdentity { stored: String, expected: String },
}

/// Errors raised by cache store implementations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache entry not found: {0}")]
    NotFound(String),

    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),
}
