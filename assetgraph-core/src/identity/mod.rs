//! Identity Model
//!
//! Deterministic identifiers and invalidation fingerprints. Nothing in here
//! knows about graph structure; the graph only ever sees the ids this module
//! produces.
//!
//! # Concepts
//!
//! ## Asset ids
//!
//! An asset id is a digest of the inputs that distinguish one compiled unit
//! from another. It is the backbone of every cache key.
//!
//! ## Invalidation hashes
//!
//! A build step also depends on things outside its inputs (config files,
//! environment variables). The invalidation hash captures their current
//! state so a cached result can be compared against it.

mod asset_id;
mod fs;
mod invalidation;

pub use asset_id::{compute_asset_id, compute_dependency_id, AssetIdInput, ID_HEX_LEN};
pub(crate) use asset_id::digest_fields;
pub use fs::{FileSystem, MemoryFileSystem, TokioFileSystem};
pub use invalidation::{invalidation_id, EnvSource, Invalidation, InvalidationHasher};
