//! Assets
//!
//! The bundler-specific payload of the graph. An [`AssetRecord`] is what a
//! transformer produces for one file in one environment; the graph stores
//! records as nodes and their dependencies as edges.

mod dependency;
mod environment;
mod graph;
mod record;

pub use dependency::{Dependency, DependencyOptions, Position, SourceLocation};
pub use environment::{Environment, EnvironmentContext, OutputFormat};
pub use graph::{assets_invalidated_by, verify_identities, AssetGraph};
pub use record::{AssetOptions, AssetRecord, SymbolBinding};
