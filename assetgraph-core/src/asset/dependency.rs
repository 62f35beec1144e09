//! Dependency records carried by assets.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::environment::Environment;
use crate::error::AssetError;
use crate::identity::compute_dependency_id;

/// A line/column position in a source file. Lines are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

/// A span in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub file_path: PathBuf,
    pub start: Position,
    pub end: Position,
}

/// Everything needed to build a [`Dependency`]. Omitted fields take their
/// defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DependencyOptions {
    pub specifier: String,
    pub source_asset_id: Option<String>,
    pub source_path: Option<PathBuf>,
    pub env: Environment,
    pub pipeline: Option<String>,
    pub is_async: bool,
    pub is_entry: bool,
    pub is_optional: bool,
    pub is_url: bool,
    pub loc: Option<SourceLocation>,
    /// Imported name to local name.
    pub symbols: IndexMap<String, String>,
    pub meta: Map<String, Value>,
}

/// A reference from one asset to a module it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    id: String,
    specifier: String,
    source_asset_id: Option<String>,
    source_path: Option<PathBuf>,
    env: Environment,
    pipeline: Option<String>,
    is_async: bool,
    is_entry: bool,
    is_optional: bool,
    is_url: bool,
    loc: Option<SourceLocation>,
    symbols: IndexMap<String, String>,
    meta: Map<String, Value>,
}

impl Dependency {
    pub fn new(options: DependencyOptions) -> Result<Self, AssetError> {
        if options.specifier.is_empty() {
            return Err(AssetError::EmptyField("specifier"));
        }

        let id = compute_dependency_id(
            options.source_asset_id.as_deref(),
            &options.specifier,
            &options.env.hash(),
            options.pipeline.as_deref(),
        );

        Ok(Self {
            id,
            specifier: options.specifier,
            source_asset_id: options.source_asset_id,
            source_path: options.source_path,
            env: options.env,
            pipeline: options.pipeline,
            is_async: options.is_async,
            is_entry: options.is_entry,
            is_optional: options.is_optional,
            is_url: options.is_url,
            loc: options.loc,
            symbols: options.symbols,
            meta: options.meta,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn specifier(&self) -> &str {
        &self.specifier
    }

    pub fn source_asset_id(&self) -> Option<&str> {
        self.source_asset_id.as_deref()
    }

    pub fn source_path(&self) -> Option<&PathBuf> {
        self.source_path.as_ref()
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn pipeline(&self) -> Option<&str> {
        self.pipeline.as_deref()
    }

    pub fn is_async(&self) -> bool {
        self.is_async
    }

    pub fn is_entry(&self) -> bool {
        self.is_entry
    }

    pub fn is_optional(&self) -> bool {
        self.is_optional
    }

    pub fn is_url(&self) -> bool {
        self.is_url
    }

    pub fn loc(&self) -> Option<&SourceLocation> {
        self.loc.as_ref()
    }

    pub fn symbols(&self) -> &IndexMap<String, String> {
        &self.symbols
    }

    /// Record that `imported` is bound to `local` in the importing asset.
    pub fn add_symbol(&mut self, imported: impl Into<String>, local: impl Into<String>) {
        self.symbols.insert(imported.into(), local.into());
    }

    pub fn meta(&self) -> &Map<String, Value> {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.meta
    }
}
