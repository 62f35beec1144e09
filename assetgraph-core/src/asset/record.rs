//! Asset Records
//!
//! An [`AssetRecord`] describes one compiled unit: a file (or virtual
//! source), the query it was requested with, the pipeline that processes it
//! and the environment it targets. It is the node payload of the asset
//! graph.
//!
//! # Identity
//!
//! The record's id is derived from its identity inputs (id base, type,
//! environment, unique key, pipeline). Those inputs are private and every
//! setter that touches one recomputes the id, so a record built through this
//! API can never carry a stale id. Records that arrive through
//! deserialization are not recomputed; [`AssetRecord::verify_id`] checks
//! them.
//!
//! Changing an identity input of a record that lives in a graph changes the
//! key it should be stored under. Move it with
//! [`Graph::replace_node`](crate::graph::Graph::replace_node).

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::dependency::{Dependency, SourceLocation};
use super::environment::Environment;
use crate::error::AssetError;
use crate::graph::{GraphNode, NodeId};
use crate::identity::{compute_asset_id, AssetIdInput, Invalidation};

/// The local binding and location of an exported symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolBinding {
    pub local: String,
    pub loc: Option<SourceLocation>,
}

/// Every field an asset can be constructed with, and its default.
///
/// | field          | default        |
/// |----------------|----------------|
/// | `id_base`      | the file path  |
/// | `query`        | empty          |
/// | `env`          | [`Environment::default`] |
/// | `pipeline`     | none           |
/// | `unique_key`   | none           |
/// | `is_source`    | required       |
/// | `is_isolated`  | `false`        |
/// | `is_inline`    | `false`        |
/// | `is_splittable`| unset          |
/// | `side_effects` | `true`         |
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetOptions {
    pub id_base: Option<String>,
    pub file_path: PathBuf,
    pub query: IndexMap<String, String>,
    #[serde(rename = "type")]
    pub asset_type: String,
    pub env: Environment,
    pub pipeline: Option<String>,
    pub unique_key: Option<String>,
    pub is_source: Option<bool>,
    pub is_isolated: bool,
    pub is_inline: bool,
    pub is_splittable: Option<bool>,
    pub side_effects: bool,
    pub dependencies: Vec<Dependency>,
    pub symbols: Option<IndexMap<String, SymbolBinding>>,
    pub invalidations: Vec<Invalidation>,
    pub content_key: Option<String>,
    pub map_key: Option<String>,
    pub ast_key: Option<String>,
    pub meta: Map<String, Value>,
}

impl Default for AssetOptions {
    fn default() -> Self {
        Self {
            id_base: None,
            file_path: PathBuf::new(),
            query: IndexMap::new(),
            asset_type: String::new(),
            env: Environment::default(),
            pipeline: None,
            unique_key: None,
            is_source: None,
            is_isolated: false,
            is_inline: false,
            is_splittable: None,
            side_effects: true,
            dependencies: Vec::new(),
            symbols: None,
            invalidations: Vec::new(),
            content_key: None,
            map_key: None,
            ast_key: None,
            meta: Map::new(),
        }
    }
}

impl AssetOptions {
    /// Options for a file of the given type, with every other field defaulted.
    pub fn new(file_path: impl Into<PathBuf>, asset_type: impl Into<String>, is_source: bool) -> Self {
        Self {
            file_path: file_path.into(),
            asset_type: asset_type.into(),
            is_source: Some(is_source),
            ..Self::default()
        }
    }
}

/// A content-addressed description of a single compiled unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    id: NodeId,
    id_base: Option<String>,
    file_path: PathBuf,
    query: IndexMap<String, String>,
    #[serde(rename = "type")]
    asset_type: String,
    env: Environment,
    pipeline: Option<String>,
    unique_key: Option<String>,
    is_source: bool,
    is_isolated: bool,
    is_inline: bool,
    is_splittable: Option<bool>,
    side_effects: bool,
    dependencies: IndexMap<String, Dependency>,
    symbols: Option<IndexMap<String, SymbolBinding>>,
    invalidations: Vec<Invalidation>,
    content_key: Option<String>,
    map_key: Option<String>,
    ast_key: Option<String>,
    meta: Map<String, Value>,
}

impl AssetRecord {
    /// Validate `options` and build the record, computing its id.
    pub fn new(options: AssetOptions) -> Result<Self, AssetError> {
        let is_source = options.is_source.ok_or(AssetError::MissingField("isSource"))?;
        if options.file_path.as_os_str().is_empty() {
            return Err(AssetError::EmptyField("filePath"));
        }
        if options.asset_type.is_empty() {
            return Err(AssetError::EmptyField("type"));
        }
        if options.id_base.as_deref() == Some("") {
            return Err(AssetError::EmptyField("idBase"));
        }

        let dependencies = options
            .dependencies
            .into_iter()
            .map(|dep| (dep.id().to_string(), dep))
            .collect();

        let mut record = Self {
            id: NodeId::new(""),
            id_base: options.id_base,
            file_path: options.file_path,
            query: options.query,
            asset_type: options.asset_type,
            env: options.env,
            pipeline: options.pipeline,
            unique_key: options.unique_key,
            is_source,
            is_isolated: options.is_isolated,
            is_inline: options.is_inline,
            is_splittable: options.is_splittable,
            side_effects: options.side_effects,
            dependencies,
            symbols: options.symbols,
            invalidations: options.invalidations,
            content_key: options.content_key,
            map_key: options.map_key,
            ast_key: options.ast_key,
            meta: options.meta,
        };
        record.refresh_id();
        Ok(record)
    }

    /// Hash the current identity inputs.
    pub fn compute_id(&self) -> String {
        compute_asset_id(&AssetIdInput {
            id_base: self.id_base(),
            asset_type: &self.asset_type,
            environment_hash: &self.env.hash(),
            unique_key: self.unique_key.as_deref(),
            pipeline: self.pipeline.as_deref(),
        })
    }

    /// Check that the stored id still matches the identity inputs.
    pub fn verify_id(&self) -> Result<(), AssetError> {
        let expected = self.compute_id();
        if self.id.as_str() == expected {
            Ok(())
        } else {
            Err(AssetError::StaleIdentity {
                stored: self.id.to_string(),
                expected,
            })
        }
    }

    fn refresh_id(&mut self) {
        self.id = NodeId::from(self.compute_id());
    }

    /// The explicit id base, or the file path when none was given.
    pub fn id_base(&self) -> &OsStr {
        match &self.id_base {
            Some(base) => OsStr::new(base),
            None => self.file_path.as_os_str(),
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn query(&self) -> &IndexMap<String, String> {
        &self.query
    }

    /// Replace the query. The query is not an identity input.
    pub fn set_query(&mut self, query: IndexMap<String, String>) {
        self.query = query;
    }

    pub fn asset_type(&self) -> &str {
        &self.asset_type
    }

    /// Change the type (e.g. after a transformer converts ts to js).
    pub fn set_asset_type(&mut self, asset_type: impl Into<String>) {
        self.asset_type = asset_type.into();
        self.refresh_id();
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn set_env(&mut self, env: Environment) {
        self.env = env;
        self.refresh_id();
    }

    pub fn pipeline(&self) -> Option<&str> {
        self.pipeline.as_deref()
    }

    pub fn set_pipeline(&mut self, pipeline: Option<String>) {
        self.pipeline = pipeline;
        self.refresh_id();
    }

    pub fn unique_key(&self) -> Option<&str> {
        self.unique_key.as_deref()
    }

    pub fn set_unique_key(&mut self, unique_key: Option<String>) {
        self.unique_key = unique_key;
        self.refresh_id();
    }

    pub fn is_source(&self) -> bool {
        self.is_source
    }

    pub fn is_isolated(&self) -> bool {
        self.is_isolated
    }

    pub fn is_inline(&self) -> bool {
        self.is_inline
    }

    pub fn is_splittable(&self) -> Option<bool> {
        self.is_splittable
    }

    pub fn side_effects(&self) -> bool {
        self.side_effects
    }

    pub fn set_side_effects(&mut self, side_effects: bool) {
        self.side_effects = side_effects;
    }

    pub fn dependencies(&self) -> impl Iterator<Item = &Dependency> + '_ {
        self.dependencies.values()
    }

    pub fn dependency(&self, id: &str) -> Option<&Dependency> {
        self.dependencies.get(id)
    }

    /// Add a dependency, replacing any existing one with the same id.
    pub fn add_dependency(&mut self, dependency: Dependency) -> &Dependency {
        let id = dependency.id().to_string();
        self.dependencies.insert(id.clone(), dependency);
        &self.dependencies[&id]
    }

    pub fn symbols(&self) -> Option<&IndexMap<String, SymbolBinding>> {
        self.symbols.as_ref()
    }

    pub fn set_symbols(&mut self, symbols: Option<IndexMap<String, SymbolBinding>>) {
        self.symbols = symbols;
    }

    pub fn invalidations(&self) -> &[Invalidation] {
        &self.invalidations
    }

    /// Record an extra file or env var this asset's output depends on.
    pub fn add_invalidation(&mut self, invalidation: Invalidation) {
        if !self.invalidations.contains(&invalidation) {
            self.invalidations.push(invalidation);
        }
    }

    pub fn content_key(&self) -> Option<&str> {
        self.content_key.as_deref()
    }

    pub fn set_content_key(&mut self, key: Option<String>) {
        self.content_key = key;
    }

    pub fn map_key(&self) -> Option<&str> {
        self.map_key.as_deref()
    }

    pub fn set_map_key(&mut self, key: Option<String>) {
        self.map_key = key;
    }

    pub fn ast_key(&self) -> Option<&str> {
        self.ast_key.as_deref()
    }

    pub fn set_ast_key(&mut self, key: Option<String>) {
        self.ast_key = key;
    }

    /// Every cache-store key this record carries.
    pub fn cache_keys(&self) -> impl Iterator<Item = &str> + '_ {
        [&self.content_key, &self.map_key, &self.ast_key]
            .into_iter()
            .filter_map(|key| key.as_deref())
    }

    pub fn meta(&self) -> &Map<String, Value> {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.meta
    }
}

impl GraphNode for AssetRecord {
    fn id(&self) -> &NodeId {
        &self.id
    }
}
