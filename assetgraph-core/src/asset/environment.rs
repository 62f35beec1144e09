//! Target environments.
//!
//! The environment an asset is compiled for is part of its identity: the
//! same file built for a browser and for node yields two distinct assets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::identity::digest_fields;

/// The platform an asset runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnvironmentContext {
    #[default]
    Browser,
    WebWorker,
    ServiceWorker,
    Node,
    ElectronMain,
    ElectronRenderer,
}

impl EnvironmentContext {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::WebWorker => "web-worker",
            Self::ServiceWorker => "service-worker",
            Self::Node => "node",
            Self::ElectronMain => "electron-main",
            Self::ElectronRenderer => "electron-renderer",
        }
    }
}

/// The module format generated code is emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Global,
    Commonjs,
    Esmodule,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Commonjs => "commonjs",
            Self::Esmodule => "esmodule",
        }
    }
}

/// The target an asset is compiled for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Environment {
    pub context: EnvironmentContext,

    /// Engine name to semver range, e.g. `"node" => ">= 18"`.
    pub engines: BTreeMap<String, String>,

    pub include_node_modules: bool,
    pub output_format: OutputFormat,
    pub is_library: bool,
    pub should_optimize: bool,
    pub source_map: bool,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            context: EnvironmentContext::Browser,
            engines: BTreeMap::new(),
            include_node_modules: true,
            output_format: OutputFormat::Global,
            is_library: false,
            should_optimize: false,
            source_map: true,
        }
    }
}

impl Environment {
    /// A default environment for the given context.
    pub fn for_context(context: EnvironmentContext) -> Self {
        Self {
            context,
            ..Self::default()
        }
    }

    pub fn is_node(&self) -> bool {
        matches!(
            self.context,
            EnvironmentContext::Node | EnvironmentContext::ElectronMain
        )
    }

    /// Digest of every field. Engines are hashed in key order.
    pub fn hash(&self) -> String {
        let engines = self
            .engines
            .iter()
            .map(|(name, range)| format!("{name}={range}"))
            .collect::<Vec<_>>()
            .join(",");
        let flags = [
            self.include_node_modules,
            self.is_library,
            self.should_optimize,
            self.source_map,
        ]
        .map(|flag| if flag { "1" } else { "0" })
        .concat();

        digest_fields(&[
            self.context.as_str().as_bytes(),
            engines.as_bytes(),
            self.output_format.as_str().as_bytes(),
            flags.as_bytes(),
        ])
    }
}
