//! Invalidations and Invalidation Hashing
//!
//! An invalidation names one thing a build step's output depends on besides
//! its direct inputs: the contents of a file, or the value of an environment
//! variable. The invalidation hash folds the current state of all of them
//! into a single digest; when the digest changes, the cached output is stale.
//!
//! # Order Independence
//!
//! Invalidation lists are assembled from several unordered sources (watched
//! files, resolved configs), so the hasher sorts them by their raw key bytes
//! and drops duplicates before folding. Two lists describing the same set
//! always hash the same.
//!
//! Each entry is folded as its key followed by its state, both length
//! prefixed, so bytes moving across a boundary between two files change
//! the digest.
//!
//! # Concurrency
//!
//! File contents are read concurrently, but the fold itself always happens
//! in sorted order once every read has finished.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::fs::FileSystem;
use crate::error::IdentityError;

/// A single cache-validity dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Invalidation {
    /// The contents of a file.
    #[serde(rename_all = "camelCase")]
    File { file_path: PathBuf },

    /// The value of an environment variable.
    Env { key: String },
}

impl Invalidation {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File {
            file_path: path.into(),
        }
    }

    pub fn env(key: impl Into<String>) -> Self {
        Self::Env { key: key.into() }
    }

    /// The human readable id. Lossy for paths that are not valid unicode.
    pub fn id(&self) -> String {
        invalidation_id(self)
    }

    /// The exact key the hasher sorts and deduplicates by.
    fn key_bytes(&self) -> Vec<u8> {
        let (kind, name): (&[u8], &[u8]) = match self {
            Self::File { file_path } => (b"file:", file_path.as_os_str().as_encoded_bytes()),
            Self::Env { key } => (b"env:", key.as_bytes()),
        };
        [kind, name].concat()
    }
}

/// `"file:" + path` for files, `"env:" + key` for environment variables.
pub fn invalidation_id(invalidation: &Invalidation) -> String {
    match invalidation {
        Invalidation::File { file_path } => format!("file:{}", file_path.to_string_lossy()),
        Invalidation::Env { key } => format!("env:{key}"),
    }
}

impl fmt::Display for Invalidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&invalidation_id(self))
    }
}

impl FromStr for Invalidation {
    type Err = IdentityError;

    /// Parse the id form produced by [`invalidation_id`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some(("file", path)) if !path.is_empty() => Ok(Self::file(path)),
            Some(("env", key)) if !key.is_empty() => Ok(Self::env(key)),
            _ => Err(IdentityError::UnknownInvalidationKind(s.to_string())),
        }
    }
}

/// Where environment variable values come from.
#[derive(Debug, Clone, Default)]
pub enum EnvSource {
    /// The current process environment.
    #[default]
    Process,

    /// A fixed snapshot, e.g. the environment captured for a build.
    Fixed(BTreeMap<String, OsString>),
}

impl EnvSource {
    /// Look up a variable. Values need not be valid unicode.
    pub fn get(&self, key: &str) -> Option<OsString> {
        match self {
            Self::Process => std::env::var_os(key),
            Self::Fixed(vars) => vars.get(key).cloned(),
        }
    }
}

/// Computes invalidation hashes against a filesystem and an environment.
#[derive(Debug, Clone)]
pub struct InvalidationHasher<F> {
    fs: F,
    env: EnvSource,
}

impl<F: FileSystem> InvalidationHasher<F> {
    /// Create a hasher reading the process environment.
    pub fn new(fs: F) -> Self {
        Self {
            fs,
            env: EnvSource::Process,
        }
    }

    pub fn with_env(mut self, env: EnvSource) -> Self {
        self.env = env;
        self
    }

    /// Hash the current state of every invalidation, independent of order.
    ///
    /// Returns a lowercase hex BLAKE3 digest. A file that cannot be read
    /// fails the whole hash.
    #[instrument(skip_all, fields(count = invalidations.len()))]
    pub async fn invalidation_hash(
        &self,
        invalidations: &[Invalidation],
    ) -> Result<String, IdentityError> {
        let mut sorted: Vec<(Vec<u8>, &Invalidation)> = invalidations
            .iter()
            .map(|invalidation| (invalidation.key_bytes(), invalidation))
            .collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));
        sorted.dedup_by(|a, b| a.0 == b.0);

        // try_join_all yields results in input order, whatever order the reads finish in.
        let contributions =
            try_join_all(sorted.iter().map(|(_, invalidation)| self.contribution(invalidation)))
                .await?;

        let mut hasher = blake3::Hasher::new();
        for ((key, _), state) in sorted.iter().zip(&contributions) {
            hasher.update(&(key.len() as u64).to_le_bytes());
            hasher.update(key);
            hasher.update(&(state.len() as u64).to_le_bytes());
            hasher.update(state);
        }
        Ok(hasher.finalize().to_hex().to_string())
    }

    async fn contribution(&self, invalidation: &Invalidation) -> Result<Vec<u8>, IdentityError> {
        match invalidation {
            Invalidation::File { file_path } => {
                self.fs
                    .read_file(file_path)
                    .await
                    .map_err(|source| IdentityError::Io {
                        path: file_path.clone(),
                        source,
                    })
            }
            Invalidation::Env { key } => {
                let mut bytes = format!("{key}:").into_bytes();
                if let Some(value) = self.env.get(key) {
                    bytes.extend_from_slice(value.as_encoded_bytes());
                }
                Ok(bytes)
            }
        }
    }
}
