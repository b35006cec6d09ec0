//! Named byte resources.
//!
//! A `ResourceStore` resolves a logical resource name (such as `config.json`
//! or `sk.der`) to the complete contents of that resource.
//!
//! # Post-conditions
//! - `fetch` returns either the complete contents or an error, never a prefix.
//!
//! # Invariants
//! - Stores are read-only and perform no caching of their own.
//! - A logical name never resolves outside the store's root.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Error returned when a resource cannot be fetched.
#[derive(Debug)]
pub enum ResourceError {
    /// No resource with this name exists.
    NotFound(String),
    /// The resource was located but reading it failed.
    Io {
        /// The logical name of the resource.
        name: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl ResourceError {
    /// The logical name of the resource that failed.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::NotFound(name) | Self::Io { name, .. } => name,
        }
    }
}

impl std::fmt::Display for ResourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(name) => write!(f, "could not find resource {name}"),
            Self::Io { name, source } => write!(f, "could not read resource {name}: {source}"),
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io { source, .. } => Some(source),
        }
    }
}

/// A read-only source of named byte resources.
pub trait ResourceStore: Send + Sync {
    /// Fetch the complete contents of the resource called `name`.
    ///
    /// # Errors
    /// Returns `ResourceError::NotFound` if no such resource exists, or
    /// `ResourceError::Io` if it exists but could not be read.
    fn fetch(&self, name: &str) -> Result<Vec<u8>, ResourceError>;
}

/// Resources stored as files under a root directory.
///
/// `config.json` resolves to `{root}/config.json`. Names that are absolute or
/// contain `..` are treated as not found.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Create a store rooted at `root`. The directory does not need to exist yet.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory resources are resolved against.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        let is_plain = !name.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        is_plain.then(|| self.root.join(relative))
    }
}

impl ResourceStore for DirectoryStore {
    fn fetch(&self, name: &str) -> Result<Vec<u8>, ResourceError> {
        let Some(path) = self.resolve(name) else {
            return Err(ResourceError::NotFound(name.to_string()));
        };

        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ResourceError::NotFound(name.to_string()))
            }
            Err(e) => Err(ResourceError::Io {
                name: name.to_string(),
                source: e,
            }),
        }
    }
}

/// Resources held in memory, for embedded assets and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    resources: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource, returning the store for chaining.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(name, bytes);
        self
    }

    /// Add or replace a resource.
    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.resources.insert(name.into(), bytes.into());
    }
}

impl ResourceStore for MemoryStore {
    fn fetch(&self, name: &str) -> Result<Vec<u8>, ResourceError> {
        self.resources
            .get(name)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(name.to_string()))
    }
}
