//! Common helpers for end-to-end tests.

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use crate::configuration::{CONFIGURATION_RESOURCE, ConfigurationProvider};
use crate::resource::DirectoryStore;
use crate::testing::{API_SERVER_PUBLIC_KEY_DER, SIGNING_PRIVATE_KEY_DER, SIGNING_PUBLIC_KEY_DER};

/// A resource directory on disk with a provider reading from it.
///
/// The directory is removed when the fixture is dropped.
pub struct ResourceDirectory {
    dir: TempDir,
    pub provider: ConfigurationProvider,
}

impl ResourceDirectory {
    /// An empty resource directory.
    #[must_use]
    pub fn empty() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create resource directory");
        let provider = ConfigurationProvider::new(Arc::new(DirectoryStore::new(dir.path())));
        Self { dir, provider }
    }

    /// A resource directory holding the fixture keys under their default names.
    #[must_use]
    pub fn with_keys() -> Self {
        let resources = Self::empty();
        resources.write("sk.der", SIGNING_PRIVATE_KEY_DER);
        resources.write("pk.der", SIGNING_PUBLIC_KEY_DER);
        resources.write("apiserver.der", API_SERVER_PUBLIC_KEY_DER);
        resources
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write (or overwrite) a resource file, creating parent directories.
    pub fn write(&self, name: &str, bytes: &[u8]) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create resource subdirectory");
        }
        std::fs::write(path, bytes).expect("Failed to write resource");
    }

    pub fn write_config(&self, json: &str) {
        self.write(CONFIGURATION_RESOURCE, json.as_bytes());
    }
}
