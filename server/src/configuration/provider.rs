//! The authoritative source of the current configuration record.
//!
//! # Pre-conditions
//! - The resource store outlives the provider (it is shared through `Arc`).
//!
//! # Post-conditions
//! - `get_instance` always returns a record, even when `config.json` is absent
//!   or unparsable.
//! - After `load` returns, every later `get_instance` sees the record it built
//!   (or a newer one).
//!
//! # Invariants
//! - At most one record is current. Publishing a record is a single atomic swap;
//!   records are never mutated in place.
//! - Readers holding an older record keep a complete, consistent snapshot.

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwapOption;

use crate::configuration::{Configuration, Settings};
use crate::resource::{ResourceError, ResourceStore};

/// Logical name of the configuration document.
pub const CONFIGURATION_RESOURCE: &str = "config.json";

/// Why the configuration document could not be used.
///
/// Never returned from the provider: it is logged and replaced by defaults.
#[derive(Debug)]
pub enum ConfigDecodeFailure {
    /// The document could not be fetched.
    Read(ResourceError),
    /// The document is not valid configuration JSON.
    Decode(serde_json::Error),
}

impl std::fmt::Display for ConfigDecodeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read(e) => write!(f, "read error: {e}"),
            Self::Decode(e) => write!(f, "decode error: {e}"),
        }
    }
}

impl std::error::Error for ConfigDecodeFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read(e) => Some(e),
            Self::Decode(e) => Some(e),
        }
    }
}

/// Fetch and decode the configuration document from `store`.
///
/// # Errors
/// Returns `ConfigDecodeFailure` if the document is missing, unreadable or malformed.
pub fn read_settings(store: &dyn ResourceStore) -> Result<Settings, ConfigDecodeFailure> {
    let bytes = store
        .fetch(CONFIGURATION_RESOURCE)
        .map_err(ConfigDecodeFailure::Read)?;
    Settings::from_json(&bytes).map_err(ConfigDecodeFailure::Decode)
}

/// Holds the current configuration record.
///
/// Shared across request handlers through `Arc<ConfigurationProvider>`.
///
/// # Thread Safety
///
/// Reads are lock-free. Loads are serialized by `load_lock`, so concurrent
/// first callers of `get_instance` share a single load and records are
/// published in the order they were built.
pub struct ConfigurationProvider {
    store: Arc<dyn ResourceStore>,
    current: ArcSwapOption<Configuration>,
    load_lock: Mutex<()>,
}

impl ConfigurationProvider {
    /// Create a provider reading from `store`. Nothing is loaded until first use.
    #[must_use]
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self {
            store,
            current: ArcSwapOption::empty(),
            load_lock: Mutex::new(()),
        }
    }

    /// The current record, loading it on first use.
    pub fn get_instance(&self) -> Arc<Configuration> {
        if let Some(configuration) = self.current.load_full() {
            return configuration;
        }

        let _guard = self.load_lock.lock().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have finished loading while we waited.
        if let Some(configuration) = self.current.load_full() {
            return configuration;
        }

        self.load_locked()
    }

    /// Reload `config.json` and publish a fresh record.
    ///
    /// Falls back to an all-defaults record (with a warning) if the document
    /// cannot be read or decoded. Key caches start empty in the new record.
    pub fn load(&self) -> Arc<Configuration> {
        let _guard = self.load_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load_locked()
    }

    #[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected for shared state
    fn load_locked(&self) -> Arc<Configuration> {
        let settings = read_settings(self.store.as_ref()).unwrap_or_else(|e| {
            tracing::warn!(
                resource = CONFIGURATION_RESOURCE,
                "Could not load configuration file, using default values (may not work!): {e}"
            );
            Settings::default()
        });

        let configuration = Arc::new(Configuration::new(settings, Arc::clone(&self.store)));
        self.current.store(Some(Arc::clone(&configuration)));

        tracing::info!(
            server_name = configuration.settings().server_name(),
            https_enabled = configuration.settings().is_https_enabled(),
            "Loaded configuration"
        );

        configuration
    }
}
