//! A configuration snapshot with its lazily parsed signing keys.
//!
//! # Post-conditions
//! - A signing key accessor that succeeded once returns the same key on every
//!   later call without touching the resource store.
//!
//! # Invariants
//! - `Settings` never change after construction.
//! - Each key cell goes from empty to filled at most once and never back.
//! - Failed key resolution leaves the cell empty.

use std::sync::{Arc, OnceLock};

use jsonwebtoken::Algorithm;

use crate::configuration::Settings;
use crate::keys::{KeyMaterialError, PrivateKey, PublicKey};
use crate::resource::ResourceStore;

/// Algorithm used for every token the keyshare server signs or verifies.
pub const JWT_ALGORITHM: Algorithm = Algorithm::RS256;

/// An immutable configuration record.
///
/// Owns the signing key cells. Key bytes are read from the same store the
/// configuration document came from.
pub struct Configuration {
    settings: Settings,
    store: Arc<dyn ResourceStore>,
    signing_private_key: OnceLock<PrivateKey>,
    signing_public_key: OnceLock<PublicKey>,
}

impl Configuration {
    #[must_use]
    pub fn new(settings: Settings, store: Arc<dyn ResourceStore>) -> Self {
        Self {
            settings,
            store,
            signing_private_key: OnceLock::new(),
            signing_public_key: OnceLock::new(),
        }
    }

    /// The plain configuration values.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The fixed token signing algorithm.
    #[must_use]
    pub const fn jwt_algorithm(&self) -> Algorithm {
        JWT_ALGORITHM
    }

    /// The token signing key, parsed on first use and cached.
    ///
    /// # Errors
    /// Returns `KeyMaterialError` if the key file is missing, unreadable or not
    /// a PKCS#8 RSA key. Nothing is cached on failure.
    pub fn signing_private_key(&self) -> Result<&PrivateKey, KeyMaterialError> {
        cached(
            &self.signing_private_key,
            self.settings.jwt_private_key_name(),
            |name| {
                let bytes = self.store.fetch(name)?;
                PrivateKey::from_pkcs8_der(&bytes)
                    .map_err(|e| KeyMaterialError::malformed(name, e))
            },
        )
    }

    /// The public half of the signing key, parsed on first use and cached.
    ///
    /// # Errors
    /// Returns `KeyMaterialError` if the key file is missing, unreadable or not
    /// an SPKI RSA key. Nothing is cached on failure.
    pub fn signing_public_key(&self) -> Result<&PublicKey, KeyMaterialError> {
        cached(
            &self.signing_public_key,
            self.settings.jwt_public_key_name(),
            |name| self.read_public_key(name),
        )
    }

    /// The API server's public key, read and parsed on every call.
    ///
    /// Not cached, so a replaced trust anchor file is picked up without a reload.
    ///
    /// # Errors
    /// Returns `KeyMaterialError` if the key file is missing, unreadable or not
    /// an SPKI RSA key.
    pub fn api_server_public_key(&self) -> Result<PublicKey, KeyMaterialError> {
        self.read_public_key(self.settings.api_server_public_key_name())
    }

    fn read_public_key(&self, name: &str) -> Result<PublicKey, KeyMaterialError> {
        let bytes = self.store.fetch(name)?;
        PublicKey::from_public_key_der(&bytes).map_err(|e| KeyMaterialError::malformed(name, e))
    }
}

/// Return the cell's value, filling it from `load(resource)` if empty.
///
/// Concurrent callers may each run `load`; only the first stored value is kept.
fn cached<'a, K>(
    cell: &'a OnceLock<K>,
    resource: &str,
    load: impl FnOnce(&str) -> Result<K, KeyMaterialError>,
) -> Result<&'a K, KeyMaterialError> {
    if let Some(key) = cell.get() {
        return Ok(key);
    }

    let key = load(resource)?;
    Ok(cell.get_or_init(|| {
        tracing::debug!(resource, "parsed and cached key");
        key
    }))
}

impl std::fmt::Display for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = self.settings.to_json().map_err(|_| std::fmt::Error)?;
        f.write_str(&json)
    }
}

impl std::fmt::Debug for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Configuration")
            .field("settings", &self.settings)
            .field("signing_private_key_cached", &self.signing_private_key.get().is_some())
            .field("signing_public_key_cached", &self.signing_public_key.get().is_some())
            .finish_non_exhaustive()
    }
}
