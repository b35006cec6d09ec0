use std::collections::HashMap;
use std::sync::Mutex;

use crate::resource::{MemoryStore, ResourceError, ResourceStore};

/// PKCS#8 DER RSA-2048 signing key (generated for test purposes only).
pub const SIGNING_PRIVATE_KEY_DER: &[u8] = include_bytes!("../../testdata/sk.der");
/// SPKI DER public half of `SIGNING_PRIVATE_KEY_DER`.
pub const SIGNING_PUBLIC_KEY_DER: &[u8] = include_bytes!("../../testdata/pk.der");
/// SPKI DER RSA-2048 public key of an unrelated keypair, standing in for the API server.
pub const API_SERVER_PUBLIC_KEY_DER: &[u8] = include_bytes!("../../testdata/apiserver.der");

/// A store holding the three fixture keys under their default names.
#[must_use]
pub fn fixture_store() -> MemoryStore {
    MemoryStore::new()
        .with("sk.der", SIGNING_PRIVATE_KEY_DER)
        .with("pk.der", SIGNING_PUBLIC_KEY_DER)
        .with("apiserver.der", API_SERVER_PUBLIC_KEY_DER)
}

/// Wraps a store and counts fetches per resource name.
pub struct CountingStore<S = MemoryStore> {
    inner: S,
    fetches: Mutex<HashMap<String, usize>>,
}

impl<S: ResourceStore> CountingStore<S> {
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            fetches: Mutex::new(HashMap::new()),
        }
    }

    /// Number of `fetch` calls made for `name`, successful or not.
    #[must_use]
    pub fn fetch_count(&self, name: &str) -> usize {
        let fetches = self.fetches.lock().expect("fetch counter lock");
        fetches.get(name).copied().unwrap_or(0)
    }
}

impl<S: ResourceStore> ResourceStore for CountingStore<S> {
    fn fetch(&self, name: &str) -> Result<Vec<u8>, ResourceError> {
        {
            let mut fetches = self.fetches.lock().expect("fetch counter lock");
            *fetches.entry(name.to_string()).or_insert(0) += 1;
        }
        self.inner.fetch(name)
    }
}
