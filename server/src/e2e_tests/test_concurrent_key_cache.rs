//! Test that concurrent key accessors agree on one cached key.

use std::sync::{Arc, Barrier};

use crate::configuration::ConfigurationProvider;
use crate::testing::{CountingStore, fixture_store};

const CALLERS: usize = 16;

#[test]
fn test_concurrent_signing_key_access() {
    let store = Arc::new(CountingStore::new(fixture_store()));
    let provider = ConfigurationProvider::new(store.clone());
    let configuration = provider.get_instance();
    let barrier = Barrier::new(CALLERS);

    let keys: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..CALLERS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    configuration
                        .signing_private_key()
                        .expect("valid key")
                        .clone()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("caller panicked"))
            .collect()
    });

    let cached = configuration.signing_private_key().expect("valid key");
    assert!(keys.iter().all(|key| key == cached));
    // Racing callers may parse redundantly, but never after the cell is filled.
    let fetches = store.fetch_count("sk.der");
    assert!((1..=CALLERS).contains(&fetches));

    configuration.signing_private_key().expect("valid key");
    assert_eq!(store.fetch_count("sk.der"), fetches);
}
