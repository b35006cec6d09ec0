//! Test that concurrent first callers all observe one configuration record.

use std::sync::{Arc, Barrier};

use crate::configuration::{CONFIGURATION_RESOURCE, ConfigurationProvider};
use crate::resource::MemoryStore;
use crate::testing::CountingStore;

const CALLERS: usize = 32;

#[test]
fn test_concurrent_get_instance_single_record() {
    let store = Arc::new(CountingStore::new(MemoryStore::new().with(
        CONFIGURATION_RESOURCE,
        r#"{"server_name": "AcmeCloud", "rate_limit": 7}"#,
    )));
    let provider = ConfigurationProvider::new(store.clone());
    let barrier = Barrier::new(CALLERS);

    let records: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..CALLERS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    provider.get_instance()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("caller panicked"))
            .collect()
    });

    let first = &records[0];
    for record in &records {
        assert!(Arc::ptr_eq(first, record));
        assert_eq!(record.settings(), first.settings());
    }
    assert_eq!(first.settings().server_name(), "AcmeCloud");
    assert_eq!(first.settings().rate_limit(), 7);
    assert_eq!(store.fetch_count(CONFIGURATION_RESOURCE), 1);
}

#[test]
fn test_concurrent_get_instance_without_document() {
    let provider = ConfigurationProvider::new(Arc::new(MemoryStore::new()));
    let barrier = Barrier::new(CALLERS);

    let records: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..CALLERS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    provider.get_instance()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("caller panicked"))
            .collect()
    });

    assert!(records.iter().all(|record| Arc::ptr_eq(&records[0], record)));
}
