//! Concurrent creation against both store backends
//!
//! Many tasks create links at once; every create must succeed with a
//! distinct code and the store must end up holding exactly those records.

use std::collections::HashSet;
use std::sync::Arc;
use tempfile::NamedTempFile;

use shortlink::database::RedbStore;
use shortlink::generator::{CodeGenerator, RandomGenerator, SequenceGenerator};
use shortlink::model::ShortCode;
use shortlink::service::ShortLinkService;
use shortlink::store::{MappingStore, MemoryStore};

const CREATIONS: usize = 200;

/// Draws from a tiny alphabet space so concurrent creates collide often.
struct NarrowGenerator;

impl CodeGenerator for NarrowGenerator {
    fn candidate(&self) -> ShortCode {
        let n: u16 = rand::random_range(0..400);
        ShortCode::parse(format!("c{n:03}")).unwrap()
    }
}

async fn create_concurrently(service: Arc<ShortLinkService>) {
    let handles: Vec<_> = (0..CREATIONS)
        .map(|i| {
            let service = Arc::clone(&service);
            tokio::task::spawn_blocking(move || {
                service.create(&format!("title {i}"), &format!("https://example.com/{i}"))
            })
        })
        .collect();

    let mut codes = HashSet::new();
    for handle in handles {
        let record = handle.await.unwrap().expect("create failed");
        assert!(codes.insert(record.code.clone()), "duplicate code {}", record.code);
        assert_eq!(
            service.resolve(record.code.as_str()).unwrap(),
            record.original_url
        );
    }

    let stored = service.list().unwrap();
    assert_eq!(stored.len(), CREATIONS);
    assert_eq!(service.store().len().unwrap(), CREATIONS);

    let stored_codes: HashSet<_> = stored.into_iter().map(|r| r.code).collect();
    assert_eq!(stored_codes, codes);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_creates_memory_store() {
    let service = ShortLinkService::new(
        Arc::new(MemoryStore::new()),
        Arc::new(RandomGenerator::default()),
    );
    create_concurrently(Arc::new(service)).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_creates_redb_store() {
    let temp_db = NamedTempFile::new().unwrap();
    let store = RedbStore::open(temp_db.path().to_str().unwrap()).unwrap();
    let service = ShortLinkService::new(Arc::new(store), Arc::new(RandomGenerator::default()));
    create_concurrently(Arc::new(service)).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_creates_with_sequence_generator() {
    let service = ShortLinkService::new(
        Arc::new(MemoryStore::new()),
        Arc::new(SequenceGenerator::new(6)),
    );
    create_concurrently(Arc::new(service)).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_creates_survive_heavy_collisions() {
    // 200 codes out of 400 with a generous retry budget: collisions are
    // frequent but every create still lands on a unique code.
    let store: Arc<dyn MappingStore> = Arc::new(MemoryStore::new());
    let service =
        ShortLinkService::new(store, Arc::new(NarrowGenerator)).with_max_attempts(1_000);
    create_concurrently(Arc::new(service)).await;
}
