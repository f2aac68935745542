// ==============================================
// CONCURRENCY TESTS (integration)
// ==============================================
//
// Parallel threads hammer one cache; afterwards the shard invariants must
// hold and every deleter must have run exactly once over the lifetime.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use shardlru::prelude::*;

#[test]
fn parallel_insert_lookup_release() {
    let cache: Arc<ShardedLruCache<u64>> = Arc::new(new_lru_cache(1 << 16));
    let deletions = Arc::new(AtomicUsize::new(0));
    let insertions = Arc::new(AtomicUsize::new(0));
    let num_threads = 8;
    let ops_per_thread = 500;

    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let cache = Arc::clone(&cache);
            let deletions = Arc::clone(&deletions);
            let insertions = Arc::clone(&insertions);

            thread::spawn(move || {
                for i in 0..ops_per_thread {
                    match i % 4 {
                        0 | 1 => {
                            // Unique keys per thread; some repeats within
                            // the thread exercise duplicate displacement.
                            let key = format!("t{}-{}", thread_id, i / 8);
                            let counter = Arc::clone(&deletions);
                            let handle = cache.insert(
                                key.as_bytes(),
                                i as u64,
                                16,
                                Box::new(move |_, _| {
                                    counter.fetch_add(1, Ordering::SeqCst);
                                }),
                            );
                            insertions.fetch_add(1, Ordering::SeqCst);
                            cache.release(handle);
                        }
                        2 => {
                            let key = format!("t{}-{}", thread_id, i / 16);
                            if let Some(handle) = cache.lookup(key.as_bytes()) {
                                cache.release(handle);
                            }
                        }
                        _ => {
                            if i % 20 == 3 {
                                let key = format!("t{}-{}", thread_id, i / 16);
                                cache.erase(key.as_bytes());
                            }
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    cache.check_invariants().unwrap();

    // Teardown releases the cache's own references; afterwards every
    // inserted entry has been destroyed exactly once.
    drop(Arc::try_unwrap(cache).unwrap_or_else(|_| panic!("cache still shared")));
    assert_eq!(
        deletions.load(Ordering::SeqCst),
        insertions.load(Ordering::SeqCst)
    );
}

#[test]
fn handles_pin_entries_across_threads() {
    let cache: Arc<ShardedLruCache<Vec<u8>>> = Arc::new(new_lru_cache(1 << 16));

    let pinned = cache.insert(b"shared", vec![7; 32], 32, Box::new(|_, _| {}));

    let reader = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || {
            // Another thread erases concurrently; whether this lookup wins
            // the race or not, a hit stays readable through its handle.
            if let Some(handle) = cache.lookup(b"shared") {
                assert_eq!(handle.value(), &vec![7u8; 32]);
                cache.release(handle);
            }
        })
    };

    let eraser = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || cache.erase(b"shared"))
    };

    reader.join().unwrap();
    eraser.join().unwrap();

    // The pinning handle still reads the value after the erase settled.
    assert_eq!(pinned.value(), &vec![7u8; 32]);
    cache.release(pinned);
    cache.check_invariants().unwrap();
}

#[test]
fn new_id_is_unique_across_threads() {
    let cache: Arc<ShardedLruCache<u64>> = Arc::new(new_lru_cache(1024));
    let max_seen = Arc::new(AtomicU64::new(0));
    let per_thread = 200u64;
    let num_threads = 8u64;

    let handles: Vec<_> = (0..num_threads)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let max_seen = Arc::clone(&max_seen);
            thread::spawn(move || {
                let mut ids = Vec::with_capacity(per_thread as usize);
                for _ in 0..per_thread {
                    ids.push(cache.new_id());
                }
                // Monotone within a thread.
                assert!(ids.windows(2).all(|w| w[0] < w[1]));
                max_seen.fetch_max(*ids.last().unwrap(), Ordering::SeqCst);
                ids
            })
        })
        .collect();

    let mut all_ids: Vec<u64> = Vec::new();
    for handle in handles {
        all_ids.extend(handle.join().unwrap());
    }
    all_ids.sort_unstable();
    all_ids.dedup();
    assert_eq!(all_ids.len(), (per_thread * num_threads) as usize);
    assert_eq!(max_seen.load(Ordering::SeqCst), per_thread * num_threads);
}

#[test]
fn concurrent_adaptive_lookups_stay_consistent() {
    let cache: Arc<AdaptiveCache<u64>> = Arc::new(AdaptiveCache::new(1 << 14));
    let num_threads = 4;

    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..400u32 {
                    let key = format!("k{}", (thread_id * 100 + i) % 500);
                    match i % 3 {
                        0 => {
                            let handle =
                                cache.insert(key.as_bytes(), u64::from(i), 64, Box::new(|_, _| {}));
                            cache.release(handle);
                        }
                        _ => match cache.lookup(key.as_bytes()) {
                            AdaptiveLookup::Hit(handle) => cache.release(handle),
                            AdaptiveLookup::GhostHit(charge) => assert_eq!(charge, 64),
                            AdaptiveLookup::Miss => {}
                        },
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    cache.real().check_invariants().unwrap();
    cache.ghost().check_invariants().unwrap();
}
