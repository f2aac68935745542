// ==============================================
// ADAPTIVE SIZING BEHAVIOR (integration)
// ==============================================
//
// Ghost-hit feedback and capacity rebalancing across the adaptive, block,
// and point cache surfaces.

use shardlru::cache::SHARD_BITS;
use shardlru::ds::hash::hash_bytes;
use shardlru::prelude::*;

/// Deterministically probes for `n` keys that land in one shard, so the
/// per-shard eviction arithmetic is exact.
fn same_shard_keys(n: usize) -> Vec<Vec<u8>> {
    let target = hash_bytes(b"probe-0") >> (32 - SHARD_BITS);
    let mut keys = Vec::with_capacity(n);
    let mut i = 0u32;
    while keys.len() < n {
        let key = format!("probe-{i}").into_bytes();
        if hash_bytes(&key) >> (32 - SHARD_BITS) == target {
            keys.push(key);
        }
        i += 1;
    }
    keys
}

/// Fills one shard of `cache` past its budget so early keys spill into the
/// ghost; returns the keys, oldest first.
fn spill_one_shard(cache: &AdaptiveCache<u64>, n: usize, charge: usize) -> Vec<Vec<u8>> {
    let keys = same_shard_keys(n);
    for (i, key) in keys.iter().enumerate() {
        let handle = cache.insert(key, i as u64, charge, Box::new(|_, _| {}));
        cache.release(handle);
    }
    keys
}

#[test]
fn ghost_hit_reports_the_evicted_charge() {
    // real = ghost = 200; per-shard real budget is ceil(200/16) = 13.
    let cache: AdaptiveCache<u64> = AdaptiveCache::new(400);
    let keys = spill_one_shard(&cache, 5, 50);

    match cache.lookup(&keys[0]) {
        AdaptiveLookup::GhostHit(charge) => assert_eq!(charge, 50),
        other => panic!("expected ghost hit, got {other:?}"),
    }
    // The newest key is still a real hit.
    match cache.lookup(&keys[4]) {
        AdaptiveLookup::Hit(handle) => cache.release(handle),
        other => panic!("expected real hit, got {other:?}"),
    }
}

#[test]
fn ghost_hits_bias_capacity_toward_the_real_side() {
    let cache: AdaptiveCache<u64> = AdaptiveCache::new(400);
    spill_one_shard(&cache, 5, 50);
    assert!(cache.total_ghost_charge() > 0);

    let real_before = cache.capacity();
    let ghost_before = cache.ghost().capacity();

    // Each call exceeds the 4096 threshold on its own.
    for _ in 0..3 {
        cache.adjust_capacity(5000);
    }

    let real_grown = cache.capacity() - real_before;
    let ghost_grown = cache.ghost().capacity() - ghost_before;
    assert!(real_grown > 0, "real capacity must strictly increase");
    assert!(ghost_grown > 0);
    assert!(
        real_grown > ghost_grown,
        "the fuller real side receives the larger share"
    );
}

#[test]
fn below_threshold_adjustments_accumulate() {
    let cache: AdaptiveCache<u64> = AdaptiveCache::new(400);
    spill_one_shard(&cache, 5, 50);
    let before = cache.capacity();

    // 3 * 2000 = 6000 crosses the threshold on the third call.
    cache.adjust_capacity(2000);
    cache.adjust_capacity(2000);
    assert_eq!(cache.capacity(), before, "still below threshold");
    cache.adjust_capacity(2000);
    assert!(cache.capacity() > before, "accumulated delta applied");
}

#[test]
fn block_cache_passes_adaptive_signals_through() {
    let cache: BlockCache<u64> = new_block_cache(400);
    let keys = same_shard_keys(5);
    for (i, key) in keys.iter().enumerate() {
        let handle = cache.insert(key, i as u64, 50, Box::new(|_, _| {}));
        cache.release(handle);
    }

    assert!(cache.total_ghost_charge() > 0);
    match cache.lookup(&keys[0]) {
        AdaptiveLookup::GhostHit(charge) => assert_eq!(charge, 50),
        other => panic!("expected ghost hit, got {other:?}"),
    }

    let before = cache.capacity();
    cache.adjust_capacity(5000);
    assert!(cache.capacity() > before);
}

#[test]
fn point_cache_routes_and_rebalances() {
    let cache: PointCache<Vec<u8>, u64> = new_point_cache(1 << 16);

    let kv = cache.insert_kv(b"row:1", b"payload".to_vec(), 7, Box::new(|_, _| {}));
    let kp = cache.insert_kp(b"row:1", 0xdead_beef, 8, Box::new(|_, _| {}));
    assert_eq!(cache.value_kv(&kv), &b"payload".to_vec());
    assert_eq!(*cache.value_kp(&kp), 0xdead_beef);
    cache.release_kv(kv);
    cache.release_kp(kp);

    // Load the kv side more heavily, then rebalance.
    for i in 0..16u32 {
        let key = format!("kv-{i}");
        let handle = cache.insert_kv(key.as_bytes(), vec![0; 64], 64, Box::new(|_, _| {}));
        cache.release_kv(handle);
    }

    let kv_before = cache.kv_capacity();
    let kp_before = cache.kp_capacity();
    cache.adjust_capacity(100_000);
    assert!(cache.kv_capacity() - kv_before > cache.kp_capacity() - kp_before);
}

#[test]
fn point_cache_handles_empty_kp_side() {
    let cache: PointCache<u64, u64> = new_point_cache(4096);

    let handle = cache.insert_kv(b"only-kv", 1, 10, Box::new(|_, _| {}));
    cache.release_kv(handle);

    // Must not divide by zero; budget splits evenly instead.
    cache.adjust_capacity(10_000);
    assert!(cache.kv_capacity() > 0 && cache.kp_capacity() > 0);
}

#[cfg(feature = "metrics")]
#[test]
fn adaptive_snapshot_reports_into_a_sink() {
    use shardlru::metrics::MetricsSink;

    #[derive(Default)]
    struct VecSink(Vec<(String, u64)>);

    impl MetricsSink for VecSink {
        fn counter(&mut self, name: &str, value: u64) {
            self.0.push((name.to_string(), value));
        }

        fn gauge(&mut self, name: &str, value: u64) {
            self.0.push((name.to_string(), value));
        }
    }

    let cache: AdaptiveCache<u64> = AdaptiveCache::new(400);
    spill_one_shard(&cache, 5, 50);
    let keys = same_shard_keys(1);
    let _ = cache.lookup(&keys[0]); // ghost hit

    let snapshot = cache.metrics_snapshot();
    assert!(snapshot.ghost_hits >= 1);
    assert!(snapshot.real.evictions >= 1);

    let mut sink = VecSink::default();
    snapshot.report("point.kv", &mut sink);
    assert!(sink.0.iter().any(|(name, _)| name == "point.kv.ghost_hits"));
    assert!(sink
        .0
        .iter()
        .any(|(name, _)| name == "point.kv.real.evictions"));
}
