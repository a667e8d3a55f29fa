//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the single-flight, freshness and invalidation rules.

use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::time::Duration;

use crate::cache::{KeyPattern, Lookup, SwrCache, STALE_WINDOW};
use crate::error::Result;

// == Helpers ==
/// Single-threaded runtime with a paused clock, one per test case.
fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .expect("failed to build test runtime")
}

fn counting_fetcher(
    calls: &Arc<AtomicUsize>,
    value: String,
    delay: Duration,
) -> impl FnOnce() -> futures::future::BoxFuture<'static, Result<String>> + Send + 'static {
    use futures::FutureExt;

    let calls = Arc::clone(calls);
    move || {
        calls.fetch_add(1, Ordering::SeqCst);
        async move {
            tokio::time::sleep(delay).await;
            Ok(value)
        }
        .boxed()
    }
}

async fn settle(cache: &SwrCache<String>) {
    while cache.in_flight() > 0 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

// == Strategies ==
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,8}(:[a-z0-9]{1,8})?".prop_map(|s| s)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Any number of concurrent callers on an unseen key run the fetcher once
    // and all observe its value.
    #[test]
    fn prop_single_flight(callers in 1usize..32, delay_ms in 0u64..200) {
        let rt = paused_runtime();
        let (calls, values) = rt.block_on(async {
            let cache = SwrCache::new(Duration::from_secs(60));
            let calls = Arc::new(AtomicUsize::new(0));

            let handles: Vec<_> = (0..callers)
                .map(|i| {
                    let cache = cache.clone();
                    let fetcher = counting_fetcher(
                        &calls,
                        format!("value_{i}"),
                        Duration::from_millis(delay_ms),
                    );
                    tokio::spawn(async move { cache.get("products", fetcher).await })
                })
                .collect();

            let mut values = Vec::with_capacity(callers);
            for handle in handles {
                values.push(handle.await.unwrap().unwrap());
            }
            (calls.load(Ordering::SeqCst), values)
        });

        prop_assert_eq!(calls, 1, "fetcher should run exactly once");
        prop_assert!(values.iter().all(|v| v == "value_0"), "callers saw different values");
    }

    // Reads at any point inside the TTL are served from the cache.
    #[test]
    fn prop_fresh_within_ttl(
        ttl_ms in 1_000u64..600_000,
        offsets in prop::collection::vec(0u64..10_000_000, 1..10)
    ) {
        let rt = paused_runtime();
        let (calls, all_fresh) = rt.block_on(async {
            let ttl = Duration::from_millis(ttl_ms);
            let cache = SwrCache::new(ttl);
            let calls = Arc::new(AtomicUsize::new(0));
            cache
                .get("cart", counting_fetcher(&calls, "v1".into(), Duration::ZERO))
                .await
                .unwrap();

            let mut points: Vec<u64> = offsets.iter().map(|o| o % ttl_ms).collect();
            points.sort_unstable();

            let mut elapsed = 0;
            let mut all_fresh = true;
            for point in points {
                tokio::time::advance(Duration::from_millis(point - elapsed)).await;
                elapsed = point;
                let lookup = cache
                    .lookup("cart", ttl, counting_fetcher(&calls, "v2".into(), Duration::ZERO))
                    .await
                    .unwrap();
                all_fresh &= lookup == Lookup::Fresh("v1".to_string());
            }
            (calls.load(Ordering::SeqCst), all_fresh)
        });

        prop_assert_eq!(calls, 1);
        prop_assert!(all_fresh);
    }

    // Any number of reads inside the stale window serve the old value and
    // trigger exactly one background fetch.
    #[test]
    fn prop_stale_reads_revalidate_once(
        ttl_secs in 1u64..590,
        extra_secs in 0u64..600,
        reads in 1usize..10
    ) {
        let ttl = Duration::from_secs(ttl_secs);
        let age = ttl + Duration::from_secs(extra_secs);
        prop_assume!(age < STALE_WINDOW);

        let rt = paused_runtime();
        let (calls, served, after) = rt.block_on(async {
            let cache = SwrCache::new(ttl);
            let calls = Arc::new(AtomicUsize::new(0));
            cache
                .get("cart", counting_fetcher(&calls, "v1".into(), Duration::ZERO))
                .await
                .unwrap();
            tokio::time::advance(age).await;

            let mut served = Vec::new();
            for _ in 0..reads {
                let fetcher = counting_fetcher(&calls, "v2".into(), Duration::from_millis(5));
                served.push(cache.get_with_ttl("cart", ttl, fetcher).await.unwrap());
            }
            settle(&cache).await;
            (calls.load(Ordering::SeqCst), served, cache.peek("cart"))
        });

        prop_assert_eq!(calls, 2, "expected one initial fetch and one revalidation");
        prop_assert!(served.iter().all(|v| v == "v1"));
        prop_assert_eq!(after, Some("v2".to_string()));
    }

    // Invalidating one key refetches that key only.
    #[test]
    fn prop_invalidate_forces_refetch(
        keys in prop::collection::hash_set(valid_key_strategy(), 1..10),
        pick in 0usize..100
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let target = keys[pick % keys.len()].clone();

        let rt = paused_runtime();
        let calls = rt.block_on(async {
            let cache = SwrCache::new(Duration::from_secs(60));
            let calls = Arc::new(AtomicUsize::new(0));
            for key in &keys {
                cache
                    .get(key, counting_fetcher(&calls, key.clone(), Duration::ZERO))
                    .await
                    .unwrap();
            }
            cache.invalidate(&target);
            for key in &keys {
                cache
                    .get(key, counting_fetcher(&calls, key.clone(), Duration::ZERO))
                    .await
                    .unwrap();
            }
            calls.load(Ordering::SeqCst)
        });

        prop_assert_eq!(calls, keys.len() + 1);
    }

    // Prefix invalidation removes exactly the matching keys.
    #[test]
    fn prop_prefix_invalidation(
        keys in prop::collection::hash_set(valid_key_strategy(), 0..20),
        prefix in "[a-z]{1,2}"
    ) {
        let rt = paused_runtime();
        let (removed, remaining) = rt.block_on(async {
            let cache = SwrCache::new(Duration::from_secs(60));
            for key in &keys {
                cache.set(key, key.clone()).unwrap();
            }
            let removed = cache.invalidate_pattern(&KeyPattern::prefix(prefix.clone()));
            let remaining: HashSet<String> =
                cache.keys().into_iter().map(|info| info.key).collect();
            (removed, remaining)
        });

        let expected: HashSet<String> = keys
            .iter()
            .filter(|key| !key.starts_with(prefix.as_str()))
            .cloned()
            .collect();
        prop_assert_eq!(removed, keys.len() - expected.len());
        prop_assert_eq!(remaining, expected);
    }
}
