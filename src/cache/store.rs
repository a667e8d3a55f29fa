//! Cache Store Module
//!
//! Stale-while-revalidate response cache with single-flight fetches.
//!
//! Every fetch runs in its own spawned task and is shared between all
//! callers waiting on the same key. The task writes its result back into
//! the map itself, so a fetch completes even when every caller gave up.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use tokio::time::Duration;
use tracing::{debug, warn};

use crate::cache::{
    CacheEntry, CacheStats, Freshness, KeyPattern, Lookup, DEFAULT_TTL, STALE_WINDOW,
};
use crate::error::{CacheError, Result};

type SharedFetch<T> = Shared<BoxFuture<'static, Result<T>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchKind {
    /// A caller is waiting on the result
    Load,
    /// Background refresh of a stale entry
    Revalidate,
}

struct InFlight<T> {
    id: u64,
    future: SharedFetch<T>,
}

struct Slots<T> {
    entries: HashMap<String, CacheEntry<T>>,
    in_flight: HashMap<String, InFlight<T>>,
    stats: CacheStats,
    next_fetch_id: u64,
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            in_flight: HashMap::new(),
            stats: CacheStats::new(),
            next_fetch_id: 0,
        }
    }
}

struct Inner<T> {
    slots: Mutex<Slots<T>>,
    default_ttl: Duration,
}

impl<T> Inner<T> {
    fn lock(&self, op: &'static str) -> MutexGuard<'_, Slots<T>> {
        match self.slots.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!(
                    op,
                    result = "poisoned_recovered",
                    "Recovered from poisoned cache lock"
                );
                poisoned.into_inner()
            }
        }
    }
}

impl<T: Clone> Inner<T> {
    // == Complete ==
    /// Commits a finished fetch.
    ///
    /// Only the fetch currently registered for the key may write; a fetch
    /// whose key was invalidated or cleared meanwhile is dropped here.
    fn complete(&self, key: &str, id: u64, kind: FetchKind, outcome: &Result<T>) {
        let mut guard = self.lock("complete");
        let slots = &mut *guard;

        let registered = slots
            .in_flight
            .get(key)
            .is_some_and(|pending| pending.id == id);
        if !registered {
            debug!(key, fetch_id = id, "Discarding result of invalidated fetch");
            return;
        }
        slots.in_flight.remove(key);

        match outcome {
            Ok(data) => {
                slots
                    .entries
                    .insert(key.to_string(), CacheEntry::new(data.clone()));
                debug!(key, ?kind, "Stored fetched value");
            }
            Err(err) if kind == FetchKind::Revalidate => {
                slots.stats.record_revalidation_failure();
                warn!(key, error = %err, "Background revalidation failed, keeping stale data");
            }
            Err(err) => {
                slots.stats.record_fetch_failure();
                debug!(key, error = %err, "Fetch failed, nothing cached");
            }
        }
    }
}

// == Key Info ==
/// Diagnostic view of one stored entry.
#[derive(Debug, Clone, Serialize)]
pub struct KeyInfo {
    pub key: String,
    pub age_ms: u64,
    pub fetched_at: DateTime<Utc>,
    /// Freshness measured against the cache's default TTL
    pub freshness: Freshness,
    pub in_flight: bool,
}

// == SWR Cache ==
/// Stale-while-revalidate cache with single-flight fetches per key.
///
/// Cloning the handle shares the same state. Entries live until they are
/// invalidated; there is no capacity bound.
pub struct SwrCache<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for SwrCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for SwrCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.inner.lock("debug");
        f.debug_struct("SwrCache")
            .field("default_ttl", &self.inner.default_ttl)
            .field("entries", &slots.entries.len())
            .field("in_flight", &slots.in_flight.len())
            .finish()
    }
}

impl<T> Default for SwrCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<T> SwrCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates an empty cache whose `get` uses `default_ttl`.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                slots: Mutex::new(Slots::default()),
                default_ttl,
            }),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.inner.default_ttl
    }

    // == Get ==
    /// Returns the value for `key`, fetching it with the default TTL.
    pub async fn get<F, Fut, E>(&self, key: &str, fetcher: F) -> Result<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = std::result::Result<T, E>> + Send + 'static,
        E: Into<CacheError> + Send + 'static,
    {
        self.get_with_ttl(key, self.inner.default_ttl, fetcher)
            .await
    }

    /// Returns the value for `key`, treating entries younger than `ttl` as fresh.
    pub async fn get_with_ttl<F, Fut, E>(&self, key: &str, ttl: Duration, fetcher: F) -> Result<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = std::result::Result<T, E>> + Send + 'static,
        E: Into<CacheError> + Send + 'static,
    {
        self.lookup(key, ttl, fetcher).await.map(Lookup::into_value)
    }

    // == Lookup ==
    /// Resolves `key` and reports how the value was served.
    ///
    /// 1. Fresh entry: returned as is, `fetcher` is dropped unused.
    /// 2. Stale entry: returned as is; one background revalidation is
    ///    started unless a fetch is already pending. Its failure is logged
    ///    and never reaches a caller.
    /// 3. Fetch already pending: the caller waits on that fetch.
    /// 4. Otherwise `fetcher` runs and the caller waits on it. On failure
    ///    nothing is stored and the error goes to every waiting caller.
    pub async fn lookup<F, Fut, E>(&self, key: &str, ttl: Duration, fetcher: F) -> Result<Lookup<T>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = std::result::Result<T, E>> + Send + 'static,
        E: Into<CacheError> + Send + 'static,
    {
        validate_key(key)?;

        let pending = {
            let mut guard = self.inner.lock("lookup");
            let slots = &mut *guard;

            let cached = slots
                .entries
                .get(key)
                .map(|entry| (entry.freshness(ttl, STALE_WINDOW), entry.data.clone()));

            match cached {
                Some((Freshness::Fresh, data)) => {
                    slots.stats.record_hit();
                    return Ok(Lookup::Fresh(data));
                }
                Some((Freshness::Stale, data)) => {
                    slots.stats.record_stale_hit();
                    if !slots.in_flight.contains_key(key) {
                        slots.stats.record_revalidation();
                        debug!(key, "Serving stale entry, revalidating in background");
                        let _background =
                            self.start_fetch(slots, key, fetcher, FetchKind::Revalidate);
                    }
                    return Ok(Lookup::StaleRevalidating(data));
                }
                Some((Freshness::Expired, _)) | None => {}
            }

            slots.stats.record_miss();
            match slots.in_flight.get(key) {
                Some(pending) => {
                    slots.stats.record_deduplicated();
                    pending.future.clone()
                }
                None => self.start_fetch(slots, key, fetcher, FetchKind::Load),
            }
        };

        pending.await.map(Lookup::Miss)
    }

    fn start_fetch<F, Fut, E>(
        &self,
        slots: &mut Slots<T>,
        key: &str,
        fetcher: F,
        kind: FetchKind,
    ) -> SharedFetch<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = std::result::Result<T, E>> + Send + 'static,
        E: Into<CacheError> + Send + 'static,
    {
        let id = slots.next_fetch_id;
        slots.next_fetch_id += 1;

        let inner = Arc::clone(&self.inner);
        let owned_key = key.to_string();
        let task = tokio::spawn(async move {
            let outcome: Result<T> = match AssertUnwindSafe(async move { fetcher().await })
                .catch_unwind()
                .await
            {
                Ok(result) => result.map_err(Into::into),
                Err(_) => Err(CacheError::Internal(format!(
                    "fetcher for '{owned_key}' panicked"
                ))),
            };
            inner.complete(&owned_key, id, kind, &outcome);
            outcome
        });

        let future = async move {
            task.await.unwrap_or_else(|err| {
                Err(CacheError::Internal(format!("fetch task failed: {err}")))
            })
        }
        .boxed()
        .shared();

        slots.in_flight.insert(
            key.to_string(),
            InFlight {
                id,
                future: future.clone(),
            },
        );
        future
    }

    // == Set ==
    /// Stores `data` under `key` as if it had just been fetched.
    pub fn set(&self, key: &str, data: T) -> Result<()> {
        validate_key(key)?;
        let mut slots = self.inner.lock("set");
        slots.entries.insert(key.to_string(), CacheEntry::new(data));
        Ok(())
    }

    // == Peek ==
    /// Returns the stored value regardless of its age, without fetching.
    pub fn peek(&self, key: &str) -> Option<T> {
        let slots = self.inner.lock("peek");
        slots.entries.get(key).map(|entry| entry.data.clone())
    }

    // == Invalidate ==
    /// Removes the entry for `key` and forgets any pending fetch for it.
    ///
    /// Callers already waiting on that fetch still get its result, but the
    /// result is not stored. Returns true if anything was removed.
    pub fn invalidate(&self, key: &str) -> bool {
        let mut slots = self.inner.lock("invalidate");
        let removed_entry = slots.entries.remove(key).is_some();
        let removed_fetch = slots.in_flight.remove(key).is_some();
        removed_entry || removed_fetch
    }

    /// Removes every entry whose key matches `pattern`.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate_pattern(&self, pattern: &KeyPattern) -> usize {
        let mut slots = self.inner.lock("invalidate_pattern");
        let before = slots.entries.len();
        slots.entries.retain(|key, _| !pattern.matches(key));
        slots.in_flight.retain(|key, _| !pattern.matches(key));
        let removed = before - slots.entries.len();
        debug!(removed, "Invalidated keys by pattern");
        removed
    }

    // == Clear ==
    pub fn clear(&self) {
        let mut slots = self.inner.lock("clear");
        slots.entries.clear();
        slots.in_flight.clear();
    }

    // == Size ==
    /// Number of stored entries, including expired ones not yet refetched.
    pub fn size(&self) -> usize {
        self.inner.lock("size").entries.len()
    }

    pub fn in_flight(&self) -> usize {
        self.inner.lock("in_flight").in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        let slots = self.inner.lock("stats");
        let mut stats = slots.stats.clone();
        stats.set_gauges(slots.entries.len(), slots.in_flight.len());
        stats
    }

    // == Keys ==
    /// Lists stored entries sorted by key.
    pub fn keys(&self) -> Vec<KeyInfo> {
        let slots = self.inner.lock("keys");
        let mut keys: Vec<KeyInfo> = slots
            .entries
            .iter()
            .map(|(key, entry)| KeyInfo {
                key: key.clone(),
                age_ms: u64::try_from(entry.age().as_millis()).unwrap_or(u64::MAX),
                fetched_at: entry.fetched_at_utc,
                freshness: entry.freshness(self.inner.default_ttl, STALE_WINDOW),
                in_flight: slots.in_flight.contains_key(key),
            })
            .collect();
        keys.sort_by(|a, b| a.key.cmp(&b.key));
        keys
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("Key cannot be empty".to_string()));
    }
    Ok(())
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::LookupStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::{assert_err, assert_ok};

    const TTL: Duration = Duration::from_secs(60);

    fn counting(
        calls: &Arc<AtomicUsize>,
        value: &str,
    ) -> impl FnOnce() -> futures::future::Ready<Result<String>> + Send + 'static {
        let calls = Arc::clone(calls);
        let value = value.to_string();
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(Ok(value))
        }
    }

    fn slow(
        calls: &Arc<AtomicUsize>,
        value: &str,
        delay: Duration,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<String>> + Send + 'static {
        let calls = Arc::clone(calls);
        let value = value.to_string();
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(delay).await;
                Ok(value)
            }
            .boxed()
        }
    }

    fn failing(
        calls: &Arc<AtomicUsize>,
    ) -> impl FnOnce() -> futures::future::Ready<Result<String>> + Send + 'static {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(Err(CacheError::Fetch("backend down".to_string())))
        }
    }

    /// Waits for every pending fetch to commit.
    async fn settle<T: Clone + Send + Sync + 'static>(cache: &SwrCache<T>) {
        for _ in 0..1000 {
            if cache.in_flight() == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        panic!("pending fetches did not settle");
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_get_fetches_once() {
        let cache = SwrCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));

        let lookup = assert_ok!(cache.lookup("cart", TTL, counting(&calls, "v1")).await);
        assert_eq!(lookup, Lookup::Miss("v1".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.size(), 1);
        assert_eq!(cache.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_within_ttl_is_served_fresh() {
        let cache = SwrCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));

        let first = cache.get("cart", counting(&calls, "v1")).await.unwrap();
        tokio::time::advance(Duration::from_secs(59)).await;
        let second = cache
            .lookup("cart", TTL, counting(&calls, "v2"))
            .await
            .unwrap();

        assert_eq!(second.status(), LookupStatus::Fresh);
        assert_eq!(first, *second.value());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().hits, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_gets_share_one_fetch() {
        let cache = SwrCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let cache = cache.clone();
                let fetcher = slow(&calls, "v1", Duration::from_millis(50));
                tokio::spawn(async move { cache.get("categories:all", fetcher).await })
            })
            .collect();

        for result in futures::future::join_all(handles).await {
            assert_eq!(result.unwrap().unwrap(), "v1");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = cache.stats();
        assert_eq!(stats.misses, 10);
        assert_eq!(stats.deduplicated, 9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_entry_served_while_revalidating() {
        let cache = SwrCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get("cart", counting(&calls, "v1")).await.unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;

        let lookup = cache
            .lookup("cart", TTL, slow(&calls, "v2", Duration::from_millis(20)))
            .await
            .unwrap();
        assert_eq!(lookup, Lookup::StaleRevalidating("v1".to_string()));
        assert_eq!(cache.in_flight(), 1);

        // Second stale read while the refresh is pending starts nothing new
        let lookup = cache
            .lookup("cart", TTL, counting(&calls, "v3"))
            .await
            .unwrap();
        assert_eq!(lookup, Lookup::StaleRevalidating("v1".to_string()));

        settle(&cache).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let lookup = cache
            .lookup("cart", TTL, counting(&calls, "v4"))
            .await
            .unwrap();
        assert_eq!(lookup, Lookup::Fresh("v2".to_string()));
        assert_eq!(cache.stats().revalidations, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_revalidation_keeps_stale_data() {
        let cache = SwrCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get("cart", counting(&calls, "v1")).await.unwrap();
        tokio::time::advance(Duration::from_secs(120)).await;

        let value = assert_ok!(cache.get_with_ttl("cart", TTL, failing(&calls)).await);
        assert_eq!(value, "v1");
        settle(&cache).await;

        assert_eq!(cache.peek("cart"), Some("v1".to_string()));
        assert_eq!(cache.stats().revalidation_failures, 1);

        // Still stale, so the next read serves v1 again and retries in the background
        let lookup = cache
            .lookup("cart", TTL, counting(&calls, "v2"))
            .await
            .unwrap();
        assert_eq!(lookup, Lookup::StaleRevalidating("v1".to_string()));
        settle(&cache).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(cache.peek("cart"), Some("v2".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_waits_for_fetch() {
        let cache = SwrCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get("cart", counting(&calls, "v1")).await.unwrap();
        tokio::time::advance(STALE_WINDOW).await;

        let lookup = cache
            .lookup("cart", TTL, counting(&calls, "v2"))
            .await
            .unwrap();
        assert_eq!(lookup, Lookup::Miss("v2".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_stores_nothing_and_retries() {
        let cache: SwrCache<String> = SwrCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));

        let err = assert_err!(cache.get("cart", failing(&calls)).await);
        assert_eq!(err, CacheError::Fetch("backend down".to_string()));
        assert!(cache.is_empty());
        assert_eq!(cache.in_flight(), 0);
        assert_eq!(cache.stats().fetch_failures, 1);

        let value = cache.get("cart", counting(&calls, "v1")).await.unwrap();
        assert_eq!(value, "v1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_reaches_every_waiter() {
        let cache: SwrCache<String> = SwrCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));

        let slow_failure = {
            let calls = Arc::clone(&calls);
            move || {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Err::<String, _>(anyhow::anyhow!("timeout talking to backend"))
                }
            }
        };

        let (a, b) = tokio::join!(
            cache.get("cart", slow_failure),
            cache.get("cart", counting(&calls, "unused"))
        );

        assert_eq!(a.unwrap_err(), CacheError::Fetch("timeout talking to backend".into()));
        assert!(b.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_forces_refetch() {
        let cache = SwrCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get("cart", counting(&calls, "v1")).await.unwrap();
        assert!(cache.invalidate("cart"));
        assert!(!cache.invalidate("cart"));

        let value = cache.get("cart", counting(&calls, "v2")).await.unwrap();
        assert_eq!(value, "v2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidated_fetch_result_is_not_stored() {
        let cache = SwrCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));

        let waiter = {
            let cache = cache.clone();
            let fetcher = slow(&calls, "v1", Duration::from_millis(100));
            tokio::spawn(async move { cache.get("cart", fetcher).await })
        };
        while cache.in_flight() == 0 {
            tokio::task::yield_now().await;
        }

        assert!(cache.invalidate("cart"));
        assert_eq!(waiter.await.unwrap().unwrap(), "v1");
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_pattern_and_clear() {
        let cache = SwrCache::new(TTL);
        cache.set("categories:all", 1).unwrap();
        cache.set("categories:featured", 2).unwrap();
        cache.set("cart", 3).unwrap();

        let pattern = KeyPattern::regex("^categories:").unwrap();
        assert_eq!(cache.invalidate_pattern(&pattern), 2);
        assert_eq!(cache.size(), 1);
        assert_eq!(cache.peek("cart"), Some(3));

        cache.clear();
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_resets_timestamp() {
        let cache = SwrCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get("cart", counting(&calls, "v1")).await.unwrap();
        tokio::time::advance(Duration::from_secs(90)).await;
        cache.set("cart", "local".to_string()).unwrap();

        let lookup = cache
            .lookup("cart", TTL, counting(&calls, "v2"))
            .await
            .unwrap();
        assert_eq!(lookup, Lookup::Fresh("local".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_key_rejected() {
        let cache = SwrCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));

        let result = cache.get("", counting(&calls, "v1")).await;
        assert!(matches!(result, Err(CacheError::InvalidKey(_))));
        assert!(matches!(
            cache.set("", "x".to_string()),
            Err(CacheError::InvalidKey(_))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_fetcher_is_reported() {
        let cache: SwrCache<String> = SwrCache::new(TTL);

        let result = cache
            .get("cart", || async {
                if true {
                    panic!("fetcher bug");
                }
                Ok::<String, CacheError>(String::new())
            })
            .await;

        assert!(matches!(result, Err(CacheError::Internal(_))));
        assert_eq!(cache.in_flight(), 0);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_report_freshness() {
        let cache = SwrCache::new(TTL);
        cache.set("b", 1).unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;
        cache.set("a", 2).unwrap();

        let keys = cache.keys();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].key, "a");
        assert_eq!(keys[0].freshness, Freshness::Fresh);
        assert_eq!(keys[1].key, "b");
        assert_eq!(keys[1].freshness, Freshness::Stale);
        assert_eq!(keys[1].age_ms, 61_000);
        assert!(!keys[1].in_flight);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clones_share_state() {
        let cache = SwrCache::default();
        let other = cache.clone();

        cache.set("cart", 1).unwrap();
        assert_eq!(other.peek("cart"), Some(1));
        assert_eq!(other.default_ttl(), DEFAULT_TTL);
    }
}
