//! Acquisition state machine over the replay store.
//!
//! Every upstream request follows the same flow:
//!
//! 1. stored snapshot exists: replay it, never call upstream
//! 2. otherwise fetch upstream, then store the snapshot if the key is still
//!    absent (a failed store write is logged, never propagated)
//! 3. on a fetch failure, re-check the store once; a snapshot that appeared
//!    in the meantime is replayed as a fallback
//! 4. a corrupt stored snapshot is a terminal error, never a trigger to
//!    refetch
//!
//! The outcome carries its [`Origin`] so callers and logs can distinguish a
//! replay from a live fetch.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use time::Date;
use tracing::{debug, info, warn};

use folio_store::{ReplayStore, StoreKey};

use crate::error::DataError;
use crate::provider::{FactorProvider, FilingProvider, PriceProvider};
use crate::{FactorSeries, PriceSeries};

/// Where an acquired value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Replayed from the store without contacting upstream.
    Replay,
    /// Fetched live from the provider.
    Upstream,
    /// Upstream failed but a snapshot had appeared in the store.
    Fallback,
}

/// An acquired value plus its provenance.
#[derive(Debug, Clone)]
pub struct Acquired<T> {
    pub value: T,
    pub origin: Origin,
}

/// Runs the acquisition flow for one keyed request.
pub fn acquire<T, F>(store: &ReplayStore, key: &StoreKey, fetch: F) -> Result<Acquired<T>, DataError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Result<T, DataError>,
{
    if store.exists(key) {
        let value = read_snapshot(store, key)?;
        debug!(key = key.canonical(), "replaying stored snapshot");
        return Ok(Acquired {
            value,
            origin: Origin::Replay,
        });
    }

    info!(key = key.canonical(), "fetching from upstream");
    match fetch() {
        Ok(value) => {
            store_snapshot(store, key, &value);
            Ok(Acquired {
                value,
                origin: Origin::Upstream,
            })
        }
        Err(fetch_error) => {
            if store.exists(key) {
                warn!(
                    key = key.canonical(),
                    error = %fetch_error,
                    "upstream fetch failed, replaying stored snapshot"
                );
                let value = read_snapshot(store, key)?;
                return Ok(Acquired {
                    value,
                    origin: Origin::Fallback,
                });
            }
            Err(fetch_error)
        }
    }
}

/// Persists a freshly fetched value. Store failures are logged and swallowed:
/// the caller already holds the data, and a broken disk must not turn a
/// successful fetch into an error.
fn store_snapshot<T: Serialize>(store: &ReplayStore, key: &StoreKey, value: &T) {
    let bytes = match serde_json::to_vec(value) {
        Ok(bytes) => bytes,
        Err(error) => {
            warn!(key = key.canonical(), %error, "failed to serialize snapshot");
            return;
        }
    };

    match store.write_if_absent(key, &bytes) {
        Ok(true) => debug!(key = key.canonical(), "stored snapshot"),
        Ok(false) => debug!(key = key.canonical(), "snapshot already present"),
        Err(error) => warn!(key = key.canonical(), %error, "failed to store snapshot"),
    }
}

fn read_snapshot<T: DeserializeOwned>(
    store: &ReplayStore,
    key: &StoreKey,
) -> Result<T, DataError> {
    let bytes = store.read(key)?;
    serde_json::from_slice(&bytes).map_err(|error| DataError::BadInput {
        reason: format!("stored snapshot is corrupt: {error}"),
        context: key.canonical().to_owned(),
    })
}

/// Request-scoped memo so one logical fetch runs at most once per request.
///
/// Construct one per request and pass it explicitly to every acquisition
/// call; there is no ambient per-thread state to leak across requests.
#[derive(Default)]
pub struct RequestCache {
    entries: Mutex<HashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl RequestCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached outcome for `key` or runs `operation` and caches
    /// its success. Failures are not cached; a retry within the same request
    /// runs the operation again.
    pub fn get_or_acquire<T, F>(
        &self,
        key: &StoreKey,
        operation: F,
    ) -> Result<Acquired<T>, DataError>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Result<Acquired<T>, DataError>,
    {
        {
            let entries = self
                .entries
                .lock()
                .expect("request cache should not be poisoned");
            if let Some(entry) = entries.get(key.canonical()) {
                if let Some(hit) = entry.downcast_ref::<Acquired<T>>() {
                    debug!(key = key.canonical(), "request cache hit");
                    return Ok(hit.clone());
                }
            }
        }

        let acquired = operation()?;
        let mut entries = self
            .entries
            .lock()
            .expect("request cache should not be poisoned");
        entries.insert(key.canonical().to_owned(), Arc::new(acquired.clone()));
        Ok(acquired)
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .expect("request cache should not be poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn price_series_key(source: &str, ticker: &str, start: Date, end: Date) -> StoreKey {
    StoreKey::new(
        source,
        &[
            ("ticker", ticker.to_uppercase().as_str()),
            ("start", start.to_string().as_str()),
            ("end", end.to_string().as_str()),
        ],
    )
}

pub fn factor_series_key(source: &str, dataset: &str, start: Date, end: Date) -> StoreKey {
    StoreKey::new(
        source,
        &[
            ("dataset", dataset),
            ("start", start.to_string().as_str()),
            ("end", end.to_string().as_str()),
        ],
    )
}

pub fn submissions_key(source: &str, registrant_id: &str) -> StoreKey {
    StoreKey::new(source, &[("registrant", registrant_id)])
}

/// Acquires a price series through the cache, store, and provider layers.
pub fn acquire_price_series(
    cache: &RequestCache,
    store: &ReplayStore,
    provider: &dyn PriceProvider,
    ticker: &str,
    start: Date,
    end: Date,
) -> Result<Acquired<PriceSeries>, DataError> {
    let key = price_series_key(provider.source(), ticker, start, end);
    cache.get_or_acquire(&key, || {
        acquire(store, &key, || {
            provider.fetch_price_series(ticker, start, end)
        })
    })
}

pub fn acquire_factor_series(
    cache: &RequestCache,
    store: &ReplayStore,
    provider: &dyn FactorProvider,
    start: Date,
    end: Date,
) -> Result<Acquired<FactorSeries>, DataError> {
    let key = factor_series_key(provider.source(), provider.dataset(), start, end);
    cache.get_or_acquire(&key, || {
        acquire(store, &key, || provider.fetch_factor_series(start, end))
    })
}

pub fn acquire_submissions(
    cache: &RequestCache,
    store: &ReplayStore,
    provider: &dyn FilingProvider,
    registrant_id: &str,
) -> Result<Acquired<Value>, DataError> {
    let key = submissions_key(provider.source(), registrant_id);
    cache.get_or_acquire(&key, || {
        acquire(store, &key, || provider.fetch_submissions(registrant_id))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::tempdir;

    fn store() -> (tempfile::TempDir, ReplayStore) {
        let temp = tempdir().expect("tempdir");
        let store = ReplayStore::open(temp.path().join("store")).expect("open");
        (temp, store)
    }

    fn key() -> StoreKey {
        StoreKey::new("test", &[("ticker", "AAPL")])
    }

    #[test]
    fn second_acquisition_replays_without_fetching() {
        let (_temp, store) = store();
        let calls = Cell::new(0_usize);
        let fetch = || {
            calls.set(calls.get() + 1);
            Ok(String::from("payload"))
        };

        let first = acquire(&store, &key(), fetch).expect("first");
        assert_eq!(first.origin, Origin::Upstream);

        let second = acquire(&store, &key(), || {
            calls.set(calls.get() + 1);
            Ok(String::from("should not run"))
        })
        .expect("second");
        assert_eq!(second.origin, Origin::Replay);
        assert_eq!(second.value, "payload");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn corrupt_snapshot_is_terminal_and_never_refetched() {
        let (_temp, store) = store();
        store.write(&key(), b"not json at all").expect("write garbage");

        let calls = Cell::new(0_usize);
        let error = acquire::<String, _>(&store, &key(), || {
            calls.set(calls.get() + 1);
            Ok(String::from("fresh"))
        })
        .expect_err("corrupt must fail");

        assert!(matches!(error, DataError::BadInput { .. }));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn fallback_replays_a_snapshot_that_appeared_during_the_fetch() {
        let (_temp, store) = store();
        // A concurrent writer lands the snapshot while our fetch fails.
        let result = acquire::<String, _>(&store, &key(), || {
            let bytes = serde_json::to_vec("from elsewhere").expect("serialize");
            store.write(&key(), &bytes).expect("concurrent write");
            Err(DataError::unavailable("test", "connection reset"))
        })
        .expect("fallback");

        assert_eq!(result.origin, Origin::Fallback);
        assert_eq!(result.value, "from elsewhere");
    }

    #[test]
    fn fetch_failure_without_snapshot_propagates() {
        let (_temp, store) = store();
        let error = acquire::<String, _>(&store, &key(), || {
            Err(DataError::not_found("price data", "ticker=MISSING"))
        })
        .expect_err("should propagate");
        assert!(matches!(error, DataError::NotFound { .. }));
    }

    #[test]
    fn request_cache_runs_one_logical_fetch_once() {
        let (_temp, store) = store();
        let cache = RequestCache::new();
        let calls = std::sync::atomic::AtomicUsize::new(0);

        for _ in 0..3 {
            let acquired = cache
                .get_or_acquire(&key(), || {
                    calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    acquire(&store, &key(), || Ok(String::from("payload")))
                })
                .expect("acquire");
            assert_eq!(acquired.value, "payload");
        }

        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn request_cache_does_not_cache_failures() {
        let cache = RequestCache::new();
        let error = cache
            .get_or_acquire::<String, _>(&key(), || {
                Err(DataError::unavailable("test", "down"))
            })
            .expect_err("failure");
        assert!(matches!(error, DataError::Unavailable { .. }));
        assert!(cache.is_empty());
    }
}
