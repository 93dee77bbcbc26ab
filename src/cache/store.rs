//! In-memory query cache with request de-duplication.
//!
//! Each key owns an [`Entry`] holding the last known value, fetch status,
//! a staleness flag and at most one in-flight fetch. Callers asking for a key
//! that is already being fetched join the existing request instead of issuing
//! a new one.
//!
//! Every overwrite bumps the entry's generation. A fetch records the
//! generation it started at and only stores its result if nothing was
//! written in between, so a slow response can never clobber a newer write.
//!
//! Entries are not evicted on their own; [`QueryCache::prune`] drops the
//! unobserved stale ones.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio::task::AbortHandle;

use crate::api::{ApiError, ResourceApi};
use crate::cache::{CacheError, CacheKey, CacheValue};

/// Result handed to every caller of a fetch.
pub type FetchOutcome = Result<CacheValue, CacheError>;

const CHANGE_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Fetching,
    Success,
    Error(String),
}

struct InFlight {
    id: u64,
    done: watch::Receiver<Option<FetchOutcome>>,
    abort: AbortHandle,
}

#[derive(Default)]
struct Entry {
    value: Option<CacheValue>,
    status: FetchStatus,
    stale: bool,
    generation: u64,
    in_flight: Option<InFlight>,
    observers: usize,
}

impl Entry {
    fn settled_status(&self) -> FetchStatus {
        if self.value.is_some() {
            FetchStatus::Success
        } else {
            FetchStatus::Idle
        }
    }
}

/// Shared handle to the cache. Clones refer to the same storage.
///
/// Methods that may start a fetch (`fetch`, `get_or_fetch`, `invalidate`,
/// `subscribe`) must be called from within a Tokio runtime.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    api: Arc<dyn ResourceApi>,
    entries: Mutex<HashMap<CacheKey, Entry>>,
    changes: broadcast::Sender<CacheKey>,
    next_fetch_id: AtomicU64,
}

impl QueryCache {
    pub fn new(api: Arc<dyn ResourceApi>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(CacheInner {
                api,
                entries: Mutex::new(HashMap::new()),
                changes,
                next_fetch_id: AtomicU64::new(1),
            }),
        }
    }

    /// Last known value for `key`, speculative or confirmed.
    pub fn read(&self, key: &CacheKey) -> Option<CacheValue> {
        self.inner
            .entries
            .lock()
            .get(key)
            .and_then(|entry| entry.value.clone())
    }

    pub fn status(&self, key: &CacheKey) -> FetchStatus {
        self.inner
            .entries
            .lock()
            .get(key)
            .map(|entry| entry.status.clone())
            .unwrap_or_default()
    }

    /// Absent keys count as stale.
    pub fn is_stale(&self, key: &CacheKey) -> bool {
        self.inner
            .entries
            .lock()
            .get(key)
            .map_or(true, |entry| entry.stale || entry.value.is_none())
    }

    pub fn is_fetching(&self, key: &CacheKey) -> bool {
        self.inner
            .entries
            .lock()
            .get(key)
            .is_some_and(|entry| entry.in_flight.is_some())
    }

    pub fn observer_count(&self, key: &CacheKey) -> usize {
        self.inner
            .entries
            .lock()
            .get(key)
            .map_or(0, |entry| entry.observers)
    }

    /// Unconditionally overwrites the value for `key`.
    ///
    /// A fetch that is still in flight for this key keeps running but its
    /// result will not be stored, so a `read` right after `write` always
    /// returns the written value.
    pub fn write(&self, key: &CacheKey, value: CacheValue) {
        {
            let mut entries = self.inner.entries.lock();
            let entry = entries.entry(key.clone()).or_default();
            entry.generation += 1;
            entry.value = Some(value);
            entry.stale = false;
            if entry.in_flight.is_none() {
                entry.status = FetchStatus::Success;
            }
        }
        self.notify(key);
    }

    /// Drops the value for `key`; the next read through
    /// [`get_or_fetch`](Self::get_or_fetch) refetches it.
    pub fn remove(&self, key: &CacheKey) {
        let removed = {
            let mut entries = self.inner.entries.lock();
            match entries.get_mut(key) {
                Some(entry) => {
                    entry.generation += 1;
                    entry.value = None;
                    entry.stale = false;
                    if entry.in_flight.is_none() {
                        entry.status = FetchStatus::Idle;
                    }
                    true
                }
                None => false,
            }
        };
        if removed {
            self.notify(key);
        }
    }

    /// Marks `key` stale. If anyone is subscribed to it and no fetch is
    /// already running, a background refetch starts.
    pub fn invalidate(&self, key: &CacheKey) {
        let mut entries = self.inner.entries.lock();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        self.mark_stale(key, entry);
    }

    /// Invalidates every key matching `predicate`; returns how many matched.
    pub fn invalidate_where(&self, predicate: impl Fn(&CacheKey) -> bool) -> usize {
        let mut entries = self.inner.entries.lock();
        let mut matched = 0;
        for (key, entry) in entries.iter_mut() {
            if predicate(key) {
                self.mark_stale(key, entry);
                matched += 1;
            }
        }
        matched
    }

    /// Aborts the in-flight fetch for `key`, if any. Callers waiting on it
    /// receive [`CacheError::Cancelled`] and its response is never stored.
    pub fn cancel_in_flight(&self, key: &CacheKey) -> bool {
        let mut entries = self.inner.entries.lock();
        let Some(entry) = entries.get_mut(key) else {
            return false;
        };
        let Some(in_flight) = entry.in_flight.take() else {
            return false;
        };
        in_flight.abort.abort();
        entry.generation += 1;
        entry.status = entry.settled_status();
        tracing::debug!(key = %key, fetch_id = in_flight.id, "Cancelled in-flight fetch");
        true
    }

    /// Fetches `key` from the remote API, joining an in-flight request for
    /// the same key when there is one.
    pub async fn fetch(&self, key: &CacheKey) -> FetchOutcome {
        let mut done = {
            let mut entries = self.inner.entries.lock();
            let entry = entries.entry(key.clone()).or_default();
            match &entry.in_flight {
                Some(in_flight) => {
                    tracing::trace!(key = %key, fetch_id = in_flight.id, "Joining in-flight fetch");
                    in_flight.done.clone()
                }
                None => self.start_fetch(key, entry),
            }
        };

        let outcome = done
            .wait_for(Option::is_some)
            .await
            .ok()
            .and_then(|outcome| outcome.clone());
        // The sender only goes away without a value when the task was aborted
        outcome.unwrap_or_else(|| {
            Err(CacheError::Cancelled {
                key: key.to_string(),
            })
        })
    }

    /// Returns the cached value if present and fresh, otherwise fetches.
    pub async fn get_or_fetch(&self, key: &CacheKey) -> FetchOutcome {
        let fresh = {
            let entries = self.inner.entries.lock();
            entries
                .get(key)
                .filter(|entry| !entry.stale)
                .and_then(|entry| entry.value.clone())
        };
        match fresh {
            Some(value) => Ok(value),
            None => self.fetch(key).await,
        }
    }

    /// Registers an observer for `key`. While at least one subscription is
    /// alive, invalidating the key triggers a background refetch. A missing
    /// or stale value is fetched right away.
    pub fn subscribe(&self, key: &CacheKey) -> Subscription {
        {
            let mut entries = self.inner.entries.lock();
            let entry = entries.entry(key.clone()).or_default();
            entry.observers += 1;
            if (entry.value.is_none() || entry.stale) && entry.in_flight.is_none() {
                self.start_fetch(key, entry);
            }
        }
        Subscription {
            cache: self.clone(),
            key: key.clone(),
        }
    }

    /// Drops entries nobody needs anymore: unobserved, not fetching, and
    /// either stale or empty. Returns how many were dropped.
    pub fn prune(&self) -> usize {
        let mut entries = self.inner.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| {
            entry.observers > 0
                || entry.in_flight.is_some()
                || (!entry.stale && entry.value.is_some())
        });
        let pruned = before - entries.len();
        if pruned > 0 {
            tracing::debug!(pruned, remaining = entries.len(), "Pruned cache entries");
        }
        pruned
    }

    pub fn entry_count(&self) -> usize {
        self.inner.entries.lock().len()
    }

    /// Stream of keys whose stored value changed.
    pub fn changes(&self) -> broadcast::Receiver<CacheKey> {
        self.inner.changes.subscribe()
    }

    fn mark_stale(&self, key: &CacheKey, entry: &mut Entry) {
        entry.stale = true;
        if entry.observers > 0 && entry.in_flight.is_none() {
            tracing::debug!(key = %key, observers = entry.observers, "Invalidated, refetching");
            self.start_fetch(key, entry);
        } else {
            tracing::debug!(key = %key, "Invalidated");
        }
    }

    /// Spawns the fetch task. Must be called with the entry map locked.
    fn start_fetch(
        &self,
        key: &CacheKey,
        entry: &mut Entry,
    ) -> watch::Receiver<Option<FetchOutcome>> {
        let (tx, rx) = watch::channel(None);
        let id = self.inner.next_fetch_id.fetch_add(1, Ordering::Relaxed);
        let generation = entry.generation;

        let cache = self.clone();
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let result = task_key.fetch_from(cache.inner.api.as_ref()).await;
            let outcome = cache.complete_fetch(&task_key, id, generation, result);
            let _ = tx.send(Some(outcome));
        });

        tracing::debug!(key = %key, fetch_id = id, "Fetch started");
        entry.in_flight = Some(InFlight {
            id,
            done: rx.clone(),
            abort: handle.abort_handle(),
        });
        entry.status = FetchStatus::Fetching;
        rx
    }

    fn complete_fetch(
        &self,
        key: &CacheKey,
        id: u64,
        generation: u64,
        result: Result<CacheValue, ApiError>,
    ) -> FetchOutcome {
        let mut stored = false;
        let outcome = {
            let mut entries = self.inner.entries.lock();
            let entry = entries.entry(key.clone()).or_default();
            if entry.in_flight.as_ref().is_some_and(|f| f.id == id) {
                entry.in_flight = None;
                entry.status = entry.settled_status();
            }
            let current = entry.generation == generation;

            match result {
                Ok(value) if current => {
                    entry.value = Some(value.clone());
                    entry.stale = false;
                    entry.status = FetchStatus::Success;
                    stored = true;
                    Ok(value)
                }
                Ok(value) => {
                    tracing::debug!(
                        key = %key,
                        fetch_id = id,
                        "Discarding fetch result superseded by a newer write"
                    );
                    Ok(entry.value.clone().unwrap_or(value))
                }
                Err(err) => {
                    let message = err.to_string();
                    tracing::warn!(key = %key, fetch_id = id, error = %message, "Fetch failed");
                    if current {
                        entry.status = FetchStatus::Error(message.clone());
                    }
                    Err(CacheError::Fetch {
                        key: key.to_string(),
                        message,
                    })
                }
            }
        };
        if stored {
            self.notify(key);
        }
        outcome
    }

    fn notify(&self, key: &CacheKey) {
        // No receivers is fine
        let _ = self.inner.changes.send(key.clone());
    }
}

/// Observer registration returned by [`QueryCache::subscribe`].
/// Dropping it unregisters the observer.
pub struct Subscription {
    cache: QueryCache,
    key: CacheKey,
}

impl Subscription {
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    pub fn current(&self) -> Option<CacheValue> {
        self.cache.read(&self.key)
    }

    /// Waits for a usable value, fetching if necessary.
    pub async fn ready(&self) -> FetchOutcome {
        self.cache.get_or_fetch(&self.key).await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut entries = self.cache.inner.entries.lock();
        if let Some(entry) = entries.get_mut(&self.key) {
            entry.observers = entry.observers.saturating_sub(1);
        }
    }
}
