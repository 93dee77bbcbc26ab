//! Optimistic mutation coordinator.
//!
//! Every write runs the same lifecycle:
//!
//! ```text
//! validate ──→ lock key ──→ pre-commit ──→ dispatch ──┬─→ reconcile / invalidate
//!                            (cancel, snapshot,        │
//!                             speculative write)       └─→ rollback to snapshot
//! ```
//!
//! Validation failures never touch the cache. Pre-commit finishes before the
//! network call starts. Mutations addressing the same cache key are
//! serialized for their whole lifecycle, so a rollback can never erase
//! another mutation's speculative state.

mod comments;
mod error;
mod locks;
mod posts;
mod temp_id;

use std::sync::Arc;

pub use error::MutationError;
pub use temp_id::{next_comment_token, next_post_id};

use crate::api::{ApiError, ResourceApi};
use crate::cache::{CacheKey, CacheValue, QueryCache};
use locks::KeyLocks;

/// Runs create/update/delete/like operations against the cache and the
/// remote API.
#[derive(Clone)]
pub struct MutationCoordinator {
    api: Arc<dyn ResourceApi>,
    cache: QueryCache,
    locks: KeyLocks,
}

/// Value of a cache key captured right before a speculative write.
struct Snapshot {
    key: CacheKey,
    previous: Option<CacheValue>,
}

impl MutationCoordinator {
    pub fn new(api: Arc<dyn ResourceApi>, cache: QueryCache) -> Self {
        Self {
            api,
            cache,
            locks: KeyLocks::default(),
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Cancels competing fetches, snapshots the key and writes the
    /// speculative value built from the current one.
    fn pre_commit(
        &self,
        key: &CacheKey,
        speculative: impl FnOnce(Option<&CacheValue>) -> CacheValue,
    ) -> Snapshot {
        self.cache.cancel_in_flight(key);
        let previous = self.cache.read(key);
        let value = speculative(previous.as_ref());
        self.cache.write(key, value);
        Snapshot {
            key: key.clone(),
            previous,
        }
    }

    /// Restores the snapshot exactly. An absent snapshot removes the value.
    fn rollback(&self, snapshot: Snapshot, operation: &'static str, err: &ApiError) {
        tracing::warn!(
            operation,
            key = %snapshot.key,
            error = %err,
            "Mutation failed, rolling back speculative state"
        );
        match snapshot.previous {
            Some(value) => self.cache.write(&snapshot.key, value),
            None => self.cache.remove(&snapshot.key),
        }
    }

    /// Applies `merge` to the current value of `key` and writes the result
    /// if `merge` reports a change.
    fn reconcile(&self, key: &CacheKey, merge: impl FnOnce(&mut CacheValue) -> bool) -> bool {
        let Some(mut value) = self.cache.read(key) else {
            return false;
        };
        if !merge(&mut value) {
            return false;
        }
        self.cache.write(key, value);
        true
    }
}
