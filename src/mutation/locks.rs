use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::cache::CacheKey;

/// One async lock per cache key.
#[derive(Clone, Default)]
pub(crate) struct KeyLocks {
    locks: Arc<Mutex<HashMap<CacheKey, Arc<AsyncMutex<()>>>>>,
}

impl KeyLocks {
    /// Waits until no other mutation holds `key`.
    pub(crate) async fn acquire(&self, key: &CacheKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock();
            // Idle locks are only referenced by the map
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(key.clone()).or_default())
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_key_is_exclusive() {
        let locks = KeyLocks::default();
        let key = CacheKey::Comments { post_id: 1 };
        let guard = locks.acquire(&key).await;

        let contender = {
            let locks = locks.clone();
            let key = key.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(&key).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn different_keys_do_not_block() {
        let locks = KeyLocks::default();
        let _first = locks.acquire(&CacheKey::Comments { post_id: 1 }).await;
        tokio::time::timeout(
            Duration::from_secs(1),
            locks.acquire(&CacheKey::Comments { post_id: 2 }),
        )
        .await
        .unwrap();
    }
}
