use crate::cache::{CacheKey, CacheValue};
use crate::model::{NewPost, Post, PostPatch, PostsPage};
use crate::mutation::{next_post_id, MutationCoordinator, MutationError};

impl MutationCoordinator {
    /// Creates a post, showing it at the head of the list under `key`
    /// immediately with a temporary negative id.
    pub async fn create_post(&self, key: &CacheKey, new_post: NewPost) -> Result<Post, MutationError> {
        new_post.validate().map_err(MutationError::Validation)?;
        ensure_post_list(key)?;

        let _guard = self.locks.acquire(key).await;
        let temp_id = next_post_id();
        let speculative = Post::speculative(temp_id, &new_post);

        let snapshot = self.pre_commit(key, |current| {
            let mut page = posts_or_empty(current);
            page.prepend(speculative.clone());
            CacheValue::Posts(page)
        });
        tracing::debug!(key = %key, temp_id, "Speculative post written");

        match self.api.create_post(&new_post).await {
            Ok(server) => {
                let confirmed = Post::confirmed(server, &speculative);
                let replaced = self.reconcile(key, |value| match value {
                    CacheValue::Posts(page) => page.replace_provisional(temp_id, confirmed.clone()),
                    _ => false,
                });
                if !replaced {
                    tracing::debug!(key = %key, temp_id, "Placeholder gone, invalidating instead");
                    self.cache.invalidate(key);
                }
                tracing::info!(key = %key, temp_id, id = confirmed.id, "Post created");
                Ok(confirmed)
            }
            Err(err) => {
                self.rollback(snapshot, "create_post", &err);
                Err(err.into())
            }
        }
    }

    /// Updates the changed fields of post `id` in place, then invalidates
    /// post lists so server-derived fields are picked up.
    pub async fn update_post(
        &self,
        key: &CacheKey,
        id: i64,
        patch: PostPatch,
    ) -> Result<Post, MutationError> {
        patch.validate().map_err(MutationError::Validation)?;
        ensure_post_list(key)?;
        ensure_confirmed_post(id)?;

        let _guard = self.locks.acquire(key).await;
        self.ensure_post_cached(key, id)?;

        let snapshot = self.pre_commit(key, |current| {
            let mut page = posts_or_empty(current);
            page.patch(id, &patch);
            CacheValue::Posts(page)
        });

        match self.api.update_post(id, &patch).await {
            Ok(server) => {
                self.invalidate_posts(key);
                tracing::info!(key = %key, id, "Post updated");
                Ok(server)
            }
            Err(err) => {
                self.rollback(snapshot, "update_post", &err);
                Err(err.into())
            }
        }
    }

    /// Removes post `id` from the list under `key` right away.
    pub async fn delete_post(&self, key: &CacheKey, id: i64) -> Result<(), MutationError> {
        ensure_post_list(key)?;
        ensure_confirmed_post(id)?;

        let _guard = self.locks.acquire(key).await;
        self.ensure_post_cached(key, id)?;

        let snapshot = self.pre_commit(key, |current| {
            let mut page = posts_or_empty(current);
            page.remove(id);
            CacheValue::Posts(page)
        });

        match self.api.delete_post(id).await {
            Ok(()) => {
                self.invalidate_posts(key);
                tracing::info!(key = %key, id, "Post deleted");
                Ok(())
            }
            Err(err) => {
                self.rollback(snapshot, "delete_post", &err);
                Err(err.into())
            }
        }
    }

    fn ensure_post_cached(&self, key: &CacheKey, id: i64) -> Result<(), MutationError> {
        let cached = self
            .cache
            .read(key)
            .and_then(CacheValue::into_posts)
            .is_some_and(|page| page.contains(id));
        if cached {
            Ok(())
        } else {
            Err(MutationError::Validation(format!("post {id} is not listed under {key}")))
        }
    }

    /// Invalidates `key` and every other post list that may show the post.
    fn invalidate_posts(&self, key: &CacheKey) {
        self.cache.invalidate(key);
        self.cache
            .invalidate_where(|other| other != key && other.is_post_list());
    }
}

fn ensure_post_list(key: &CacheKey) -> Result<(), MutationError> {
    if key.is_post_list() {
        Ok(())
    } else {
        Err(MutationError::Validation(format!("{key} does not hold posts")))
    }
}

fn ensure_confirmed_post(id: i64) -> Result<(), MutationError> {
    if id > 0 {
        Ok(())
    } else {
        Err(MutationError::Validation(format!(
            "post {id} has not been confirmed by the server"
        )))
    }
}

fn posts_or_empty(current: Option<&CacheValue>) -> PostsPage {
    current
        .and_then(CacheValue::as_posts)
        .cloned()
        .unwrap_or_default()
}
