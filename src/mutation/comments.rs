use crate::cache::{CacheKey, CacheValue};
use crate::model::{Comment, CommentId, CommentPatch, CommentsPage, NewComment};
use crate::mutation::{next_comment_token, MutationCoordinator, MutationError};

impl MutationCoordinator {
    /// Adds a comment to its post, visible immediately under a `temp-` id.
    pub async fn add_comment(&self, new_comment: NewComment) -> Result<Comment, MutationError> {
        new_comment.validate().map_err(MutationError::Validation)?;

        let key = CacheKey::Comments {
            post_id: new_comment.post_id,
        };
        let _guard = self.locks.acquire(&key).await;
        let temp_id = next_comment_token();
        let speculative = Comment::speculative(temp_id.clone(), &new_comment);

        let snapshot = self.pre_commit(&key, |current| {
            let mut page = comments_or_empty(current);
            page.append(speculative.clone());
            CacheValue::Comments(page)
        });
        tracing::debug!(key = %key, temp_id = %temp_id, "Speculative comment written");

        match self.api.create_comment(&new_comment).await {
            Ok(server) => {
                let confirmed = Comment::confirmed(server, &speculative);
                let replaced = self.reconcile(&key, |value| match value {
                    CacheValue::Comments(page) => {
                        page.replace_provisional(&temp_id, confirmed.clone())
                    }
                    _ => false,
                });
                if !replaced {
                    tracing::debug!(key = %key, temp_id = %temp_id, "Placeholder gone, invalidating instead");
                    self.cache.invalidate(&key);
                }
                tracing::info!(key = %key, temp_id = %temp_id, id = %confirmed.id, "Comment added");
                Ok(confirmed)
            }
            Err(err) => {
                self.rollback(snapshot, "add_comment", &err);
                Err(err.into())
            }
        }
    }

    /// Replaces the body of a confirmed comment.
    pub async fn update_comment(
        &self,
        post_id: i64,
        id: &CommentId,
        body: String,
    ) -> Result<Comment, MutationError> {
        if body.trim().is_empty() {
            return Err(MutationError::Validation(
                "comment body must not be empty".to_string(),
            ));
        }
        let server_id = confirmed_comment(id)?;
        let key = comments_key(post_id)?;

        let _guard = self.locks.acquire(&key).await;
        self.ensure_comment_cached(&key, id)?;

        let snapshot = self.pre_commit(&key, |current| {
            let mut page = comments_or_empty(current);
            if let Some(comment) = page.find_mut(id) {
                comment.body = body.clone();
            }
            CacheValue::Comments(page)
        });

        match self.api.update_comment(server_id, &CommentPatch { body }).await {
            Ok(server) => {
                self.cache.invalidate(&key);
                tracing::info!(key = %key, id = server_id, "Comment updated");
                Ok(server)
            }
            Err(err) => {
                self.rollback(snapshot, "update_comment", &err);
                Err(err.into())
            }
        }
    }

    pub async fn delete_comment(&self, post_id: i64, id: &CommentId) -> Result<(), MutationError> {
        let server_id = confirmed_comment(id)?;
        let key = comments_key(post_id)?;

        let _guard = self.locks.acquire(&key).await;
        self.ensure_comment_cached(&key, id)?;

        let snapshot = self.pre_commit(&key, |current| {
            let mut page = comments_or_empty(current);
            page.remove(id);
            CacheValue::Comments(page)
        });

        match self.api.delete_comment(server_id).await {
            Ok(()) => {
                self.cache.invalidate(&key);
                tracing::info!(key = %key, id = server_id, "Comment deleted");
                Ok(())
            }
            Err(err) => {
                self.rollback(snapshot, "delete_comment", &err);
                Err(err.into())
            }
        }
    }

    /// Sets the like count of a comment.
    ///
    /// The remote API does not persist likes, so the speculative write is
    /// the final state: nothing is dispatched and nothing is reconciled.
    pub async fn like_comment(
        &self,
        post_id: i64,
        id: &CommentId,
        likes: u64,
    ) -> Result<Comment, MutationError> {
        self.set_likes(post_id, id, |_| likes).await
    }

    /// Adds `delta` to the like count as cached when the key lock is taken,
    /// so concurrent likes never overwrite each other.
    pub async fn like_comment_by(
        &self,
        post_id: i64,
        id: &CommentId,
        delta: u64,
    ) -> Result<Comment, MutationError> {
        self.set_likes(post_id, id, |current| current.saturating_add(delta))
            .await
    }

    async fn set_likes(
        &self,
        post_id: i64,
        id: &CommentId,
        likes: impl FnOnce(u64) -> u64,
    ) -> Result<Comment, MutationError> {
        let key = comments_key(post_id)?;

        let _guard = self.locks.acquire(&key).await;
        self.ensure_comment_cached(&key, id)?;

        let mut liked = None;
        self.pre_commit(&key, |current| {
            let mut page = comments_or_empty(current);
            if let Some(comment) = page.find_mut(id) {
                comment.likes = likes(comment.likes);
                liked = Some(comment.clone());
            }
            CacheValue::Comments(page)
        });

        let liked =
            liked.ok_or_else(|| MutationError::Validation(format!("comment {id} is not cached")))?;
        tracing::debug!(key = %key, id = %id, likes = liked.likes, "Comment liked locally");
        Ok(liked)
    }

    fn ensure_comment_cached(&self, key: &CacheKey, id: &CommentId) -> Result<(), MutationError> {
        let cached = self
            .cache
            .read(key)
            .and_then(CacheValue::into_comments)
            .is_some_and(|page| page.find(id).is_some());
        if cached {
            Ok(())
        } else {
            Err(MutationError::Validation(format!("comment {id} is not listed under {key}")))
        }
    }
}

fn comments_key(post_id: i64) -> Result<CacheKey, MutationError> {
    if post_id > 0 {
        Ok(CacheKey::Comments { post_id })
    } else {
        Err(MutationError::Validation(format!(
            "post id must be positive, got {post_id}"
        )))
    }
}

fn confirmed_comment(id: &CommentId) -> Result<i64, MutationError> {
    id.server().ok_or_else(|| {
        MutationError::Validation(format!("comment {id} has not been confirmed by the server"))
    })
}

fn comments_or_empty(current: Option<&CacheValue>) -> CommentsPage {
    current
        .and_then(CacheValue::as_comments)
        .cloned()
        .unwrap_or_default()
}
