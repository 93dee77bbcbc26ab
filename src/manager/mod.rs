//! The posts admin facade.
//!
//! [`PostsManager`] ties the application state, the URL synchronizer, the
//! query cache and the mutation coordinator together the way an admin view
//! uses them: filter changes go through the reducer and out to the address
//! bar, list loads pick the authoritative source, and writes target the list
//! currently on screen.

mod view;

use std::sync::Arc;

pub use view::PostListView;

use crate::api::ResourceApi;
use crate::cache::{CacheError, CacheKey, QueryCache, Subscription};
use crate::error::Result;
use crate::model::{
    enrich_with_authors, sort_by_reactions, Comment, CommentId, CommentsPage, NewComment, NewPost,
    Post, PostPatch, SortBy, Tag, User,
};
use crate::mutation::{MutationCoordinator, MutationError};
use crate::state::{AppStore, Dialog, DialogIntent, FilterIntent, FilterState};
use crate::sync::{AddressBar, SyncPhase, UrlSync};

pub struct PostsManager<A: AddressBar> {
    cache: QueryCache,
    mutations: MutationCoordinator,
    store: AppStore,
    sync: UrlSync,
    address_bar: A,
    user_select: String,
    list_subscription: Option<Subscription>,
    comments_subscription: Option<Subscription>,
}

impl<A: AddressBar> PostsManager<A> {
    /// `user_select` is the field list requested for the author directory.
    pub fn new(api: Arc<dyn ResourceApi>, address_bar: A, user_select: impl Into<String>) -> Self {
        let cache = QueryCache::new(Arc::clone(&api));
        let mutations = MutationCoordinator::new(api, cache.clone());
        Self {
            cache,
            mutations,
            store: AppStore::default(),
            sync: UrlSync::new(),
            address_bar,
            user_select: user_select.into(),
            list_subscription: None,
            comments_subscription: None,
        }
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn address_bar(&self) -> &A {
        &self.address_bar
    }

    pub fn address_bar_mut(&mut self) -> &mut A {
        &mut self.address_bar
    }

    pub fn sync_phase(&self) -> SyncPhase {
        self.sync.phase()
    }

    /// Reads the initial URL into the filters and starts syncing.
    pub fn mount(&mut self) -> FilterState {
        let query = self.address_bar.query();
        if let Some(state) = self.sync.begin(&query) {
            self.store.dispatch_filters(FilterIntent::Replace(state));
        }
        self.sync.settle();
        let filters = self.store.filters();
        tracing::info!(query = %query, key = %filters.cache_key(), "Posts manager mounted");
        filters
    }

    /// Applies a filter change and mirrors it to the address bar.
    /// Returns whether the filters changed.
    pub fn dispatch(&mut self, intent: FilterIntent) -> bool {
        let Some(filters) = self.store.dispatch_filters(intent) else {
            return false;
        };
        if let Some(query) = self.sync.on_state_changed(&filters) {
            self.address_bar.replace_query(&query);
        }
        true
    }

    /// Call after the address bar moved on its own (back/forward).
    /// Returns whether the filters changed.
    pub fn navigated(&mut self) -> bool {
        let query = self.address_bar.query();
        match self.sync.on_navigation(&query) {
            Some(state) => {
                tracing::debug!(query = %query, "Navigation, re-reading filters from URL");
                self.store
                    .dispatch_filters(FilterIntent::Replace(state))
                    .is_some()
            }
            None => false,
        }
    }

    /// Loads the authoritative list for the current filters.
    ///
    /// The list stays subscribed until the filters point elsewhere, so
    /// mutations that invalidate it trigger a background refetch.
    pub async fn load_posts(&mut self) -> Result<PostListView> {
        let filters = self.store.filters();
        let key = filters.cache_key();
        if self.list_subscription.as_ref().map(Subscription::key) != Some(&key) {
            self.list_subscription = Some(self.cache.subscribe(&key));
            self.cache.prune();
        }
        let users_key = CacheKey::UserDirectory {
            limit: 0,
            select: self.user_select.clone(),
        };

        let (page, users) = tokio::join!(
            self.cache.get_or_fetch(&key),
            self.cache.get_or_fetch(&users_key)
        );
        let page = page?.into_posts().ok_or_else(|| unexpected(&key))?;
        let users = users?.into_users().ok_or_else(|| unexpected(&users_key))?;

        let mut posts = enrich_with_authors(page.posts, &users.users);
        if filters.sort_by == SortBy::Reactions {
            sort_by_reactions(&mut posts, filters.order);
        }
        tracing::debug!(key = %key, count = posts.len(), total = page.total, "Post list loaded");

        Ok(PostListView {
            key,
            source: filters.source(),
            posts,
            total: page.total,
        })
    }

    pub async fn load_tags(&self) -> Result<Vec<Tag>> {
        let key = CacheKey::Tags;
        let value = self.cache.get_or_fetch(&key).await?;
        Ok(value.into_tags().ok_or_else(|| unexpected(&key))?)
    }

    /// Selects `post`, opens its detail dialog and loads its comments.
    pub async fn open_post_detail(&mut self, post: Post) -> Result<CommentsPage> {
        let post_id = post.id;
        self.store.select_post(Some(post));
        self.store.dispatch_dialog(DialogIntent::Open(Dialog::PostDetail));
        self.load_comments(post_id).await
    }

    /// Loads the comments of `post_id` and keeps them subscribed until the
    /// detail view closes.
    pub async fn load_comments(&mut self, post_id: i64) -> Result<CommentsPage> {
        let key = CacheKey::Comments { post_id };
        if self.comments_subscription.as_ref().map(Subscription::key) != Some(&key) {
            self.comments_subscription = Some(self.cache.subscribe(&key));
        }
        let value = self.cache.get_or_fetch(&key).await?;
        Ok(value.into_comments().ok_or_else(|| unexpected(&key))?)
    }

    pub fn close_post_detail(&mut self) {
        self.store.dispatch_dialog(DialogIntent::Close(Dialog::PostDetail));
        self.store.select_post(None);
        self.comments_subscription = None;
        self.cache.prune();
    }

    /// Fetches the full profile on first open; later opens hit the cache.
    pub async fn open_user_profile(&self, user_id: i64) -> Result<User> {
        let key = CacheKey::User { id: user_id };
        let user = self
            .cache
            .get_or_fetch(&key)
            .await?
            .into_user()
            .ok_or_else(|| unexpected(&key))?;
        self.store.select_user(Some(user.clone()));
        self.store.dispatch_dialog(DialogIntent::Open(Dialog::UserProfile));
        Ok(user)
    }

    pub fn open_add_post(&self) {
        self.store.dispatch_dialog(DialogIntent::Open(Dialog::AddPost));
    }

    pub fn open_edit_post(&self, post: Post) {
        self.store.select_post(Some(post));
        self.store.dispatch_dialog(DialogIntent::Open(Dialog::EditPost));
    }

    pub fn open_add_comment(&self, post_id: i64) {
        self.store.set_comment_target(Some(post_id));
        self.store.dispatch_dialog(DialogIntent::Open(Dialog::AddComment));
    }

    pub fn open_edit_comment(&self, comment: Comment) {
        self.store.select_comment(Some(comment));
        self.store.dispatch_dialog(DialogIntent::Open(Dialog::EditComment));
    }

    /// Creates a post in the list currently on screen.
    pub async fn create_post(&self, new_post: NewPost) -> Result<Post> {
        let key = self.store.filters().cache_key();
        let post = self.mutations.create_post(&key, new_post).await?;
        self.store.dispatch_dialog(DialogIntent::Close(Dialog::AddPost));
        Ok(post)
    }

    pub async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Post> {
        let key = self.store.filters().cache_key();
        let post = self.mutations.update_post(&key, id, patch).await?;
        self.store.dispatch_dialog(DialogIntent::Close(Dialog::EditPost));
        self.store.select_post(None);
        Ok(post)
    }

    pub async fn delete_post(&self, id: i64) -> Result<()> {
        let key = self.store.filters().cache_key();
        self.mutations.delete_post(&key, id).await?;
        Ok(())
    }

    /// Adds a comment to the post targeted by the add-comment dialog.
    pub async fn add_comment(&self, body: String, user_id: i64) -> Result<Comment> {
        let post_id = self.store.comment_target().ok_or_else(|| {
            MutationError::Validation("no post selected for the new comment".to_string())
        })?;
        let comment = self
            .mutations
            .add_comment(NewComment {
                body,
                post_id,
                user_id,
            })
            .await?;
        self.store.dispatch_dialog(DialogIntent::Close(Dialog::AddComment));
        self.store.set_comment_target(None);
        Ok(comment)
    }

    pub async fn update_comment(&self, post_id: i64, id: &CommentId, body: String) -> Result<Comment> {
        let comment = self.mutations.update_comment(post_id, id, body).await?;
        self.store.dispatch_dialog(DialogIntent::Close(Dialog::EditComment));
        self.store.select_comment(None);
        Ok(comment)
    }

    pub async fn delete_comment(&self, post_id: i64, id: &CommentId) -> Result<()> {
        self.mutations.delete_comment(post_id, id).await?;
        Ok(())
    }

    /// Likes a comment once: its cached like count plus one.
    pub async fn like_comment_once(&self, post_id: i64, id: &CommentId) -> Result<Comment> {
        Ok(self.mutations.like_comment_by(post_id, id, 1).await?)
    }
}

fn unexpected(key: &CacheKey) -> CacheError {
    CacheError::UnexpectedValue {
        key: key.to_string(),
    }
}
