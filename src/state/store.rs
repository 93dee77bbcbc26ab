//! Single owner of the application state.
//!
//! Every field is reached through a narrow accessor; filters and dialogs
//! only change by reducing an intent.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::model::{Comment, Post, User};
use crate::state::dialogs::{Dialog, DialogIntent, DialogReducer, DialogState};
use crate::state::filters::{FilterIntent, FilterReducer, FilterState};
use crate::state::mvi::Reducer;
use crate::state::selection::Selection;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub filters: FilterState,
    pub dialogs: DialogState,
    pub selection: Selection,
}

/// Cloneable handle; clones share the same state.
#[derive(Clone, Default)]
pub struct AppStore {
    inner: Arc<RwLock<AppState>>,
}

impl AppStore {
    pub fn new(state: AppState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    pub fn filters(&self) -> FilterState {
        self.inner.read().filters.clone()
    }

    /// Reduces `intent` into the filters. Returns the new filters if they
    /// changed.
    pub fn dispatch_filters(&self, intent: FilterIntent) -> Option<FilterState> {
        let mut state = self.inner.write();
        let next = FilterReducer::reduce(state.filters.clone(), intent);
        if next == state.filters {
            return None;
        }
        state.filters = next.clone();
        Some(next)
    }

    pub fn dialogs(&self) -> DialogState {
        self.inner.read().dialogs.clone()
    }

    pub fn is_dialog_open(&self, dialog: Dialog) -> bool {
        self.inner.read().dialogs.is_open(dialog)
    }

    pub fn dispatch_dialog(&self, intent: DialogIntent) {
        let mut state = self.inner.write();
        let dialogs = std::mem::take(&mut state.dialogs);
        state.dialogs = DialogReducer::reduce(dialogs, intent);
    }

    pub fn selected_post(&self) -> Option<Post> {
        self.inner.read().selection.post.clone()
    }

    pub fn select_post(&self, post: Option<Post>) {
        self.inner.write().selection.post = post;
    }

    pub fn selected_comment(&self) -> Option<Comment> {
        self.inner.read().selection.comment.clone()
    }

    pub fn select_comment(&self, comment: Option<Comment>) {
        self.inner.write().selection.comment = comment;
    }

    pub fn selected_user(&self) -> Option<User> {
        self.inner.read().selection.user.clone()
    }

    pub fn select_user(&self, user: Option<User>) {
        self.inner.write().selection.user = user;
    }

    pub fn comment_target(&self) -> Option<i64> {
        self.inner.read().selection.comment_target
    }

    pub fn set_comment_target(&self, post_id: Option<i64>) {
        self.inner.write().selection.comment_target = post_id;
    }
}
