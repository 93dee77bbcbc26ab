use crate::model::{Comment, Post, User};

/// Entities the dialogs operate on.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selection {
    pub post: Option<Post>,
    pub comment: Option<Comment>,
    pub user: Option<User>,
    /// Post the add-comment dialog writes to.
    pub comment_target: Option<i64>,
}
