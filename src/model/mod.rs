//! Entities exchanged with the remote API.
//!
//! Every struct tolerates missing optional fields on the wire (serde defaults),
//! so a partial response is decoded rather than rejected. The merge functions
//! on [`Post`] and [`Comment`] are the only place where speculative and
//! server-confirmed copies of an entity are combined.

mod comment;
mod post;
mod sort;
mod tag;
mod user;

pub use comment::{Comment, CommentAuthor, CommentId, CommentPatch, CommentsPage, NewComment};
pub use post::{enrich_with_authors, NewPost, Post, PostPatch, PostsPage, Reactions};
pub use sort::{sort_by_reactions, Sort, SortBy, SortOrder};
pub use tag::Tag;
pub use user::{Address, Company, User, UserSummary, UsersPage};
