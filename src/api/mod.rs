//! Remote resource client.
//!
//! [`ResourceApi`] is the seam between the engine and the network: the
//! cache and the mutation coordinator only ever talk to a `dyn ResourceApi`.
//! [`ApiClient`] is the HTTP implementation.

mod client;
mod error;

use async_trait::async_trait;

pub use client::ApiClient;
pub use error::ApiError;

use crate::model::{
    Comment, CommentPatch, CommentsPage, NewComment, NewPost, Post, PostPatch, PostsPage, Sort,
    Tag, User, UsersPage,
};

/// Operations offered by the remote posts/comments/users API.
#[async_trait]
pub trait ResourceApi: Send + Sync {
    /// `GET /posts?limit&skip&sortBy&order`
    async fn posts(&self, limit: u64, skip: u64, sort: Sort) -> Result<PostsPage, ApiError>;

    /// `GET /posts/search?q&sortBy&order`
    async fn search_posts(&self, query: &str, sort: Sort) -> Result<PostsPage, ApiError>;

    /// `GET /posts/tag/{tag}?sortBy&order`
    async fn posts_by_tag(&self, tag: &str, sort: Sort) -> Result<PostsPage, ApiError>;

    /// `POST /posts/add`
    async fn create_post(&self, post: &NewPost) -> Result<Post, ApiError>;

    /// `PUT /posts/{id}`
    async fn update_post(&self, id: i64, patch: &PostPatch) -> Result<Post, ApiError>;

    /// `DELETE /posts/{id}`
    async fn delete_post(&self, id: i64) -> Result<(), ApiError>;

    /// `GET /comments/post/{postId}`
    async fn comments_by_post(&self, post_id: i64) -> Result<CommentsPage, ApiError>;

    /// `POST /comments/add`
    async fn create_comment(&self, comment: &NewComment) -> Result<Comment, ApiError>;

    /// `PUT /comments/{id}`; the API has no separate patch verb.
    async fn update_comment(&self, id: i64, patch: &CommentPatch) -> Result<Comment, ApiError>;

    /// `DELETE /comments/{id}`
    async fn delete_comment(&self, id: i64) -> Result<(), ApiError>;

    /// `GET /users?limit&select`
    async fn users(&self, limit: u64, select: &str) -> Result<UsersPage, ApiError>;

    /// `GET /users/{id}`
    async fn user(&self, id: i64) -> Result<User, ApiError>;

    /// `GET /posts/tags`
    async fn tags(&self) -> Result<Vec<Tag>, ApiError>;
}
