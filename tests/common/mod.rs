//! Shared test utilities: an in-memory scripted API and helpers.

#![allow(dead_code, unused_imports)]

pub mod mock_backend;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use postdesk::api::{ApiError, ResourceApi};
use postdesk::model::{
    Comment, CommentAuthor, CommentId, CommentPatch, CommentsPage, NewComment, NewPost, Post,
    PostPatch, PostsPage, Reactions, Sort, Tag, User, UserSummary, UsersPage,
};
use tempfile::TempDir;
use tokio::sync::Semaphore;

/// In-memory [`ResourceApi`] that records every call.
///
/// Responses come from the seeded data. `fail_next` makes the next call
/// fail with an HTTP status; `pause` holds every call after it is recorded
/// until `release` hands out permits.
pub struct FakeApi {
    state: Mutex<FakeState>,
    gate: Semaphore,
    paused: Mutex<bool>,
}

#[derive(Default)]
struct FakeState {
    posts: Vec<Post>,
    comments: HashMap<i64, Vec<Comment>>,
    users: Vec<User>,
    tags: Vec<Tag>,
    next_post_id: i64,
    next_comment_id: i64,
    fail_next: Option<u16>,
    calls: Vec<String>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                next_post_id: 101,
                next_comment_id: 341,
                ..FakeState::default()
            }),
            gate: Semaphore::new(0),
            paused: Mutex::new(false),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn with_posts(self, posts: Vec<Post>) -> Self {
        self.state.lock().posts = posts;
        self
    }

    pub fn with_comments(self, post_id: i64, comments: Vec<Comment>) -> Self {
        self.state.lock().comments.insert(post_id, comments);
        self
    }

    pub fn with_users(self, users: Vec<User>) -> Self {
        self.state.lock().users = users;
        self
    }

    pub fn with_tags(self, tags: Vec<Tag>) -> Self {
        self.state.lock().tags = tags;
        self
    }

    pub fn fail_next(&self, status: u16) {
        self.state.lock().fail_next = Some(status);
    }

    pub fn pause(&self) {
        *self.paused.lock() = true;
    }

    pub fn release(&self, permits: usize) {
        self.gate.add_permits(permits);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.state.lock().calls.iter().filter(|c| c.as_str() == name).count()
    }

    /// Waits until `name` has been called `count` times.
    pub async fn wait_for_calls(&self, name: &str, count: usize) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while self.call_count(name) < count {
            assert!(
                tokio::time::Instant::now() < deadline,
                "timed out waiting for {count} {name} call(s), got {:?}",
                self.calls()
            );
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    async fn enter(&self, name: &str) -> Result<(), ApiError> {
        let failure = {
            let mut state = self.state.lock();
            state.calls.push(name.to_string());
            state.fail_next.take()
        };
        let paused = *self.paused.lock();
        if paused {
            self.gate.acquire().await.expect("gate closed").forget();
        }
        match failure {
            Some(status) => Err(ApiError::Status {
                method: "TEST".to_string(),
                path: format!("/{name}"),
                status,
                message: "scripted failure".to_string(),
            }),
            None => Ok(()),
        }
    }

    fn page(&self, posts: Vec<Post>) -> PostsPage {
        PostsPage {
            total: posts.len() as u64,
            limit: posts.len() as u64,
            skip: 0,
            posts,
        }
    }
}

#[async_trait]
impl ResourceApi for FakeApi {
    async fn posts(&self, limit: u64, skip: u64, _sort: Sort) -> Result<PostsPage, ApiError> {
        self.enter("posts").await?;
        let all = self.state.lock().posts.clone();
        let total = all.len() as u64;
        let posts: Vec<Post> = all
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect();
        Ok(PostsPage {
            total,
            skip,
            limit,
            posts,
        })
    }

    async fn search_posts(&self, query: &str, _sort: Sort) -> Result<PostsPage, ApiError> {
        self.enter("search_posts").await?;
        let posts = self
            .state
            .lock()
            .posts
            .iter()
            .filter(|p| p.title.contains(query) || p.body.contains(query))
            .cloned()
            .collect();
        Ok(self.page(posts))
    }

    async fn posts_by_tag(&self, tag: &str, _sort: Sort) -> Result<PostsPage, ApiError> {
        self.enter("posts_by_tag").await?;
        let posts = self
            .state
            .lock()
            .posts
            .iter()
            .filter(|p| p.tags.iter().any(|t| t == tag))
            .cloned()
            .collect();
        Ok(self.page(posts))
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post, ApiError> {
        self.enter("create_post").await?;
        let mut state = self.state.lock();
        let id = state.next_post_id;
        state.next_post_id += 1;
        // The real API echoes the body without reactions
        Ok(Post {
            reactions: None,
            ..post_with(id, &post.title, post.user_id)
        })
    }

    async fn update_post(&self, id: i64, patch: &PostPatch) -> Result<Post, ApiError> {
        self.enter("update_post").await?;
        let state = self.state.lock();
        let mut post = state
            .posts
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .unwrap_or_else(|| post_with(id, "", 1));
        patch.apply(&mut post);
        Ok(post)
    }

    async fn delete_post(&self, _id: i64) -> Result<(), ApiError> {
        self.enter("delete_post").await
    }

    async fn comments_by_post(&self, post_id: i64) -> Result<CommentsPage, ApiError> {
        self.enter("comments_by_post").await?;
        let comments = self
            .state
            .lock()
            .comments
            .get(&post_id)
            .cloned()
            .unwrap_or_default();
        Ok(CommentsPage {
            total: comments.len() as u64,
            skip: 0,
            limit: comments.len() as u64,
            comments,
        })
    }

    async fn create_comment(&self, comment: &NewComment) -> Result<Comment, ApiError> {
        self.enter("create_comment").await?;
        let mut state = self.state.lock();
        let id = state.next_comment_id;
        state.next_comment_id += 1;
        Ok(Comment {
            id: CommentId::Server(id),
            body: comment.body.clone(),
            post_id: comment.post_id,
            likes: 0,
            user: CommentAuthor {
                id: comment.user_id,
                username: "emilys".to_string(),
                full_name: Some("Emily Johnson".to_string()),
            },
        })
    }

    async fn update_comment(&self, id: i64, patch: &CommentPatch) -> Result<Comment, ApiError> {
        self.enter("update_comment").await?;
        Ok(comment_with(id, 0, &patch.body, 0))
    }

    async fn delete_comment(&self, _id: i64) -> Result<(), ApiError> {
        self.enter("delete_comment").await
    }

    async fn users(&self, _limit: u64, _select: &str) -> Result<UsersPage, ApiError> {
        self.enter("users").await?;
        let users: Vec<UserSummary> = self.state.lock().users.iter().map(User::summary).collect();
        Ok(UsersPage {
            total: users.len() as u64,
            skip: 0,
            limit: 0,
            users,
        })
    }

    async fn user(&self, id: i64) -> Result<User, ApiError> {
        self.enter("user").await?;
        self.state
            .lock()
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| ApiError::Status {
                method: "GET".to_string(),
                path: format!("/users/{id}"),
                status: 404,
                message: format!("User with id '{id}' not found"),
            })
    }

    async fn tags(&self) -> Result<Vec<Tag>, ApiError> {
        self.enter("tags").await?;
        Ok(self.state.lock().tags.clone())
    }
}

pub fn post_with(id: i64, title: &str, user_id: i64) -> Post {
    Post {
        id,
        title: title.to_string(),
        body: format!("body of {title}"),
        user_id,
        tags: Vec::new(),
        reactions: Some(Reactions {
            likes: 0,
            dislikes: 0,
        }),
        views: None,
        author: None,
    }
}

pub fn post_with_likes(id: i64, likes: u64) -> Post {
    Post {
        reactions: Some(Reactions { likes, dislikes: 0 }),
        ..post_with(id, &format!("post {id}"), 1)
    }
}

pub fn comment_with(id: i64, post_id: i64, body: &str, likes: u64) -> Comment {
    Comment {
        id: CommentId::Server(id),
        body: body.to_string(),
        post_id,
        likes,
        user: CommentAuthor {
            id: 1,
            username: "emilys".to_string(),
            full_name: None,
        },
    }
}

pub fn user_with(id: i64, username: &str) -> User {
    User {
        id,
        username: username.to_string(),
        ..User::default()
    }
}

pub fn page_of(posts: Vec<Post>) -> PostsPage {
    PostsPage {
        total: posts.len() as u64,
        skip: 0,
        limit: 10,
        posts,
    }
}

/// Create a temporary config file with the given content.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}
