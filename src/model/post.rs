use serde::{Deserialize, Serialize};

use crate::model::user::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reactions {
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub dislikes: u64,
}

/// A post as cached by the client.
///
/// Negative ids are reserved for posts that exist only speculatively and
/// have not been confirmed by the server yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reactions: Option<Reactions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
    /// Denormalized author snapshot, filled in on the client.
    #[serde(default, skip_serializing)]
    pub author: Option<UserSummary>,
}

impl Post {
    pub fn is_provisional(&self) -> bool {
        self.id < 0
    }

    pub fn likes(&self) -> u64 {
        self.reactions.map(|r| r.likes).unwrap_or(0)
    }

    /// Builds the placeholder shown while a create request is in flight.
    pub fn speculative(temp_id: i64, new_post: &NewPost) -> Self {
        Self {
            id: temp_id,
            title: new_post.title.clone(),
            body: new_post.body.clone(),
            user_id: new_post.user_id,
            tags: Vec::new(),
            reactions: Some(Reactions::default()),
            views: None,
            author: None,
        }
    }

    /// Merges a server response into the placeholder it replaces.
    ///
    /// Identity, text, ownership, tags and views come from the server.
    /// Reactions and the author snapshot are kept from the placeholder when
    /// the server leaves them out.
    pub fn confirmed(server: Post, speculative: &Post) -> Self {
        Self {
            reactions: server.reactions.or(speculative.reactions),
            author: server.author.or_else(|| speculative.author.clone()),
            ..server
        }
    }
}

/// Request body for `POST /posts/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub user_id: i64,
}

impl NewPost {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("post title must not be empty".to_string());
        }
        if self.body.trim().is_empty() {
            return Err("post body must not be empty".to_string());
        }
        if self.user_id <= 0 {
            return Err(format!("user id must be positive, got {}", self.user_id));
        }
        Ok(())
    }
}

/// Partial update for `PUT /posts/{id}`. Only the fields that are `Some`
/// are sent and merged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.is_empty() {
            return Err("post update changes nothing".to_string());
        }
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err("post title must not be empty".to_string());
        }
        if self.body.as_deref().is_some_and(|b| b.trim().is_empty()) {
            return Err("post body must not be empty".to_string());
        }
        Ok(())
    }

    pub fn apply(&self, post: &mut Post) {
        if let Some(title) = &self.title {
            post.title = title.clone();
        }
        if let Some(body) = &self.body {
            post.body = body.clone();
        }
    }
}

/// Response shape of every post listing endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PostsPage {
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub limit: u64,
}

impl PostsPage {
    pub fn find(&self, id: i64) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.find(id).is_some()
    }

    pub fn prepend(&mut self, post: Post) {
        self.posts.insert(0, post);
        self.total += 1;
    }

    pub fn remove(&mut self, id: i64) -> Option<Post> {
        let index = self.posts.iter().position(|p| p.id == id)?;
        self.total = self.total.saturating_sub(1);
        Some(self.posts.remove(index))
    }

    pub fn patch(&mut self, id: i64, patch: &PostPatch) -> bool {
        match self.posts.iter_mut().find(|p| p.id == id) {
            Some(post) => {
                patch.apply(post);
                true
            }
            None => false,
        }
    }

    /// Swaps the placeholder `temp_id` for `confirmed` at the head of the
    /// list. Returns `false` when the placeholder is gone.
    pub fn replace_provisional(&mut self, temp_id: i64, confirmed: Post) -> bool {
        if !self.contains(temp_id) {
            return false;
        }
        self.posts.retain(|p| p.id != temp_id);
        let before = self.posts.len();
        self.posts.retain(|p| p.id != confirmed.id);
        let duplicates = (before - self.posts.len()) as u64;
        self.total = self.total.saturating_sub(duplicates);
        self.posts.insert(0, confirmed);
        true
    }
}

/// Attaches the matching author snapshot to every post.
pub fn enrich_with_authors(posts: Vec<Post>, users: &[UserSummary]) -> Vec<Post> {
    posts
        .into_iter()
        .map(|post| {
            let author = users.iter().find(|u| u.id == post.user_id).cloned();
            Post { author, ..post }
        })
        .collect()
}
