use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};

/// Comment identifier.
///
/// Server ids are JSON numbers. Comments that exist only on the client carry
/// a `temp-` prefixed string token, so the two can never collide. Numeric
/// strings decode as server ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum CommentId {
    Server(i64),
    Temp(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCommentId {
    Number(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for CommentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawCommentId::deserialize(deserializer)? {
            RawCommentId::Number(id) => Ok(CommentId::Server(id)),
            RawCommentId::Text(token) if token.starts_with(CommentId::TEMP_PREFIX) => {
                Ok(CommentId::Temp(token))
            }
            RawCommentId::Text(text) => text
                .trim()
                .parse()
                .map(CommentId::Server)
                .map_err(|_| de::Error::custom(format!("invalid comment id {text:?}"))),
        }
    }
}

impl CommentId {
    pub const TEMP_PREFIX: &'static str = "temp-";

    pub fn is_temp(&self) -> bool {
        matches!(self, CommentId::Temp(_))
    }

    pub fn server(&self) -> Option<i64> {
        match self {
            CommentId::Server(id) => Some(*id),
            CommentId::Temp(_) => None,
        }
    }
}

impl From<i64> for CommentId {
    fn from(id: i64) -> Self {
        CommentId::Server(id)
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommentId::Server(id) => write!(f, "{id}"),
            CommentId::Temp(token) => f.write_str(token),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthor {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// A comment as cached by the client.
///
/// `likes` is tracked on the client only: the remote API never persists it,
/// so a refetch resets it to whatever the server reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub post_id: i64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub user: CommentAuthor,
}

impl Comment {
    pub const PLACEHOLDER_USERNAME: &'static str = "You";

    pub fn user_id(&self) -> i64 {
        self.user.id
    }

    pub fn speculative(temp_id: CommentId, new_comment: &NewComment) -> Self {
        Self {
            id: temp_id,
            body: new_comment.body.clone(),
            post_id: new_comment.post_id,
            likes: 0,
            user: CommentAuthor {
                id: new_comment.user_id,
                username: Self::PLACEHOLDER_USERNAME.to_string(),
                full_name: None,
            },
        }
    }

    /// Merges a server response into the placeholder it replaces.
    ///
    /// Everything is server-authoritative except that a missing author and
    /// a missing post reference fall back to the placeholder's values.
    pub fn confirmed(server: Comment, speculative: &Comment) -> Self {
        let user = if server.user.id == 0 {
            speculative.user.clone()
        } else {
            server.user
        };
        let post_id = if server.post_id == 0 {
            speculative.post_id
        } else {
            server.post_id
        };
        Self {
            user,
            post_id,
            ..server
        }
    }
}

/// Request body for `POST /comments/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub body: String,
    pub post_id: i64,
    pub user_id: i64,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), String> {
        if self.body.trim().is_empty() {
            return Err("comment body must not be empty".to_string());
        }
        if self.post_id <= 0 {
            return Err(format!("post id must be positive, got {}", self.post_id));
        }
        if self.user_id <= 0 {
            return Err(format!("user id must be positive, got {}", self.user_id));
        }
        Ok(())
    }
}

/// Request body for `PUT /comments/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentPatch {
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommentsPage {
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub limit: u64,
}

impl CommentsPage {
    pub fn find(&self, id: &CommentId) -> Option<&Comment> {
        self.comments.iter().find(|c| &c.id == id)
    }

    pub fn find_mut(&mut self, id: &CommentId) -> Option<&mut Comment> {
        self.comments.iter_mut().find(|c| &c.id == id)
    }

    pub fn append(&mut self, comment: Comment) {
        self.comments.push(comment);
        self.total += 1;
    }

    pub fn remove(&mut self, id: &CommentId) -> Option<Comment> {
        let index = self.comments.iter().position(|c| &c.id == id)?;
        self.total = self.total.saturating_sub(1);
        Some(self.comments.remove(index))
    }

    /// Swaps the placeholder for `confirmed`, appended at the end.
    pub fn replace_provisional(&mut self, temp_id: &CommentId, confirmed: Comment) -> bool {
        if self.find(temp_id).is_none() {
            return false;
        }
        self.comments.retain(|c| &c.id != temp_id);
        let before = self.comments.len();
        self.comments.retain(|c| c.id != confirmed.id);
        let duplicates = (before - self.comments.len()) as u64;
        self.total = self.total.saturating_sub(duplicates);
        self.comments.push(confirmed);
        true
    }
}
