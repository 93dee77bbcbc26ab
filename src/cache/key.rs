use std::fmt;

use crate::api::{ApiError, ResourceApi};
use crate::model::{CommentsPage, PostsPage, Sort, Tag, User, UsersPage};

/// Structured cache key: resource kind plus the parameters that
/// disambiguate one response from another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    PostList { limit: u64, skip: u64, sort: Sort },
    PostSearch { query: String, sort: Sort },
    PostsByTag { tag: String, sort: Sort },
    Comments { post_id: i64 },
    UserDirectory { limit: u64, select: String },
    User { id: i64 },
    Tags,
}

impl CacheKey {
    /// True for every key that holds a [`PostsPage`].
    pub fn is_post_list(&self) -> bool {
        matches!(
            self,
            CacheKey::PostList { .. } | CacheKey::PostSearch { .. } | CacheKey::PostsByTag { .. }
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CacheKey::PostList { .. } => "posts",
            CacheKey::PostSearch { .. } => "posts/search",
            CacheKey::PostsByTag { .. } => "posts/tag",
            CacheKey::Comments { .. } => "comments",
            CacheKey::UserDirectory { .. } => "users",
            CacheKey::User { .. } => "user",
            CacheKey::Tags => "tags",
        }
    }

    /// Runs the query function for this key.
    pub async fn fetch_from(&self, api: &dyn ResourceApi) -> Result<CacheValue, ApiError> {
        Ok(match self {
            CacheKey::PostList { limit, skip, sort } => {
                CacheValue::Posts(api.posts(*limit, *skip, *sort).await?)
            }
            CacheKey::PostSearch { query, sort } => {
                CacheValue::Posts(api.search_posts(query, *sort).await?)
            }
            CacheKey::PostsByTag { tag, sort } => {
                CacheValue::Posts(api.posts_by_tag(tag, *sort).await?)
            }
            CacheKey::Comments { post_id } => {
                CacheValue::Comments(api.comments_by_post(*post_id).await?)
            }
            CacheKey::UserDirectory { limit, select } => {
                CacheValue::Users(api.users(*limit, select).await?)
            }
            CacheKey::User { id } => CacheValue::User(api.user(*id).await?),
            CacheKey::Tags => CacheValue::Tags(api.tags().await?),
        })
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::PostList { limit, skip, sort } => {
                write!(f, "posts[limit={limit},skip={skip},{sort}]")
            }
            CacheKey::PostSearch { query, sort } => write!(f, "posts/search[q={query:?},{sort}]"),
            CacheKey::PostsByTag { tag, sort } => write!(f, "posts/tag[{tag},{sort}]"),
            CacheKey::Comments { post_id } => write!(f, "comments[post={post_id}]"),
            CacheKey::UserDirectory { limit, select } => {
                write!(f, "users[limit={limit},select={select}]")
            }
            CacheKey::User { id } => write!(f, "user[{id}]"),
            CacheKey::Tags => f.write_str("tags"),
        }
    }
}

/// A cached response.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheValue {
    Posts(PostsPage),
    Comments(CommentsPage),
    Users(UsersPage),
    User(User),
    Tags(Vec<Tag>),
}

impl CacheValue {
    pub fn as_posts(&self) -> Option<&PostsPage> {
        match self {
            CacheValue::Posts(page) => Some(page),
            _ => None,
        }
    }

    pub fn as_comments(&self) -> Option<&CommentsPage> {
        match self {
            CacheValue::Comments(page) => Some(page),
            _ => None,
        }
    }

    pub fn into_posts(self) -> Option<PostsPage> {
        match self {
            CacheValue::Posts(page) => Some(page),
            _ => None,
        }
    }

    pub fn into_comments(self) -> Option<CommentsPage> {
        match self {
            CacheValue::Comments(page) => Some(page),
            _ => None,
        }
    }

    pub fn into_users(self) -> Option<UsersPage> {
        match self {
            CacheValue::Users(page) => Some(page),
            _ => None,
        }
    }

    pub fn into_user(self) -> Option<User> {
        match self {
            CacheValue::User(user) => Some(user),
            _ => None,
        }
    }

    pub fn into_tags(self) -> Option<Vec<Tag>> {
        match self {
            CacheValue::Tags(tags) => Some(tags),
            _ => None,
        }
    }
}
