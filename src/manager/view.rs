use crate::cache::CacheKey;
use crate::model::Post;
use crate::state::ListSource;

/// Post list ready for display: authors attached, reactions sort applied.
#[derive(Debug, Clone, PartialEq)]
pub struct PostListView {
    pub key: CacheKey,
    pub source: ListSource,
    pub posts: Vec<Post>,
    pub total: u64,
}

impl PostListView {
    /// Rows still waiting for server confirmation.
    pub fn provisional(&self) -> impl Iterator<Item = &Post> {
        self.posts.iter().filter(|post| post.is_provisional())
    }
}
