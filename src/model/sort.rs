use std::fmt;

use crate::model::post::Post;

/// Field the post list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortBy {
    #[default]
    None,
    Id,
    Title,
    Reactions,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::None => "none",
            SortBy::Id => "id",
            SortBy::Title => "title",
            SortBy::Reactions => "reactions",
        }
    }

    /// Unknown names fall back to `None`.
    pub fn parse(value: &str) -> Self {
        match value {
            "id" => SortBy::Id,
            "title" => SortBy::Title,
            "reactions" => SortBy::Reactions,
            _ => SortBy::None,
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    /// Anything other than `desc` is ascending.
    pub fn parse(value: &str) -> Self {
        if value == "desc" {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-side ordering of a post query.
///
/// Constructed through [`Sort::new`], which drops the order when no field is
/// selected so that two queries that hit the same URL compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Sort {
    by: SortBy,
    order: SortOrder,
}

impl Sort {
    pub fn new(by: SortBy, order: SortOrder) -> Self {
        match by {
            SortBy::None => Self::default(),
            _ => Self { by, order },
        }
    }

    pub fn by(&self) -> SortBy {
        self.by
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// Query parameters for the remote API; empty when unsorted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        match self.by {
            SortBy::None => Vec::new(),
            by => vec![
                ("sortBy", by.as_str().to_string()),
                ("order", self.order.as_str().to_string()),
            ],
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.by {
            SortBy::None => f.write_str("unsorted"),
            by => write!(f, "{}:{}", by, self.order),
        }
    }
}

/// Orders posts by like count on the client. The remote API does not sort by
/// reactions reliably, so list views apply this after fetching.
pub fn sort_by_reactions(posts: &mut [Post], order: SortOrder) {
    match order {
        SortOrder::Asc => posts.sort_by_key(|p| p.likes()),
        SortOrder::Desc => posts.sort_by_key(|p| std::cmp::Reverse(p.likes())),
    }
}
