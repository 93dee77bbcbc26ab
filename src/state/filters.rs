//! List filter state: pagination, sort, search term and tag.

use crate::cache::CacheKey;
use crate::model::{Sort, SortBy, SortOrder};
use crate::state::mvi::{Intent, Reducer, UiState};

pub const DEFAULT_LIMIT: u64 = 10;

/// Tag value meaning "no tag filter".
pub const ALL_TAGS: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub skip: u64,
    pub limit: u64,
    pub sort_by: SortBy,
    pub order: SortOrder,
    pub search: String,
    pub tag: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
            sort_by: SortBy::None,
            order: SortOrder::Asc,
            search: String::new(),
            tag: String::new(),
        }
    }
}

impl UiState for FilterState {}

/// The one data source that feeds the post list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListSource {
    Page { limit: u64, skip: u64 },
    Search(String),
    Tag(String),
}

impl FilterState {
    /// A non-empty search term wins over the tag; the tag stays stored.
    pub fn source(&self) -> ListSource {
        let search = self.search.trim();
        if !search.is_empty() {
            ListSource::Search(search.to_string())
        } else if !self.tag.is_empty() {
            ListSource::Tag(self.tag.clone())
        } else {
            ListSource::Page {
                limit: self.limit,
                skip: self.skip,
            }
        }
    }

    pub fn is_search_mode(&self) -> bool {
        matches!(self.source(), ListSource::Search(_))
    }

    pub fn is_tag_mode(&self) -> bool {
        matches!(self.source(), ListSource::Tag(_))
    }

    pub fn sort(&self) -> Sort {
        Sort::new(self.sort_by, self.order)
    }

    /// Cache key of the authoritative list.
    pub fn cache_key(&self) -> CacheKey {
        let sort = self.sort();
        match self.source() {
            ListSource::Page { limit, skip } => CacheKey::PostList { limit, skip, sort },
            ListSource::Search(query) => CacheKey::PostSearch { query, sort },
            ListSource::Tag(tag) => CacheKey::PostsByTag { tag, sort },
        }
    }
}

/// Maps the "all" pseudo-tag to an empty tag.
pub fn normalize_tag(tag: &str) -> String {
    let tag = tag.trim();
    if tag.eq_ignore_ascii_case(ALL_TAGS) {
        String::new()
    } else {
        tag.to_string()
    }
}

#[derive(Debug, Clone)]
pub enum FilterIntent {
    SetSkip(u64),
    /// Ignored when zero. Resets to the first page.
    SetLimit(u64),
    /// Resets to the first page.
    SetSearch(String),
    SetSortBy(SortBy),
    SetOrder(SortOrder),
    /// Resets to the first page. `"all"` clears the tag.
    SetTag(String),
    /// Advances one page unless that would run past `total`.
    NextPage { total: u64 },
    PrevPage,
    /// Wholesale replacement, used when the URL wins.
    Replace(FilterState),
}

impl Intent for FilterIntent {}

pub struct FilterReducer;

impl Reducer for FilterReducer {
    type State = FilterState;
    type Intent = FilterIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            FilterIntent::SetSkip(skip) => FilterState { skip, ..state },
            FilterIntent::SetLimit(0) => state,
            FilterIntent::SetLimit(limit) => FilterState {
                limit,
                skip: 0,
                ..state
            },
            FilterIntent::SetSearch(search) => FilterState {
                search,
                skip: 0,
                ..state
            },
            FilterIntent::SetSortBy(sort_by) => FilterState { sort_by, ..state },
            FilterIntent::SetOrder(order) => FilterState { order, ..state },
            FilterIntent::SetTag(tag) => FilterState {
                tag: normalize_tag(&tag),
                skip: 0,
                ..state
            },
            FilterIntent::NextPage { total } => {
                match state.skip.checked_add(state.limit) {
                    Some(next) if next < total => FilterState { skip: next, ..state },
                    _ => state,
                }
            }
            FilterIntent::PrevPage => FilterState {
                skip: state.skip.saturating_sub(state.limit),
                ..state
            },
            FilterIntent::Replace(next) => next,
        }
    }
}
