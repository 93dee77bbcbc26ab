//! Feedback-free synchronization between filter state and the URL.
//!
//! ```text
//! Uninitialized ──begin──→ Initializing ──settle──→ Synced
//!                          (URL parsed,             (state → URL,
//!                           state → URL muted)       navigation → state)
//! ```

use crate::state::FilterState;
use crate::sync::query::{build_query, canonical_query, parse_query};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    #[default]
    Uninitialized,
    Initializing,
    Synced,
}

#[derive(Debug, Default)]
pub struct UrlSync {
    phase: SyncPhase,
    /// Canonical form of the query the address bar currently shows.
    last_query: String,
}

impl UrlSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// Parses the initial URL. Only the first call has an effect; the URL
    /// wins over whatever state existed before.
    pub fn begin(&mut self, query: &str) -> Option<FilterState> {
        if self.phase != SyncPhase::Uninitialized {
            tracing::debug!(phase = ?self.phase, "URL sync already started");
            return None;
        }
        self.phase = SyncPhase::Initializing;
        self.last_query = canonical_query(query);
        Some(parse_query(query))
    }

    /// Ends the initial parse. State changes propagate to the URL from now on.
    pub fn settle(&mut self) {
        if self.phase == SyncPhase::Initializing {
            self.phase = SyncPhase::Synced;
        }
    }

    /// Returns the query to write to the address bar, or `None` while
    /// initializing or when the URL already describes `state`.
    pub fn on_state_changed(&mut self, state: &FilterState) -> Option<String> {
        if self.phase != SyncPhase::Synced {
            return None;
        }
        let query = build_query(state);
        if query == self.last_query {
            return None;
        }
        tracing::debug!(query = %query, "Filter state changed, replacing URL");
        self.last_query = query.clone();
        Some(query)
    }

    /// External navigation (back/forward). The URL wins; applying the returned
    /// state will not echo a rewrite back to the address bar.
    pub fn on_navigation(&mut self, query: &str) -> Option<FilterState> {
        if self.phase != SyncPhase::Synced {
            return None;
        }
        self.last_query = canonical_query(query);
        Some(parse_query(query))
    }
}
