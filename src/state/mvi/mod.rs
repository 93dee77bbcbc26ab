//! Model-View-Intent primitives for the application state.
//!
//! ```text
//! Intent ──→ Reducer ──→ State ──→ URL / list source
//!    ↑                                   │
//!    └───────────────────────────────────┘
//! ```
//!
//! - **State**: plain value, compared to detect changes
//! - **Intent**: a user action or a navigation event
//! - **Reducer**: pure `(State, Intent) -> State`

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::UiState;
