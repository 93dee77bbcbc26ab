use super::intent::Intent;
use super::state::UiState;

/// The only place state transitions happen.
pub trait Reducer {
    type State: UiState;
    type Intent: Intent;

    /// Pure: no I/O, no clock, no randomness.
    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State;
}
