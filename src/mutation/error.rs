use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum MutationError {
    /// Rejected before any cache or network effect.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The server call failed; speculative state has been rolled back.
    #[error("Remote call failed: {0}")]
    Remote(#[from] ApiError),
}

impl MutationError {
    pub fn is_validation(&self) -> bool {
        matches!(self, MutationError::Validation(_))
    }
}
