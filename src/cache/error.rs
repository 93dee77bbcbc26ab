use thiserror::Error;

/// Errors surfaced to cache readers.
///
/// `Clone` so that one fetch outcome can be handed to every caller that was
/// waiting on the same in-flight request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("Fetch for {key} failed: {message}")]
    Fetch { key: String, message: String },

    #[error("Fetch for {key} was cancelled")]
    Cancelled { key: String },

    #[error("Cached value for {key} has an unexpected shape")]
    UnexpectedValue { key: String },
}
