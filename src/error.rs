use thiserror::Error;

use crate::cache::CacheError;
use crate::mutation::MutationError;

/// Errors surfaced by [`PostsManager`](crate::manager::PostsManager).
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Mutation(#[from] MutationError),
}

pub type Result<T> = std::result::Result<T, Error>;
