//! Key-addressed query cache.
//!
//! The cache is the single source of truth for fetched and speculative
//! resource state. Keys are tagged variants ([`CacheKey`]) so that every
//! resource kind has a fixed parameter shape, and values are tagged the same
//! way ([`CacheValue`]).

mod error;
mod key;
mod store;

pub use error::CacheError;
pub use key::{CacheKey, CacheValue};
pub use store::{FetchOutcome, FetchStatus, QueryCache, Subscription};
