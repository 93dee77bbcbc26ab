//! Bidirectional URL query / filter state synchronization.

mod address_bar;
mod machine;
mod query;

pub use address_bar::{AddressBar, MemoryHistory};
pub use machine::{SyncPhase, UrlSync};
pub use query::{build_query, canonical_query, parse_query, with_page_size};
