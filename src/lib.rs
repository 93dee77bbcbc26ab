//! Headless engine for a posts/comments/users admin over a DummyJSON-style
//! REST API.
//!
//! - [`api`]: typed HTTP client behind the [`api::ResourceApi`] trait
//! - [`cache`]: key-addressed query cache with request de-duplication
//! - [`mutation`]: optimistic writes with reconciliation and rollback
//! - [`state`] and [`sync`]: filter state kept in step with the URL query
//! - [`manager`]: the admin view facade wiring all of the above

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod manager;
pub mod model;
pub mod mutation;
pub mod state;
pub mod sync;

pub use error::{Error, Result};
