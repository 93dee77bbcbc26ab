mod loader;
mod store;
mod types;

pub use loader::{ConfigError, BASE_URL_ENV};
pub use store::ConfigStore;
pub use types::{
    ApiConfig, ApiTarget, Config, ListConfig, DEFAULT_DIRECT_BASE_URL, DEFAULT_PROXY_BASE_URL,
};
