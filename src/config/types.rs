use serde::{Deserialize, Serialize};

pub const DEFAULT_DIRECT_BASE_URL: &str = "https://dummyjson.com";
pub const DEFAULT_PROXY_BASE_URL: &str = "http://127.0.0.1:5173/api";

/// Root configuration container.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub list: ListConfig,
}

/// Which base URL requests go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiTarget {
    /// Straight to the public API host.
    #[default]
    Direct,
    /// Through a local dev-server proxy path.
    Proxy,
}

/// Remote API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub target: ApiTarget,
    #[serde(default = "default_direct_base_url")]
    pub direct_base_url: String,
    #[serde(default = "default_proxy_base_url")]
    pub proxy_base_url: String,
    /// Overrides both targets when set (`--base-url` or `POSTDESK_BASE_URL`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Connection timeout in seconds (default: 5).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u32,
}

impl ApiConfig {
    pub fn effective_base_url(&self) -> &str {
        if let Some(url) = &self.base_url {
            return url;
        }
        match self.target {
            ApiTarget::Direct => &self.direct_base_url,
            ApiTarget::Proxy => &self.proxy_base_url,
        }
    }
}

/// Post list settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListConfig {
    /// Page size used when the URL does not specify one (default: 10).
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Fields requested for the author directory (default: "username,image").
    #[serde(default = "default_user_select")]
    pub user_select: String,
}

fn default_direct_base_url() -> String {
    DEFAULT_DIRECT_BASE_URL.to_string()
}

fn default_proxy_base_url() -> String {
    DEFAULT_PROXY_BASE_URL.to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_connect_timeout() -> u32 {
    5
}

fn default_page_size() -> u64 {
    10
}

fn default_user_select() -> String {
    "username,image".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            target: ApiTarget::default(),
            direct_base_url: default_direct_base_url(),
            proxy_base_url: default_proxy_base_url(),
            base_url: None,
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            user_select: default_user_select(),
        }
    }
}
