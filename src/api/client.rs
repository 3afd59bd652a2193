use async_trait::async_trait;
use crate::error::Result;
use super::types::{CitizenPayload, CitizenQuery};

/// Default backend location when nothing is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

/// Data source the filter controller fetches from
#[async_trait]
pub trait CitizenSource: Send + Sync {
    /// Fetch one page of citizens matching the query
    async fn fetch_citizens(&self, query: CitizenQuery) -> Result<CitizenPayload>;

    /// Fetch the known city names for filter dropdowns
    async fn fetch_cities(&self) -> Result<Vec<String>>;

    /// Get the base URL for this source
    fn base_url(&self) -> &str;
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL; the citizens list lives at its root
    pub base_url: String,
    /// Request timeout in seconds, `None` waits indefinitely
    pub timeout: Option<u64>,
    /// User agent string
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            user_agent: format!("citizens-cli/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
