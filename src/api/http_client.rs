use reqwest::{Client, ClientBuilder};
use std::time::Duration;

use crate::error::Result;

/// Create an HTTP client for the citizens backend.
///
/// Without a timeout the client waits for the server indefinitely.
pub fn create_custom_client(timeout_secs: Option<u64>, user_agent: &str) -> Result<Client> {
    let mut builder = ClientBuilder::new()
        // Connection pool settings
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(30))
        .tcp_keepalive(Duration::from_secs(60))
        .tcp_nodelay(true)
        .use_rustls_tls()
        .user_agent(user_agent.to_string());

    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    Ok(builder.build()?)
}
