use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Response, Url};
use serde::Deserialize;

use super::client::{CitizenSource, ClientConfig};
use super::http_client::create_custom_client;
use super::types::{CitizenPayload, CitizenQuery};
use crate::error::{CitizensError, Result};

/// REST client for the citizens backend
pub struct HttpCitizenSource {
    config: ClientConfig,
    http_client: Client,
    list_url: Url,
    cities_url: Url,
}

impl HttpCitizenSource {
    /// Create a new source; fails if the base URL is not an absolute URL
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base = config.base_url.trim_end_matches('/');
        let list_url = Url::parse(&format!("{}/", base))
            .map_err(|e| CitizensError::Config(format!("Invalid API base URL '{}': {}", config.base_url, e)))?;
        let cities_url = list_url
            .join("cities")
            .map_err(|e| CitizensError::Config(format!("Invalid API base URL '{}': {}", config.base_url, e)))?;
        let http_client = create_custom_client(config.timeout, &config.user_agent)?;

        Ok(Self {
            config,
            http_client,
            list_url,
            cities_url,
        })
    }

    /// Send one GET request; failures are reported as-is, never retried
    async fn execute(&self, url: Url) -> Result<Response> {
        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let hint = if status.is_server_error() {
            Some("The citizens service reported an internal error. Try again later.".to_string())
        } else if status.as_u16() == 404 {
            Some(format!(
                "Check the configured API base URL ({}).",
                self.config.base_url
            ))
        } else {
            None
        };
        Err(CitizensError::api_error(
            status.to_string(),
            format!("Request failed with status {}", status),
            hint,
        ))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CitiesBody {
    Names(Vec<String>),
    Wrapped { cities: Vec<String> },
}

#[async_trait]
impl CitizenSource for HttpCitizenSource {
    async fn fetch_citizens(&self, query: CitizenQuery) -> Result<CitizenPayload> {
        let pairs = query.to_pairs();
        let url = Url::parse_with_params(self.list_url.as_str(), &pairs)
            .map_err(|e| CitizensError::Parse(e.to_string()))?;
        debug!("GET {}", url);

        let response = self.execute(url).await?;
        let body = response.text().await?;
        Ok(CitizenPayload::from_body(&body))
    }

    async fn fetch_cities(&self) -> Result<Vec<String>> {
        debug!("GET {}", self.cities_url);
        let response = self.execute(self.cities_url.clone()).await?;
        let body = response.text().await?;

        match serde_json::from_str::<CitiesBody>(&body) {
            Ok(CitiesBody::Names(names)) | Ok(CitiesBody::Wrapped { cities: names }) => Ok(names),
            Err(e) => {
                warn!("Unexpected cities payload: {}", e);
                Err(CitizensError::MalformedResponse(format!(
                    "cities endpoint returned an unexpected body: {}",
                    e
                )))
            }
        }
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }
}
