use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::track::Track;

/// Talks to the search proxy from the client side.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    http_client: Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.proxy_url, config.timeout)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Track>> {
        let response = self
            .http_client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", query)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            warn!("Proxy search failed ({}): {}", status, message);
            return Err(AppError::CatalogApi(message));
        }

        let items: Vec<Value> = response.json().await?;
        let tracks: Vec<Track> = items.iter().filter_map(Track::normalize).collect();
        debug!("Proxy returned {} tracks for {:?}", tracks.len(), query);
        Ok(tracks)
    }
}
