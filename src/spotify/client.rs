use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::spotify::auth::{ClientCredentialsProvider, CredentialProvider};
use crate::spotify::models::{CatalogTrack, SearchResponse};
use crate::track::Track;

pub const SEARCH_LIMIT: usize = 12;

/// Searches the catalog on behalf of the proxy, authenticating with
/// whatever [`CredentialProvider`] it was built with.
pub struct CatalogClient<P = ClientCredentialsProvider> {
    http_client: Client,
    api_base: String,
    credentials: P,
}

impl CatalogClient<ClientCredentialsProvider> {
    pub fn from_config(config: &Config) -> Result<Self> {
        let http_client = Client::builder().timeout(config.timeout).build()?;
        let credentials = ClientCredentialsProvider::new(http_client.clone(), config);
        Ok(Self::new(http_client, &config.api_base, credentials))
    }
}

impl<P: CredentialProvider> CatalogClient<P> {
    pub fn new(http_client: Client, api_base: &str, credentials: P) -> Self {
        Self {
            http_client,
            api_base: api_base.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// Runs a track search and returns at most [`SEARCH_LIMIT`] simplified
    /// tracks. Any failure fails the whole search.
    pub async fn search(&self, query: &str) -> Result<Vec<Track>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidQuery("query must not be empty".into()));
        }

        let token = self.credentials.access_token().await?;

        let url = format!("{}/search", self.api_base);
        let limit = SEARCH_LIMIT.to_string();

        debug!("Searching catalog for {:?}", query);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&token)
            .query(&[("q", query), ("type", "track"), ("limit", limit.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!("Catalog search failed ({}): {}", status, error_text);
            return Err(AppError::CatalogApi(format!(
                "search returned {}: {}",
                status, error_text
            )));
        }

        let search_response: SearchResponse = response.json().await?;

        let page = search_response
            .tracks
            .ok_or_else(|| AppError::CatalogApi("search response has no tracks".into()))?;

        let tracks: Vec<Track> = page
            .items
            .into_iter()
            .filter_map(CatalogTrack::into_track)
            .take(SEARCH_LIMIT)
            .collect();

        info!("Catalog search {:?} returned {} tracks", query, tracks.len());
        Ok(tracks)
    }
}
