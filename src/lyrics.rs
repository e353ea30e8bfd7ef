//! lyrics.ovh client.
//!
//! Lookups are keyed by artist and title embedded in the request path.
//! The client never fails: anything short of a usable lyrics body
//! resolves to [`LYRICS_FALLBACK`].

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::Result;

pub const LYRICS_FALLBACK: &str = "Lyrics not available.";

#[derive(Debug, Deserialize)]
struct LyricsResponse {
    lyrics: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LyricsClient {
    http_client: Client,
    base_url: String,
}

impl LyricsClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.lyrics_api_base, config.timeout)
    }

    /// Fetches lyrics for a track, or the fallback text.
    pub async fn fetch_lyrics(&self, artist: &str, title: &str) -> String {
        match self.try_fetch(artist, title).await {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!("No lyrics for {} - {}", artist, title);
                LYRICS_FALLBACK.to_string()
            }
            Err(e) => {
                warn!("Lyrics lookup for {} - {} failed: {}", artist, title, e);
                LYRICS_FALLBACK.to_string()
            }
        }
    }

    async fn try_fetch(&self, artist: &str, title: &str) -> Result<Option<String>> {
        let url = lyrics_url(&self.base_url, artist, title);

        let response = self.http_client.get(&url).send().await?;
        if !response.status().is_success() {
            debug!("Lyrics endpoint returned {}", response.status());
            return Ok(None);
        }

        let body: LyricsResponse = response.json().await?;
        Ok(body.lyrics.map(|text| clean_lyrics(&text)).filter(|t| !t.is_empty()))
    }
}

fn lyrics_url(base: &str, artist: &str, title: &str) -> String {
    format!(
        "{}/v1/{}/{}",
        base,
        urlencoding::encode(artist.trim()),
        urlencoding::encode(title.trim())
    )
}

fn clean_lyrics(text: &str) -> String {
    text.replace("\r\n", "\n").trim().to_string()
}
