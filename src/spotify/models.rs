use serde::Deserialize;

use crate::track::{Track, UNKNOWN_ARTIST, UNKNOWN_TITLE};

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: Option<String>,
    #[allow(dead_code)]
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub tracks: Option<TrackPage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackPage {
    #[serde(default)]
    pub items: Vec<CatalogTrack>,
}

/// A track item as returned by the catalog search endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct CatalogTrack {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub artists: Vec<CatalogArtist>,
    pub album: Option<CatalogAlbum>,
    pub preview_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CatalogArtist {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CatalogAlbum {
    #[serde(default)]
    pub images: Vec<CatalogImage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CatalogImage {
    pub url: Option<String>,
}

impl CatalogTrack {
    /// Simplifies a catalog item. Local files carry no id and are skipped.
    pub fn into_track(self) -> Option<Track> {
        let id = non_empty(self.id)?;

        let artist = self
            .artists
            .into_iter()
            .next()
            .and_then(|a| non_empty(a.name))
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

        let image = self
            .album
            .and_then(|album| album.images.into_iter().next())
            .and_then(|img| non_empty(img.url));

        Some(Track {
            id,
            title: non_empty(self.name).unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            artist,
            image,
            preview_url: non_empty(self.preview_url),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
