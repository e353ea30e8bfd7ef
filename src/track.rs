use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const UNKNOWN_TITLE: &str = "Untitled";
pub const UNKNOWN_ARTIST: &str = "Unknown artist";

/// A playable search result. `id` is the only equality key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub image: Option<String>,
    #[serde(rename = "previewUrl", alias = "preview", alias = "preview_url")]
    pub preview_url: Option<String>,
}

/// The projection of a [`Track`] kept in the library.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FavoriteEntry {
    pub id: String,
    pub name: String,
    pub artist: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl Track {
    pub fn has_preview(&self) -> bool {
        self.preview_url.is_some()
    }

    /// Builds a track out of any of the record shapes the client deals
    /// with: catalog items, proxy output, favorite entries and
    /// iTunes-style search records. Returns `None` when no id is present.
    pub fn normalize(value: &Value) -> Option<Self> {
        let id = first_id(value, &["trackId", "id"])?;

        let title = first_str(value, &["trackName", "title", "name"])
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

        let artist = first_str(value, &["artistName", "artist"])
            .or_else(|| str_at(value.pointer("/artists/0/name")))
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

        let image = first_str(value, &["artworkUrl100", "image"])
            .or_else(|| str_at(value.pointer("/album/images/0/url")));

        let preview_url = first_str(value, &["previewUrl", "preview", "preview_url"]);

        Some(Self {
            id,
            title,
            artist,
            image,
            preview_url,
        })
    }
}

impl From<&Track> for FavoriteEntry {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id.clone(),
            name: track.title.clone(),
            artist: track.artist.clone(),
            image: track.image.clone(),
        }
    }
}

impl From<&FavoriteEntry> for Track {
    fn from(entry: &FavoriteEntry) -> Self {
        Self {
            id: entry.id.clone(),
            title: entry.name.clone(),
            artist: entry.artist.clone(),
            image: entry.image.clone(),
            preview_url: None,
        }
    }
}

fn str_at(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn first_str(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| str_at(value.get(*key)))
}

fn first_id(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(*key)? {
        Value::Number(n) => Some(n.to_string()),
        other => str_at(Some(other)),
    })
}

#[cfg(test)]
impl Track {
    pub fn mock(id: &str, title: &str, artist: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            artist: artist.to_string(),
            image: Some(format!("https://img.example/{}.jpg", id)),
            preview_url: Some(format!("https://audio.example/{}.mp3", id)),
        }
    }
}
