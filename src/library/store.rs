use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::library::storage::KeyValueStore;
use crate::track::{FavoriteEntry, Track};

/// Storage key holding the JSON array of favorites.
pub const LIBRARY_KEY: &str = "myLibrary";

/// The favorite set, in the order entries were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Library {
    entries: Vec<FavoriteEntry>,
}

#[derive(Debug, Clone)]
pub enum LibraryAction {
    /// Replace the whole set, e.g. after reading storage.
    Load(Vec<FavoriteEntry>),
    /// Remove the track if present, add its projection otherwise.
    Toggle(Track),
}

impl Library {
    pub fn entries(&self) -> &[FavoriteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }
}

/// Pure state transition for the favorite set.
pub fn reduce(state: Library, action: LibraryAction) -> Library {
    match action {
        LibraryAction::Load(entries) => {
            let mut deduped: Vec<FavoriteEntry> = Vec::with_capacity(entries.len());
            for entry in entries {
                if !deduped.iter().any(|e| e.id == entry.id) {
                    deduped.push(entry);
                }
            }
            Library { entries: deduped }
        }
        LibraryAction::Toggle(track) => {
            let mut entries = state.entries;
            if entries.iter().any(|e| e.id == track.id) {
                entries.retain(|e| e.id != track.id);
            } else {
                entries.push(FavoriteEntry::from(&track));
            }
            Library { entries }
        }
    }
}

/// Parses a persisted blob. Anything unreadable counts as an empty library.
pub fn parse_library(raw: Option<&str>) -> Vec<FavoriteEntry> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    match serde_json::from_str::<Option<Vec<FavoriteEntry>>>(raw) {
        Ok(entries) => entries.unwrap_or_default(),
        Err(e) => {
            warn!("Ignoring malformed favorites data: {}", e);
            Vec::new()
        }
    }
}

/// Favorites held in memory and mirrored to a [`KeyValueStore`] on every
/// change.
pub struct LibraryStore<S> {
    storage: S,
    state: Library,
}

impl<S: KeyValueStore> LibraryStore<S> {
    /// Rehydrates the library from storage. Never fails: unreadable or
    /// malformed data yields an empty library.
    pub fn load(storage: S) -> Self {
        let raw = match storage.get(LIBRARY_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to read favorites: {}", e);
                None
            }
        };

        let state = reduce(
            Library::default(),
            LibraryAction::Load(parse_library(raw.as_deref())),
        );
        debug!("Loaded {} favorites", state.len());

        Self { storage, state }
    }

    pub fn library(&self) -> &Library {
        &self.state
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.state.contains(id)
    }

    /// Toggles a track and rewrites the persisted blob. The in-memory change
    /// stays committed even when the write fails.
    pub fn toggle(&mut self, track: &Track) -> Result<&Library> {
        self.dispatch(LibraryAction::Toggle(track.clone()));
        self.persist()?;
        Ok(&self.state)
    }

    fn dispatch(&mut self, action: LibraryAction) {
        let current = std::mem::take(&mut self.state);
        self.state = reduce(current, action);
    }

    fn persist(&mut self) -> Result<()> {
        let json = serde_json::to_string(self.state.entries())?;
        self.storage
            .set(LIBRARY_KEY, &json)
            .map_err(|e| AppError::Storage(format!("failed to save favorites: {}", e)))
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}
