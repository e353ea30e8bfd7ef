pub mod app;
pub mod config;
pub mod error;
pub mod library;
pub mod lyrics;
pub mod player;
pub mod server;
pub mod spotify;
pub mod track;
pub mod view;

#[cfg(test)]
pub(crate) mod test_support;

pub use app::{App, Services};
pub use config::Config;
pub use error::{AppError, Result};
pub use library::{FileStore, LibraryStore};
pub use lyrics::LyricsClient;
pub use player::PlayerController;
pub use spotify::CatalogClient;
pub use track::{FavoriteEntry, Track};
