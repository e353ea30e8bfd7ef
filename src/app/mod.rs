//! The interactive client's composition root.
//!
//! [`App`] owns all client state. User commands and network completions
//! both come in as values and are applied synchronously; anything that
//! needs the network goes back out as an [`Effect`] for the runner to
//! execute.

pub mod runner;
pub mod search;

use std::str::FromStr;

use tracing::warn;

use crate::library::{KeyValueStore, LibraryStore};
use crate::player::{AudioOutput, LyricsTicket, PlayerController, ToggleOutcome};
use crate::track::Track;
use crate::view;

pub use runner::{Services, run};
pub use search::ProxyClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Play(usize),
    /// Toggle a result by number, or the current track.
    Favorite(Option<usize>),
    PlayFavorite(usize),
    TogglePlayback,
    Show,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let number = |what: &str| -> Result<usize, String> {
            rest.parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| format!("usage: {} <number>", what))
        };

        match word.to_lowercase().as_str() {
            "search" | "/" | "s" => {
                if rest.is_empty() {
                    Err("usage: search <text>".into())
                } else {
                    Ok(Command::Search(rest.to_string()))
                }
            }
            "play" | "p" => number("play").map(Command::Play),
            "fav" | "f" => {
                if rest.is_empty() {
                    Ok(Command::Favorite(None))
                } else {
                    number("fav").map(|n| Command::Favorite(Some(n)))
                }
            }
            "lib" | "l" => number("lib").map(Command::PlayFavorite),
            "toggle" | "t" | "pause" => Ok(Command::TogglePlayback),
            "show" | "" => Ok(Command::Show),
            "help" | "h" | "?" => Ok(Command::Help),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command: {} (try help)", other)),
        }
    }
}

/// Completion of a network call started by an [`Effect`].
#[derive(Debug, Clone)]
pub enum Event {
    SearchFinished {
        generation: u64,
        result: Result<Vec<Track>, String>,
    },
    LyricsLoaded {
        generation: u64,
        text: String,
    },
}

/// Work the runner must do on the app's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Search { generation: u64, query: String },
    FetchLyrics(LyricsTicket),
    Quit,
}

pub struct App<S, A> {
    search_box: String,
    results: Vec<Track>,
    results_loading: bool,
    search_generation: u64,
    library: LibraryStore<S>,
    player: PlayerController<A>,
    status: Option<String>,
    show_help: bool,
}

impl<S: KeyValueStore, A: AudioOutput> App<S, A> {
    pub fn new(library: LibraryStore<S>, player: PlayerController<A>) -> Self {
        Self {
            search_box: String::new(),
            results: Vec::new(),
            results_loading: false,
            search_generation: 0,
            library,
            player,
            status: None,
            show_help: false,
        }
    }

    pub fn results(&self) -> &[Track] {
        &self.results
    }

    pub fn results_loading(&self) -> bool {
        self.results_loading
    }

    pub fn library(&self) -> &LibraryStore<S> {
        &self.library
    }

    pub fn player(&self) -> &PlayerController<A> {
        &self.player
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    pub fn handle_command(&mut self, command: Command) -> Vec<Effect> {
        self.status = None;
        self.show_help = false;

        match command {
            Command::Search(query) => {
                self.search_generation += 1;
                self.search_box = query.clone();
                self.results_loading = true;
                vec![Effect::Search {
                    generation: self.search_generation,
                    query,
                }]
            }
            Command::Play(n) => match nth(&self.results, n).cloned() {
                Some(track) => vec![self.select(track)],
                None => {
                    self.set_status(format!("no result #{}", n));
                    Vec::new()
                }
            },
            Command::PlayFavorite(n) => match nth(self.library.library().entries(), n) {
                Some(entry) => {
                    // Favorites keep no preview; reuse it when the track is in the results.
                    let track = self
                        .results
                        .iter()
                        .find(|t| t.id == entry.id)
                        .cloned()
                        .unwrap_or_else(|| Track::from(entry));
                    vec![self.select(track)]
                }
                None => {
                    self.set_status(format!("no favourite #{}", n));
                    Vec::new()
                }
            },
            Command::Favorite(target) => {
                let track = match target {
                    Some(n) => nth(&self.results, n).cloned(),
                    None => self.player.current().map(|s| s.track.clone()),
                };
                match track {
                    Some(track) => self.toggle_favorite(&track),
                    None => self.set_status("nothing to favourite"),
                }
                Vec::new()
            }
            Command::TogglePlayback => {
                match self.player.toggle_playback() {
                    Ok(ToggleOutcome::NothingSelected) => self.set_status("nothing selected"),
                    Ok(ToggleOutcome::NoPreview) => self.set_status("no preview for this track"),
                    Ok(_) => {}
                    Err(e) => self.set_status(format!("playback failed: {}", e)),
                }
                Vec::new()
            }
            Command::Show => Vec::new(),
            Command::Help => {
                self.show_help = true;
                Vec::new()
            }
            Command::Quit => vec![Effect::Quit],
        }
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::SearchFinished { generation, result } => {
                if generation != self.search_generation {
                    return;
                }
                self.results_loading = false;
                match result {
                    Ok(tracks) => self.results = tracks,
                    Err(message) => {
                        self.results = Vec::new();
                        self.set_status(format!("search failed: {}", message));
                    }
                }
            }
            Event::LyricsLoaded { generation, text } => {
                self.player.apply_lyrics(generation, text);
            }
        }
    }

    fn select(&mut self, track: Track) -> Effect {
        Effect::FetchLyrics(self.player.select(track))
    }

    fn toggle_favorite(&mut self, track: &Track) {
        if let Err(e) = self.library.toggle(track) {
            warn!("{}", e);
            self.set_status(format!("favourites not saved: {}", e));
        }
    }

    pub fn render(&mut self) -> String {
        let playing = self.player.is_playing();
        let library = self.library.library();
        let selection = self.player.current();

        let mut panels = vec![
            view::render_header(&self.search_box, self.status.as_deref()),
            view::render_results(&self.results, self.results_loading, library),
            view::render_sidebar(library),
            view::render_lyrics(selection),
        ];
        if self.show_help {
            panels.push(view::render_help());
        }
        panels.push(view::render_footer(selection, playing, library));
        panels.join("\n\n")
    }
}

/// One-based lookup, as shown in the panels.
fn nth<T>(items: &[T], n: usize) -> Option<&T> {
    n.checked_sub(1).and_then(|i| items.get(i))
}
