use tracing::{debug, warn};

use crate::error::Result;
use crate::player::audio::AudioOutput;
use crate::track::Track;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LyricsState {
    Loading,
    Ready(String),
}

/// The one track currently selected, with its lyrics.
#[derive(Debug, Clone)]
pub struct CurrentSelection {
    pub track: Track,
    pub lyrics: LyricsState,
    generation: u64,
}

/// What a lyrics lookup needs, stamped with the selection it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricsTicket {
    pub generation: u64,
    pub artist: String,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    NothingSelected,
    NoPreview,
    Playing,
    Paused,
}

pub struct PlayerController<A> {
    audio: A,
    selection: Option<CurrentSelection>,
    generation: u64,
}

impl<A: AudioOutput> PlayerController<A> {
    pub fn new(audio: A) -> Self {
        Self {
            audio,
            selection: None,
            generation: 0,
        }
    }

    pub fn current(&self) -> Option<&CurrentSelection> {
        self.selection.as_ref()
    }

    pub fn lyrics_loading(&self) -> bool {
        matches!(
            self.selection.as_ref().map(|s| &s.lyrics),
            Some(LyricsState::Loading)
        )
    }

    pub fn is_playing(&mut self) -> bool {
        self.audio.is_playing()
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    /// Makes `track` current, stops the previous clip and starts the new
    /// one. The returned ticket must be handed back to [`apply_lyrics`].
    ///
    /// [`apply_lyrics`]: PlayerController::apply_lyrics
    pub fn select(&mut self, track: Track) -> LyricsTicket {
        self.generation += 1;
        self.audio.stop();

        match track.preview_url.as_deref() {
            Some(src) => {
                self.audio.load(src);
                if let Err(e) = self.audio.play() {
                    warn!("Could not start preview for {}: {}", track.title, e);
                }
            }
            None => debug!("{} has no preview", track.title),
        }

        let ticket = LyricsTicket {
            generation: self.generation,
            artist: track.artist.clone(),
            title: track.title.clone(),
        };

        self.selection = Some(CurrentSelection {
            track,
            lyrics: LyricsState::Loading,
            generation: self.generation,
        });

        ticket
    }

    /// Stores lyrics for the selection identified by `generation`. Returns
    /// false, and drops the text, when the selection has since changed.
    pub fn apply_lyrics(&mut self, generation: u64, text: String) -> bool {
        match self.selection.as_mut() {
            Some(selection) if selection.generation == generation => {
                selection.lyrics = LyricsState::Ready(text);
                true
            }
            _ => {
                debug!("Discarding lyrics for stale selection {}", generation);
                false
            }
        }
    }

    pub fn toggle_playback(&mut self) -> Result<ToggleOutcome> {
        let Some(selection) = self.selection.as_ref() else {
            return Ok(ToggleOutcome::NothingSelected);
        };
        if !selection.track.has_preview() {
            return Ok(ToggleOutcome::NoPreview);
        }

        if self.audio.is_playing() {
            self.audio.pause();
            Ok(ToggleOutcome::Paused)
        } else {
            self.audio.play()?;
            Ok(ToggleOutcome::Playing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::audio::SilentAudio;

    fn controller() -> PlayerController<SilentAudio> {
        PlayerController::new(SilentAudio::new())
    }

    #[test]
    fn test_select_starts_loading_and_playing() {
        let mut player = controller();
        let ticket = player.select(Track::mock("a", "Song A", "Artist A"));

        assert_eq!(ticket.artist, "Artist A");
        assert_eq!(ticket.title, "Song A");
        assert!(player.lyrics_loading());
        assert!(player.is_playing());
        assert_eq!(player.audio().src(), Some("https://audio.example/a.mp3"));
    }

    #[test]
    fn test_lyrics_apply_to_current_selection() {
        let mut player = controller();
        let ticket = player.select(Track::mock("a", "Song A", "Artist A"));

        assert!(player.apply_lyrics(ticket.generation, "la la".into()));
        assert!(!player.lyrics_loading());
        assert_eq!(
            player.current().unwrap().lyrics,
            LyricsState::Ready("la la".into())
        );
    }

    #[test]
    fn test_stale_lyrics_are_discarded() {
        let mut player = controller();
        let first = player.select(Track::mock("a", "Song A", "Artist A"));
        let second = player.select(Track::mock("b", "Song B", "Artist B"));

        assert!(!player.apply_lyrics(first.generation, "lyrics of A".into()));
        assert_eq!(player.current().unwrap().track.id, "b");
        assert_eq!(player.current().unwrap().lyrics, LyricsState::Loading);

        assert!(player.apply_lyrics(second.generation, "lyrics of B".into()));
        // A late answer for A after B resolved must not overwrite B.
        assert!(!player.apply_lyrics(first.generation, "lyrics of A".into()));
        assert_eq!(
            player.current().unwrap().lyrics,
            LyricsState::Ready("lyrics of B".into())
        );
    }

    #[test]
    fn test_reselecting_same_track_bumps_generation() {
        let mut player = controller();
        let track = Track::mock("a", "Song A", "Artist A");
        let first = player.select(track.clone());
        let second = player.select(track);

        assert!(second.generation > first.generation);
        assert!(!player.apply_lyrics(first.generation, "old".into()));
    }

    #[test]
    fn test_toggle_without_selection_is_noop() {
        let mut player = controller();
        assert_eq!(player.toggle_playback().unwrap(), ToggleOutcome::NothingSelected);
    }

    #[test]
    fn test_toggle_flips_play_state() {
        let mut player = controller();
        player.select(Track::mock("a", "Song A", "Artist A"));

        assert_eq!(player.toggle_playback().unwrap(), ToggleOutcome::Paused);
        assert!(!player.is_playing());
        assert_eq!(player.toggle_playback().unwrap(), ToggleOutcome::Playing);
        assert!(player.is_playing());
    }

    #[test]
    fn test_track_without_preview() {
        let mut player = controller();
        player.select(Track::mock("a", "Song A", "Artist A"));
        let silent = Track {
            preview_url: None,
            ..Track::mock("b", "Song B", "Artist B")
        };

        player.select(silent);

        assert!(!player.is_playing());
        assert_eq!(player.audio().src(), None);
        assert_eq!(player.toggle_playback().unwrap(), ToggleOutcome::NoPreview);
    }
}
