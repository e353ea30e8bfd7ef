pub mod audio;
pub mod controller;

pub use audio::{AudioOutput, CommandAudio, SilentAudio};
pub use controller::{CurrentSelection, LyricsState, LyricsTicket, PlayerController, ToggleOutcome};
