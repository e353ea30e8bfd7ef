//! Text rendering of the client panels.
//!
//! Every function is pure: it takes the state it shows and returns the
//! lines to print. Heart state always comes from the [`Library`], so the
//! results grid and the footer agree for the same track id.

use colored::Colorize;

use crate::library::Library;
use crate::player::{CurrentSelection, LyricsState};
use crate::track::Track;

pub const HEART_ON: &str = "♥";
pub const HEART_OFF: &str = "♡";
pub const NO_PREVIEW: &str = "[no preview]";
pub const NO_ARTWORK: &str = "[no artwork]";
pub const LOADING_SONGS: &str = "Loading songs...";
pub const NO_RESULTS: &str = "No results";
pub const NO_FAVOURITES: &str = "No favourites yet";
pub const LOADING_LYRICS: &str = "Loading lyrics...";
pub const LYRICS_PLACEHOLDER: &str = "Select a song to view lyrics";
pub const IDLE_FOOTER: &str = "Select a song to play";

const RULE_WIDTH: usize = 60;

pub fn heart(favorite: bool) -> String {
    if favorite {
        HEART_ON.red().to_string()
    } else {
        HEART_OFF.dimmed().to_string()
    }
}

fn section(title: &str) -> String {
    format!("{}\n{}", title.cyan().bold(), "-".repeat(RULE_WIDTH))
}

pub fn render_header(search_box: &str, status: Option<&str>) -> String {
    let mut out = format!(
        "{} {}",
        "songscout".green().bold(),
        format!("search: {}", search_box).dimmed()
    );
    if let Some(status) = status {
        out.push_str(&format!("\n{}", status.yellow()));
    }
    out
}

pub fn render_results(results: &[Track], loading: bool, library: &Library) -> String {
    let mut lines = vec![section("Results")];

    if loading {
        lines.push(LOADING_SONGS.dimmed().to_string());
    } else if results.is_empty() {
        lines.push(NO_RESULTS.dimmed().to_string());
    } else {
        for (i, track) in results.iter().enumerate() {
            lines.push(render_card(i + 1, track, library.contains(&track.id)));
        }
    }

    lines.join("\n")
}

fn render_card(number: usize, track: &Track, favorite: bool) -> String {
    let mut card = format!(
        "{:>2}. {} {} · {}",
        number,
        heart(favorite),
        track.title.bold(),
        track.artist
    );
    if track.image.is_none() {
        card.push_str(&format!(" {}", NO_ARTWORK.dimmed()));
    }
    if !track.has_preview() {
        card.push_str(&format!(" {}", NO_PREVIEW.dimmed()));
    }
    card
}

pub fn render_sidebar(library: &Library) -> String {
    let mut lines = vec![section("My Library")];

    if library.is_empty() {
        lines.push(NO_FAVOURITES.dimmed().to_string());
    } else {
        for (i, entry) in library.entries().iter().enumerate() {
            lines.push(format!(
                "{:>2}. {} {} · {}",
                i + 1,
                heart(true),
                entry.name,
                entry.artist.dimmed()
            ));
        }
    }

    lines.join("\n")
}

pub fn render_lyrics(selection: Option<&CurrentSelection>) -> String {
    let body = match selection.map(|s| &s.lyrics) {
        None => LYRICS_PLACEHOLDER.dimmed().to_string(),
        Some(LyricsState::Loading) => LOADING_LYRICS.dimmed().to_string(),
        Some(LyricsState::Ready(text)) => text.clone(),
    };
    format!("{}\n{}", section("Lyrics"), body)
}

pub fn render_footer(selection: Option<&CurrentSelection>, playing: bool, library: &Library) -> String {
    let Some(selection) = selection else {
        return format!("{}\n{}", "=".repeat(RULE_WIDTH), IDLE_FOOTER.dimmed());
    };
    let track = &selection.track;

    let state = if !track.has_preview() {
        NO_PREVIEW.dimmed().to_string()
    } else if playing {
        "▶ playing".green().to_string()
    } else {
        "⏸ paused".yellow().to_string()
    };

    format!(
        "{}\n{} {} · {}  {}",
        "=".repeat(RULE_WIDTH),
        heart(library.contains(&track.id)),
        track.title.bold(),
        track.artist,
        state
    )
}

pub fn render_help() -> String {
    [
        section("Commands"),
        "search <text>   search the catalog (also: / <text>)".to_string(),
        "play <n>        play result n".to_string(),
        "fav [n]         toggle favourite of result n, or of the current track".to_string(),
        "lib <n>         play favourite n".to_string(),
        "toggle          play / pause".to_string(),
        "show            redraw".to_string(),
        "quit            exit".to_string(),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{LibraryAction, reduce};
    use crate::player::{PlayerController, SilentAudio};

    fn library_with(tracks: &[&Track]) -> Library {
        tracks.iter().fold(Library::default(), |state, track| {
            reduce(state, LibraryAction::Toggle((*track).clone()))
        })
    }

    #[test]
    fn test_results_states() {
        let library = Library::default();
        assert!(render_results(&[], true, &library).contains(LOADING_SONGS));
        assert!(render_results(&[], false, &library).contains(NO_RESULTS));
    }

    #[test]
    fn test_cards_mark_favorites_and_missing_fields() {
        let liked = Track::mock("1", "Liked", "A");
        let bare = Track {
            image: None,
            preview_url: None,
            ..Track::mock("2", "Bare", "B")
        };
        let library = library_with(&[&liked]);

        let out = render_results(&[liked.clone(), bare], false, &library);
        let lines: Vec<&str> = out.lines().collect();

        let liked_line = lines.iter().find(|l| l.contains("Liked")).unwrap();
        assert!(liked_line.contains(HEART_ON));
        assert!(!liked_line.contains(NO_PREVIEW));

        let bare_line = lines.iter().find(|l| l.contains("Bare")).unwrap();
        assert!(bare_line.contains(HEART_OFF));
        assert!(bare_line.contains(NO_PREVIEW));
        assert!(bare_line.contains(NO_ARTWORK));
    }

    #[test]
    fn test_sidebar() {
        assert!(render_sidebar(&Library::default()).contains(NO_FAVOURITES));

        let library = library_with(&[&Track::mock("1", "First", "A"), &Track::mock("2", "Second", "B")]);
        let out = render_sidebar(&library);
        assert!(out.contains("First"));
        assert!(out.contains("Second"));
        assert!(out.find("First").unwrap() < out.find("Second").unwrap());
    }

    #[test]
    fn test_lyrics_panel() {
        assert!(render_lyrics(None).contains(LYRICS_PLACEHOLDER));

        let mut player = PlayerController::new(SilentAudio::new());
        let ticket = player.select(Track::mock("1", "Song", "Artist"));
        assert!(render_lyrics(player.current()).contains(LOADING_LYRICS));

        player.apply_lyrics(ticket.generation, "first line\nsecond line".into());
        let out = render_lyrics(player.current());
        assert!(out.contains("first line\nsecond line"));
    }

    #[test]
    fn test_footer_uses_current_selection() {
        let library = Library::default();
        assert!(render_footer(None, false, &library).contains(IDLE_FOOTER));

        let mut player = PlayerController::new(SilentAudio::new());
        player.select(Track::mock("1", "Current Song", "Current Artist"));
        let out = render_footer(player.current(), true, &library);
        assert!(out.contains("Current Song"));
        assert!(out.contains("Current Artist"));
        assert!(out.contains("playing"));
    }

    #[test]
    fn test_heart_agrees_between_grid_and_footer() {
        let track = Track::mock("1", "Song", "Artist");
        let mut player = PlayerController::new(SilentAudio::new());
        player.select(track.clone());

        for library in [Library::default(), library_with(&[&track])] {
            let grid = render_results(std::slice::from_ref(&track), false, &library);
            let footer = render_footer(player.current(), true, &library);
            let expected = if library.contains("1") { HEART_ON } else { HEART_OFF };
            assert!(grid.contains(expected));
            assert!(footer.contains(expected));
        }
    }

    #[test]
    fn test_footer_without_preview() {
        let mut player = PlayerController::new(SilentAudio::new());
        player.select(Track {
            preview_url: None,
            ..Track::mock("1", "Quiet", "Artist")
        });
        let out = render_footer(player.current(), false, &Library::default());
        assert!(out.contains(NO_PREVIEW));
    }
}
