use std::io::{self, Write};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::app::search::ProxyClient;
use crate::app::{App, Command, Effect, Event};
use crate::config::Config;
use crate::error::Result;
use crate::library::KeyValueStore;
use crate::lyrics::LyricsClient;
use crate::player::AudioOutput;

/// Network clients used to carry out [`Effect`]s.
#[derive(Debug, Clone)]
pub struct Services {
    search: ProxyClient,
    lyrics: LyricsClient,
}

impl Services {
    pub fn new(search: ProxyClient, lyrics: LyricsClient) -> Self {
        Self { search, lyrics }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            ProxyClient::from_config(config)?,
            LyricsClient::from_config(config)?,
        ))
    }

    /// Runs one effect to completion. `Quit` produces no event.
    pub async fn execute(&self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::Search { generation, query } => {
                let result = self.search.search(&query).await.map_err(|e| e.to_string());
                Some(Event::SearchFinished { generation, result })
            }
            Effect::FetchLyrics(ticket) => {
                let text = self.lyrics.fetch_lyrics(&ticket.artist, &ticket.title).await;
                Some(Event::LyricsLoaded {
                    generation: ticket.generation,
                    text,
                })
            }
            Effect::Quit => None,
        }
    }

    /// Runs an effect in the background and posts its event to `tx`.
    pub fn spawn(&self, effect: Effect, tx: mpsc::UnboundedSender<Event>) {
        let services = self.clone();
        tokio::spawn(async move {
            if let Some(event) = services.execute(effect).await {
                // The receiver is gone only when the client is shutting down.
                tx.send(event).ok();
            }
        });
    }
}

fn redraw<S: KeyValueStore, A: AudioOutput>(app: &mut App<S, A>) {
    println!("\n{}", app.render());
    print!("> ");
    io::stdout().flush().ok();
}

/// Drives the interactive client: reads commands from stdin and applies
/// network completions as they arrive, one at a time.
pub async fn run<S, A>(mut app: App<S, A>, services: Services, initial_query: Option<String>) -> Result<()>
where
    S: KeyValueStore,
    A: AudioOutput,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if let Some(query) = initial_query.filter(|q| !q.trim().is_empty()) {
        for effect in app.handle_command(Command::Search(query)) {
            services.spawn(effect, tx.clone());
        }
    }
    redraw(&mut app);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed");
                    break;
                };
                match line.parse::<Command>() {
                    Ok(command) => {
                        let effects = app.handle_command(command);
                        if effects.contains(&Effect::Quit) {
                            break;
                        }
                        for effect in effects {
                            services.spawn(effect, tx.clone());
                        }
                    }
                    Err(message) => app.set_status(message),
                }
                redraw(&mut app);
            }
            Some(event) = rx.recv() => {
                app.handle_event(event);
                redraw(&mut app);
            }
        }
    }

    info!("Client closed");
    Ok(())
}
