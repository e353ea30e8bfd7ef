use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::ProgressBar;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use songscout::app::{self, ProxyClient, Services};
use songscout::player::{AudioOutput, CommandAudio, SilentAudio};
use songscout::{App, Config, FileStore, LibraryStore, LyricsClient, PlayerController, server, view};

#[derive(Parser)]
#[command(name = "songscout")]
#[command(about = "Search songs, preview clips, read lyrics and keep favourites")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the search proxy that holds the catalog credentials
    Serve {
        /// Port to listen on (or set PORT env var)
        #[arg(long, env = "PORT")]
        port: Option<u16>,
    },

    /// Open the interactive client
    Browse {
        /// Search to run on start
        #[arg(long, default_value = "pop")]
        query: String,

        /// Do not play previews
        #[arg(long)]
        no_audio: bool,
    },

    /// Search once through the proxy and print the results
    Search {
        /// Free-text query
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Print the lyrics of a song
    Lyrics {
        artist: String,
        title: String,
    },

    /// List your favourites
    Favorites,

    /// Show setup guide
    Setup,
}

fn setup_tracing(verbose: bool, default_level: &str) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(default_level)
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The interactive client owns the terminal; keep logs quiet there.
    let default_level = match cli.command {
        Commands::Serve { .. } => "info",
        _ => "warn",
    };
    setup_tracing(cli.verbose, default_level);

    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Serve { port } => serve(config, port).await?,
        Commands::Browse { query, no_audio } => browse(config, query, no_audio).await?,
        Commands::Search { query } => search(&config, &query.join(" ")).await?,
        Commands::Lyrics { artist, title } => lyrics(&config, &artist, &title).await?,
        Commands::Favorites => favorites(&config),
        Commands::Setup => show_setup_guide(),
    }

    Ok(())
}

async fn serve(mut config: Config, port: Option<u16>) -> Result<()> {
    let missing = config.get_missing_config();
    if !missing.is_empty() {
        println!("{}", "Missing configuration:".red());
        for item in &missing {
            println!("   - {}", item);
        }
        println!(
            "\n{}",
            "Please copy .env.example to .env and fill in your credentials.".yellow()
        );
        std::process::exit(1);
    }

    if let Some(port) = port {
        config.port = port;
    }

    server::run(&config).await.context("Search proxy failed")?;
    Ok(())
}

async fn browse(config: Config, query: String, no_audio: bool) -> Result<()> {
    let library = LibraryStore::load(FileStore::new(&config.data_dir));

    let audio: Box<dyn AudioOutput> = match config.player_command.as_deref() {
        Some(command) if !no_audio => {
            Box::new(CommandAudio::new(command).context("Invalid player command")?)
        }
        _ => Box::new(SilentAudio::new()),
    };

    let services = Services::from_config(&config).context("Failed to build HTTP clients")?;
    let app = App::new(library, PlayerController::new(audio));

    println!("{}", "songscout".green().bold());
    println!("Type {} for commands.", "help".cyan());

    app::run(app, services, Some(query)).await?;
    Ok(())
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

async fn search(config: &Config, query: &str) -> Result<()> {
    let client = ProxyClient::from_config(config).context("Failed to build HTTP client")?;
    let library = LibraryStore::load(FileStore::new(&config.data_dir));

    let pb = spinner(format!("Searching for {}", query));
    let result = client.search(query).await;
    pb.finish_and_clear();

    let tracks = result.with_context(|| format!("Search through {} failed", config.proxy_url))?;
    println!("{}", view::render_results(&tracks, false, library.library()));
    Ok(())
}

async fn lyrics(config: &Config, artist: &str, title: &str) -> Result<()> {
    let client = LyricsClient::from_config(config).context("Failed to build HTTP client")?;

    let pb = spinner(view::LOADING_LYRICS.to_string());
    let text = client.fetch_lyrics(artist, title).await;
    pb.finish_and_clear();

    println!("{} {}", title.bold(), format!("· {}", artist).dimmed());
    println!("{}", text);
    Ok(())
}

fn favorites(config: &Config) {
    let library = LibraryStore::load(FileStore::new(&config.data_dir));
    println!("{}", view::render_sidebar(library.library()));
}

fn show_setup_guide() {
    println!("{}", "songscout Setup Guide".cyan().bold());
    println!("{}", "=".repeat(50));

    println!("\n{}", "1. Spotify API Setup".yellow());
    println!("   - Go to https://developer.spotify.com/dashboard/");
    println!("   - Create a new app");
    println!("   - Copy your Client ID and Client Secret");

    println!("\n{}", "2. Configuration".yellow());
    println!("   - Create a .env file next to where you run the proxy with:");
    println!("     SPOTIFY_CLIENT_ID=your_spotify_client_id");
    println!("     SPOTIFY_CLIENT_SECRET=your_spotify_client_secret");
    println!("     PORT=3000                      (optional)");
    println!("     SONGSCOUT_TOKEN_CACHE=true     (optional, reuse tokens until expiry)");
    println!("     SONGSCOUT_PLAYER=\"mpv --no-video --really-quiet\"  (optional)");

    println!("\n{}", "3. Usage".yellow());
    println!("   - songscout serve                   (start the search proxy)");
    println!("   - songscout browse                  (interactive client)");
    println!("   - songscout search daft punk        (one-shot search)");
    println!("   - songscout lyrics Coldplay Yellow  (print lyrics)");
    println!("   - songscout favorites               (list favourites)");

    println!("\n{}", "Ready to start listening!".green());
}
