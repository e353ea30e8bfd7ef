use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use url::Url;

use crate::error::{AppError, Result};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";
pub const DEFAULT_LYRICS_API_BASE: &str = "https://api.lyrics.ovh";
pub const DEFAULT_PROXY_URL: &str = "http://localhost:3000";
pub const DEFAULT_PLAYER: &str = "mpv --no-video --really-quiet";
const DEFAULT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub port: u16,
    pub token_url: String,
    pub api_base: String,
    pub lyrics_api_base: String,
    pub proxy_url: String,
    pub data_dir: PathBuf,
    /// External command used to play previews. `None` disables audio.
    pub player_command: Option<String>,
    pub token_cache: bool,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string());

        let port = match var("PORT").filter(|v| !v.is_empty()) {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| AppError::Config(format!("PORT is not a valid port: {}", raw)))?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match var("SONGSCOUT_TIMEOUT_SECS").filter(|v| !v.is_empty()) {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                AppError::Config(format!("SONGSCOUT_TIMEOUT_SECS is not a number: {}", raw))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let token_url = url_var(&var, "SPOTIFY_TOKEN_URL", DEFAULT_TOKEN_URL)?;
        let api_base = url_var(&var, "SPOTIFY_API_BASE", DEFAULT_API_BASE)?;
        let lyrics_api_base = url_var(&var, "LYRICS_API_BASE", DEFAULT_LYRICS_API_BASE)?;
        let proxy_url = url_var(&var, "SONGSCOUT_PROXY_URL", DEFAULT_PROXY_URL)?;

        let data_dir = var("SONGSCOUT_DATA_DIR")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        // An explicitly empty SONGSCOUT_PLAYER turns audio off.
        let player_command = match var("SONGSCOUT_PLAYER") {
            Some(cmd) if cmd.is_empty() => None,
            Some(cmd) => Some(cmd),
            None => Some(DEFAULT_PLAYER.to_string()),
        };

        let token_cache = var("SONGSCOUT_TOKEN_CACHE")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            spotify_client_id: var("SPOTIFY_CLIENT_ID").unwrap_or_default(),
            spotify_client_secret: var("SPOTIFY_CLIENT_SECRET").unwrap_or_default(),
            port,
            token_url,
            api_base,
            lyrics_api_base,
            proxy_url,
            data_dir,
            player_command,
            token_cache,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn get_missing_config(&self) -> Vec<String> {
        let mut missing = Vec::new();

        if self.spotify_client_id.is_empty() {
            missing.push("SPOTIFY_CLIENT_ID".to_string());
        }
        if self.spotify_client_secret.is_empty() {
            missing.push("SPOTIFY_CLIENT_SECRET".to_string());
        }

        missing
    }

    pub fn validate_spotify_config(&self) -> bool {
        self.get_missing_config().is_empty()
    }
}

fn url_var<F>(var: &F, key: &str, default: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = var(key)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string());
    Url::parse(&raw).map_err(|e| AppError::Config(format!("{} is not a valid URL: {}", key, e)))?;
    Ok(raw.trim_end_matches('/').to_string())
}

fn default_data_dir() -> PathBuf {
    ProjectDirs::from("dev", "songscout", "songscout")
        .map(|p| p.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("songscout"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.lyrics_api_base, DEFAULT_LYRICS_API_BASE);
        assert_eq!(config.player_command.as_deref(), Some(DEFAULT_PLAYER));
        assert!(!config.token_cache);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_credentials_are_reported() {
        let config = Config::from_lookup(lookup(&[("SPOTIFY_CLIENT_ID", "abc")])).unwrap();

        assert_eq!(config.get_missing_config(), vec!["SPOTIFY_CLIENT_SECRET"]);
        assert!(!config.validate_spotify_config());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("SPOTIFY_CLIENT_ID", "id"),
            ("SPOTIFY_CLIENT_SECRET", "secret"),
            ("PORT", "8081"),
            ("SPOTIFY_API_BASE", "http://127.0.0.1:9000/v1/"),
            ("SONGSCOUT_PLAYER", ""),
            ("SONGSCOUT_TOKEN_CACHE", "true"),
            ("SONGSCOUT_DATA_DIR", "/tmp/songscout-test"),
        ]))
        .unwrap();

        assert!(config.validate_spotify_config());
        assert_eq!(config.port, 8081);
        assert_eq!(config.api_base, "http://127.0.0.1:9000/v1");
        assert!(config.player_command.is_none());
        assert!(config.token_cache);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/songscout-test"));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = Config::from_lookup(lookup(&[("PORT", "not-a-port")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let err = Config::from_lookup(lookup(&[("LYRICS_API_BASE", "nope")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
