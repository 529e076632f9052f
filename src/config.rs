//! Configuration management for rplsync.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory. The process reads them once into a
//! [`Config`] and passes that value down; nothing else reads the environment.
//!
//! Lookup order:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Built-in defaults for everything but the user and client ids

use std::{env, path::PathBuf};

use crate::{error::ConfigError, sync::BlackoutWindow};

/// Scopes the credential must carry to read and modify playlists.
pub const SPOTIFY_SCOPE: &str = "playlist-read-private playlist-modify-private playlist-modify-public";

pub const DEFAULT_PLAYLIST_NAME: &str = "Triple J Recently Played";
pub const DEFAULT_PLAYLIST_DESCRIPTION: &str = "Playlist for Triple J's recently played songs.";
pub const DEFAULT_FEED_URL: &str = "https://music.abcradio.net.au/api/v1/plays.json";
pub const DEFAULT_FEED_LIMIT: u32 = 50;
pub const DEFAULT_FEED_SERVICE_ID: &str = "triplej";
/// "The Racket", Tuesday nights.
pub const DEFAULT_BLACKOUT_WINDOWS: &str = "tue 22:00 - wed 01:00";

#[derive(Debug, Clone)]
pub struct Config {
    pub user_id: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub server_addr: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub scope: String,
    pub playlist_name: String,
    pub playlist_description: String,
    pub feed_url: String,
    pub feed_limit: u32,
    pub feed_service_id: String,
    pub blackout_windows: Vec<BlackoutWindow>,
}

/// Loads environment variables from `<data_local_dir>/rplsync/.env`.
///
/// Creates the directory when it does not exist yet. A missing `.env` file
/// is not an error; settings may come from the process environment alone.
///
/// The file lives in:
/// - Linux: `~/.local/share/rplsync/.env`
/// - macOS: `~/Library/Application Support/rplsync/.env`
/// - Windows: `%LOCALAPPDATA%/rplsync/.env`
pub async fn load_env() -> Result<(), ConfigError> {
    let path = env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| ConfigError::Invalid {
            key: ".env",
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

fn env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("rplsync/.env");
    path
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));
        let or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let feed_limit = match get("FEED_LIMIT") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    key: "FEED_LIMIT",
                    reason: format!("'{}' is not a positive number", raw),
                })?,
            None => DEFAULT_FEED_LIMIT,
        };

        let blackout_windows = parse_blackout_windows(&or_default(
            "BLACKOUT_WINDOWS",
            DEFAULT_BLACKOUT_WINDOWS,
        ))?;

        Ok(Config {
            user_id: required("SPOTIFY_USER_ID")?,
            client_id: required("SPOTIFY_API_AUTH_CLIENT_ID")?,
            redirect_uri: or_default("SPOTIFY_API_REDIRECT_URI", "http://127.0.0.1:8888/callback"),
            server_addr: or_default("SERVER_ADDRESS", "127.0.0.1:8888"),
            auth_url: or_default("SPOTIFY_API_AUTH_URL", "https://accounts.spotify.com/authorize"),
            token_url: or_default("SPOTIFY_API_TOKEN_URL", "https://accounts.spotify.com/api/token"),
            api_url: or_default("SPOTIFY_API_URL", "https://api.spotify.com/v1")
                .trim_end_matches('/')
                .to_string(),
            scope: SPOTIFY_SCOPE.to_string(),
            playlist_name: or_default("PLAYLIST_NAME", DEFAULT_PLAYLIST_NAME),
            playlist_description: or_default("PLAYLIST_DESCRIPTION", DEFAULT_PLAYLIST_DESCRIPTION),
            feed_url: or_default("FEED_URL", DEFAULT_FEED_URL),
            feed_limit,
            feed_service_id: or_default("FEED_SERVICE_ID", DEFAULT_FEED_SERVICE_ID),
            blackout_windows,
        })
    }
}

/// Parses a `;`-separated list of windows such as `tue 22:00 - wed 01:00`.
pub fn parse_blackout_windows(raw: &str) -> Result<Vec<BlackoutWindow>, ConfigError> {
    raw.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<BlackoutWindow>()
                .map_err(|reason| ConfigError::Invalid {
                    key: "BLACKOUT_WINDOWS",
                    reason,
                })
        })
        .collect()
}
