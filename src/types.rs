use std::{collections::HashSet, fmt};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// A track the station played, normalized from one feed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedTrack {
    pub title: String,
    pub artist: String,
    pub played_at: DateTime<FixedOffset>,
    pub service_tag: String,
}

/// URI-form track identifier as returned by search, e.g. `spotify:track:4uLU6hMCjMI75M1A2tKUQC`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackUri(String);

impl TrackUri {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last colon-delimited segment, which is what playlists store.
    pub fn id(&self) -> &str {
        self.0.rsplit(':').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for TrackUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedTrack {
    pub played_track: PlayedTrack,
    pub track_uri: Option<TrackUri>,
}

/// Fresh snapshot of the destination playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistState {
    pub playlist_id: String,
    pub owner_id: String,
    pub track_ids: HashSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    pub owner_id: String,
}

/// Counters of a single synchronizer pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub added: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Counters of a full run, from feed fetch to the last add.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub fetched: usize,
    pub ignored: usize,
    pub unresolved: usize,
    pub added: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewStatus {
    Ignored,
    Unresolved,
    Present,
    New,
}

impl fmt::Display for PreviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PreviewStatus::Ignored => "ignored",
            PreviewStatus::Unresolved => "unresolved",
            PreviewStatus::Present => "present",
            PreviewStatus::New => "new",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Tabled)]
pub struct PreviewRow {
    #[tabled(rename = "played at")]
    pub played_at: String,
    pub title: String,
    pub artist: String,
    pub status: PreviewStatus,
}

// Feed wire format

/// Feed page. Items stay untyped until their service is known, so entries of
/// other services never have to match [`FeedItem`].
#[derive(Debug, Clone, Deserialize)]
pub struct FeedResponse {
    pub items: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedItem {
    pub service_id: String,
    pub played_time: Option<String>,
    pub recording: Option<FeedRecording>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedRecording {
    pub title: String,
    #[serde(default)]
    pub artists: Vec<FeedArtist>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedArtist {
    pub name: String,
}

// Spotify wire format

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

impl Token {
    /// Expired tokens are those within four minutes of their end of life.
    pub fn is_expired(&self, now: u64) -> bool {
        now + 240 >= self.obtained_at + self.expires_in
    }

    /// Whether every scope in the space-delimited `required` list was granted.
    pub fn covers_scope(&self, required: &str) -> bool {
        let granted: HashSet<&str> = self.scope.split_whitespace().collect();
        required.split_whitespace().all(|s| granted.contains(s))
    }
}

/// Raw response of the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Clone)]
pub struct PkceToken {
    pub code_verifier: String,
    pub token: Option<Token>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub tracks: Option<SearchTracks>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchTracks {
    #[serde(default)]
    pub items: Vec<SearchTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchTrack {
    pub uri: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub collaborative: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetUserPlaylistsResponse {
    pub items: Vec<Option<Playlist>>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub owner: PlaylistOwner,
}

impl From<Playlist> for PlaylistSummary {
    fn from(playlist: Playlist) -> Self {
        PlaylistSummary {
            id: playlist.id,
            name: playlist.name,
            owner_id: playlist.owner.id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistOwner {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistTracksPage {
    pub items: Vec<PlaylistItem>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<PlaylistTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistTrack {
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistResponse {
    pub snapshot_id: String,
}
