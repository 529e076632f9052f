#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::DateTime;
use rplsync::{
    config::Config,
    error::{FeedError, ServiceError},
    feed::FeedSource,
    logging::{Level, LogEntry, LogSink, Logger},
    spotify::StreamingService,
    sync::search_query,
    types::{
        CreatePlaylistRequest, CurrentUser, PlayedTrack, PlaylistState, PlaylistSummary,
        ResolvedTrack, SearchTrack, TrackUri,
    },
};

pub const USER: &str = "011011000110111101110110011001";
pub const PLAYLIST_NAME: &str = "Triple J Recently Played";

/// Log sink that keeps every entry for later inspection.
#[derive(Default)]
pub struct CaptureSink {
    entries: Mutex<Vec<LogEntry>>,
}

impl CaptureSink {
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.level == level)
            .map(|e| e.message.clone())
            .collect()
    }
}

impl LogSink for CaptureSink {
    fn write(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

pub fn capture_logger() -> (Logger, Arc<CaptureSink>) {
    let sink = Arc::new(CaptureSink::default());
    (Logger::new(sink.clone()), sink)
}

pub fn config() -> Config {
    let mut env = HashMap::new();
    env.insert("SPOTIFY_USER_ID", USER);
    env.insert("SPOTIFY_API_AUTH_CLIENT_ID", "client-id");
    Config::from_lookup(|key| env.get(key).map(|v| v.to_string())).unwrap()
}

pub fn played(title: &str, artist: &str, played_at: &str) -> PlayedTrack {
    PlayedTrack {
        title: title.to_string(),
        artist: artist.to_string(),
        played_at: DateTime::parse_from_rfc3339(played_at).unwrap(),
        service_tag: "triplej".to_string(),
    }
}

pub fn resolved(id: &str) -> ResolvedTrack {
    ResolvedTrack {
        played_track: played(id, "Artist", "2024-05-13T12:00:00+10:00"),
        track_uri: Some(TrackUri::new(format!("spotify:track:{}", id))),
    }
}

pub fn unresolved(title: &str) -> ResolvedTrack {
    ResolvedTrack {
        played_track: played(title, "Artist", "2024-05-13T12:00:00+10:00"),
        track_uri: None,
    }
}

#[derive(Debug, Clone)]
pub struct FakePlaylist {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub tracks: Vec<String>,
}

#[derive(Default)]
struct FakeState {
    playlists: Vec<FakePlaylist>,
    create_calls: usize,
    add_calls: usize,
    search_calls: usize,
}

/// In-memory stand-in for an authenticated Spotify client.
#[derive(Default)]
pub struct FakeService {
    pub user_id: String,
    /// search query -> track uri
    catalog: HashMap<String, String>,
    /// queries answered with a result that has no uri
    malformed: HashSet<String>,
    /// queries whose search call fails
    broken_searches: HashSet<String>,
    /// track ids whose add call fails
    failing_adds: HashSet<String>,
    state: Mutex<FakeState>,
}

impl FakeService {
    pub fn new() -> Self {
        Self {
            user_id: USER.to_string(),
            ..Default::default()
        }
    }

    pub fn with_track(mut self, title: &str, artist: &str, uri: &str) -> Self {
        self.catalog.insert(search_query(title, artist), uri.to_string());
        self
    }

    pub fn with_malformed_result(mut self, title: &str, artist: &str) -> Self {
        self.malformed.insert(search_query(title, artist));
        self
    }

    pub fn with_broken_search(mut self, title: &str, artist: &str) -> Self {
        self.broken_searches.insert(search_query(title, artist));
        self
    }

    pub fn with_failing_add(mut self, track_id: &str) -> Self {
        self.failing_adds.insert(track_id.to_string());
        self
    }

    pub fn with_playlist(self, id: &str, name: &str, owner_id: &str, tracks: &[&str]) -> Self {
        self.state.lock().unwrap().playlists.push(FakePlaylist {
            id: id.to_string(),
            name: name.to_string(),
            owner_id: owner_id.to_string(),
            tracks: tracks.iter().map(|t| t.to_string()).collect(),
        });
        self
    }

    pub fn tracks(&self, playlist_id: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .playlists
            .iter()
            .find(|p| p.id == playlist_id)
            .map(|p| p.tracks.clone())
            .unwrap_or_default()
    }

    pub fn playlists(&self) -> Vec<FakePlaylist> {
        self.state.lock().unwrap().playlists.clone()
    }

    pub fn create_calls(&self) -> usize {
        self.state.lock().unwrap().create_calls
    }

    pub fn add_calls(&self) -> usize {
        self.state.lock().unwrap().add_calls
    }

    pub fn search_calls(&self) -> usize {
        self.state.lock().unwrap().search_calls
    }
}

fn not_found(what: &str) -> ServiceError {
    ServiceError::Status {
        status: 404,
        body: format!("{} not found", what),
    }
}

#[async_trait]
impl StreamingService for FakeService {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<SearchTrack>, ServiceError> {
        assert_eq!(limit, 1);
        self.state.lock().unwrap().search_calls += 1;

        if self.broken_searches.contains(query) {
            return Err(ServiceError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        if self.malformed.contains(query) {
            return Ok(vec![SearchTrack {
                uri: None,
                name: None,
            }]);
        }
        Ok(self
            .catalog
            .get(query)
            .map(|uri| {
                vec![SearchTrack {
                    uri: Some(uri.clone()),
                    name: None,
                }]
            })
            .unwrap_or_default())
    }

    async fn current_user(&self) -> Result<CurrentUser, ServiceError> {
        Ok(CurrentUser {
            id: self.user_id.clone(),
            display_name: Some("lov".to_string()),
        })
    }

    async fn user_playlists(&self, _user_id: &str) -> Result<Vec<PlaylistSummary>, ServiceError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .playlists
            .iter()
            .map(|p| PlaylistSummary {
                id: p.id.clone(),
                name: p.name.clone(),
                owner_id: p.owner_id.clone(),
            })
            .collect())
    }

    async fn user_playlist_create(
        &self,
        user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<PlaylistSummary, ServiceError> {
        assert!(request.public);
        let mut state = self.state.lock().unwrap();
        state.create_calls += 1;
        let playlist = FakePlaylist {
            id: format!("created-{}", state.create_calls),
            name: request.name.clone(),
            owner_id: user_id.to_string(),
            tracks: Vec::new(),
        };
        state.playlists.push(playlist.clone());
        Ok(PlaylistSummary {
            id: playlist.id,
            name: playlist.name,
            owner_id: playlist.owner_id,
        })
    }

    async fn user_playlist(&self, playlist_id: &str) -> Result<PlaylistState, ServiceError> {
        let state = self.state.lock().unwrap();
        let playlist = state
            .playlists
            .iter()
            .find(|p| p.id == playlist_id)
            .ok_or_else(|| not_found(playlist_id))?;
        Ok(PlaylistState {
            playlist_id: playlist.id.clone(),
            owner_id: playlist.owner_id.clone(),
            track_ids: playlist.tracks.iter().cloned().collect(),
        })
    }

    async fn user_playlist_add_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
        position: Option<u32>,
    ) -> Result<(), ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.add_calls += 1;

        if track_ids.iter().any(|id| self.failing_adds.contains(id)) {
            return Err(ServiceError::Status {
                status: 500,
                body: "server error".to_string(),
            });
        }

        let playlist = state
            .playlists
            .iter_mut()
            .find(|p| p.id == playlist_id)
            .ok_or_else(|| not_found(playlist_id))?;
        let at = position.map(|p| p as usize).unwrap_or(playlist.tracks.len());
        for (offset, id) in track_ids.iter().enumerate() {
            playlist.tracks.insert(at + offset, id.clone());
        }
        Ok(())
    }
}

/// Feed that serves a fixed list of plays, oldest first.
pub struct FakeFeed {
    tracks: Vec<PlayedTrack>,
    fail: bool,
}

impl FakeFeed {
    pub fn new(tracks: Vec<PlayedTrack>) -> Self {
        Self {
            tracks,
            fail: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            tracks: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl FeedSource for FakeFeed {
    async fn fetch(&self) -> Result<Vec<PlayedTrack>, FeedError> {
        if self.fail {
            return Err(FeedError::Status(503));
        }
        Ok(self.tracks.clone())
    }
}
