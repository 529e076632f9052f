//! # Spotify Integration Module
//!
//! The integration layer between rplsync and the Spotify Web API. The sync
//! logic never talks HTTP itself: it is written against [`StreamingService`],
//! whose operations mirror what an authenticated Spotify client offers.
//! [`SpotifyClient`] is the production implementation; tests substitute an
//! in-memory one.
//!
//! ```text
//! sync (locator, resolver, synchronizer)
//!          ↓
//!   StreamingService
//!          ↓
//!   SpotifyClient ── reqwest ──> Spotify Web API
//! ```
//!
//! ## Endpoints
//!
//! - `GET /search` - track lookup by `artist:` / `track:` fields
//! - `GET /me` - the user the credential belongs to
//! - `GET /users/{user_id}/playlists` - playlist listing, all pages
//! - `POST /users/{user_id}/playlists` - playlist creation
//! - `GET /playlists/{id}` and `GET /playlists/{id}/tracks` - playlist contents
//! - `POST /playlists/{id}/tracks` - track insertion at a position
//!
//! ## Error Handling
//!
//! - **429 Too Many Requests**: the `Retry-After` header (at least one second)
//!   is honored for waits up to two minutes, a bounded number of times; longer
//!   or repeated throttling surfaces as [`ServiceError::RateLimited`].
//! - **502 Bad Gateway**: retried after a pause, a bounded number of times.
//! - Any other non-success status becomes [`ServiceError::Status`].
//!
//! ## Submodules
//!
//! - [`auth`] - OAuth 2.0 PKCE flow and token refresh
//! - [`playlist`] - playlist listing, creation, contents and insertion
//! - [`search`] - track search

pub mod auth;
pub mod playlist;
pub mod search;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use crate::{
    error::ServiceError,
    types::{CreatePlaylistRequest, CurrentUser, PlaylistState, PlaylistSummary, SearchTrack},
};

const MAX_RETRY_AFTER_SECS: u64 = 120;
const MAX_RATE_LIMIT_RETRIES: u32 = 3;
const MAX_BAD_GATEWAY_RETRIES: u32 = 3;
const BAD_GATEWAY_PAUSE: Duration = Duration::from_secs(10);

/// Operations of an authenticated streaming-service credential.
#[async_trait]
pub trait StreamingService: Send + Sync {
    /// Runs a track search and returns at most `limit` results.
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<SearchTrack>, ServiceError>;

    async fn current_user(&self) -> Result<CurrentUser, ServiceError>;

    /// Every playlist visible in the user's library, in listing order.
    async fn user_playlists(&self, user_id: &str) -> Result<Vec<PlaylistSummary>, ServiceError>;

    async fn user_playlist_create(
        &self,
        user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<PlaylistSummary, ServiceError>;

    /// Current contents of a playlist, fetched fresh on every call.
    async fn user_playlist(&self, playlist_id: &str) -> Result<PlaylistState, ServiceError>;

    /// Inserts tracks (by bare id) at `position`, or appends when `None`.
    async fn user_playlist_add_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
        position: Option<u32>,
    ) -> Result<(), ServiceError>;
}

/// Spotify Web API client bound to one access token.
#[derive(Clone)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    access_token: String,
}

impl SpotifyClient {
    pub fn new(api_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    /// Endpoint URL below the API root. Each segment is percent-encoded, so
    /// ids containing `/`, `?` or spaces stay a single path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = Url::parse(&self.api_url).map_err(|e| ServiceError::Url(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ServiceError::Url(format!("'{}' cannot be a base", self.api_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends the request built by `build`, retrying on rate limits and bad gateways.
    async fn execute<F>(&self, build: F) -> Result<Response, ServiceError>
    where
        F: Fn(&Client) -> RequestBuilder + Send + Sync,
    {
        let mut bad_gateways = 0;
        let mut rate_limits = 0;

        loop {
            let response = build(&self.http)
                .bearer_auth(&self.access_token)
                .send()
                .await?;

            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1)
                    .max(1);

                if retry_after > MAX_RETRY_AFTER_SECS || rate_limits >= MAX_RATE_LIMIT_RETRIES {
                    return Err(ServiceError::RateLimited(retry_after));
                }
                rate_limits += 1;
                sleep(Duration::from_secs(retry_after)).await;
                continue;
            }

            if status == StatusCode::BAD_GATEWAY && bad_gateways < MAX_BAD_GATEWAY_RETRIES {
                bad_gateways += 1;
                sleep(BAD_GATEWAY_PAUSE).await;
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

#[async_trait]
impl StreamingService for SpotifyClient {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<SearchTrack>, ServiceError> {
        search::search_tracks(self, query, limit).await
    }

    async fn current_user(&self) -> Result<CurrentUser, ServiceError> {
        let url = self.endpoint(&["me"])?;
        let response = self.execute(|http| http.get(url.clone())).await?;
        Self::decode(response).await
    }

    async fn user_playlists(&self, user_id: &str) -> Result<Vec<PlaylistSummary>, ServiceError> {
        playlist::list(self, user_id).await
    }

    async fn user_playlist_create(
        &self,
        user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<PlaylistSummary, ServiceError> {
        playlist::create(self, user_id, request).await
    }

    async fn user_playlist(&self, playlist_id: &str) -> Result<PlaylistState, ServiceError> {
        playlist::contents(self, playlist_id).await
    }

    async fn user_playlist_add_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
        position: Option<u32>,
    ) -> Result<(), ServiceError> {
        playlist::add_tracks(self, playlist_id, track_ids, position).await
    }
}
