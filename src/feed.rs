//! Client for the station's "recently played" feed.
//!
//! The feed endpoint answers `GET <url>?order=desc&limit=<n>` with the most
//! recent plays first. [`FeedClient`] turns that into [`PlayedTrack`]s in
//! oldest-first order, keeping only entries of the expected service and
//! cleaning titles so they survive an exact-field catalog search.

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde_json::Value;

use crate::{
    config::Config,
    error::FeedError,
    types::{FeedItem, FeedResponse, PlayedTrack},
};

/// Annotations inside a trailing parenthesis that name featured artists.
const FEATURING_PREFIXES: [&str; 4] = ["feat.", "feat ", "ft.", "featuring"];

/// Source of played tracks, oldest first.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<PlayedTrack>, FeedError>;
}

pub struct FeedClient {
    http: Client,
    url: String,
    limit: u32,
    service_id: String,
}

impl FeedClient {
    pub fn new(url: impl Into<String>, limit: u32, service_id: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
            limit,
            service_id: service_id.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.feed_url, config.feed_limit, &config.feed_service_id)
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    /// One GET against the feed. Any transport, status or decode failure
    /// fails the whole fetch; a partial feed is never returned.
    async fn fetch(&self) -> Result<Vec<PlayedTrack>, FeedError> {
        let limit = self.limit.to_string();
        let response = self
            .http
            .get(&self.url)
            .query(&[("order", "desc"), ("limit", limit.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let feed: FeedResponse =
            serde_json::from_str(&body).map_err(|e| FeedError::Malformed(e.to_string()))?;

        normalize(feed, &self.service_id)
    }
}

/// Converts a newest-first feed response into oldest-first [`PlayedTrack`]s.
///
/// Entries of other services are dropped before they are inspected any
/// further. A matching entry without recording, artist or a parseable play
/// time makes the whole feed malformed.
pub fn normalize(feed: FeedResponse, service_id: &str) -> Result<Vec<PlayedTrack>, FeedError> {
    let mut tracks = feed
        .items
        .into_iter()
        .filter(|item| item.get("service_id").and_then(Value::as_str) == Some(service_id))
        .map(|item| {
            serde_json::from_value::<FeedItem>(item)
                .map_err(|e| FeedError::Malformed(e.to_string()))
                .and_then(played_track)
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracks.reverse();
    Ok(tracks)
}

fn played_track(item: FeedItem) -> Result<PlayedTrack, FeedError> {
    let recording = item
        .recording
        .ok_or_else(|| FeedError::Malformed("entry without recording".to_string()))?;

    let raw_time = item
        .played_time
        .ok_or_else(|| FeedError::Malformed(format!("'{}' has no played_time", recording.title)))?;
    let played_at = DateTime::parse_from_rfc3339(&raw_time)
        .or_else(|_| DateTime::parse_from_str(&raw_time, "%Y-%m-%dT%H:%M:%S%z"))
        .map_err(|e| {
            FeedError::Malformed(format!(
                "'{}' has invalid played_time '{}': {}",
                recording.title, raw_time, e
            ))
        })?;

    let artist = recording
        .artists
        .first()
        .map(|a| a.name.trim().to_string())
        .ok_or_else(|| FeedError::Malformed(format!("'{}' has no artists", recording.title)))?;

    Ok(PlayedTrack {
        title: clean_title(&recording.title),
        artist,
        played_at,
        service_tag: item.service_id,
    })
}

/// Strips featuring annotations, e.g. `Song {feat. X}` and `Song (ft. X)` become `Song`.
///
/// Everything from the first `{` on is dropped. A trailing parenthesis is only
/// dropped when it names featured artists, so `Song (Live)` is left alone.
pub fn clean_title(raw: &str) -> String {
    let before_brace = raw.split('{').next().unwrap_or(raw).trim();
    let title = strip_featuring(before_brace).trim();

    if title.is_empty() {
        raw.trim().to_string()
    } else {
        title.to_string()
    }
}

fn strip_featuring(title: &str) -> &str {
    if !title.ends_with(')') {
        return title;
    }
    let Some(open) = title.rfind('(') else {
        return title;
    };

    let inner = title[open + 1..title.len() - 1].trim_start().to_lowercase();
    if FEATURING_PREFIXES.iter().any(|p| inner.starts_with(p)) {
        &title[..open]
    } else {
        title
    }
}
