use serde_json::json;

use crate::{
    info,
    logging::{Level, Logger},
    spotify::StreamingService,
    types::{PlayedTrack, ResolvedTrack, TrackUri},
    warning,
};

/// Exact-field search query for a title and its primary artist.
pub fn search_query(title: &str, artist: &str) -> String {
    format!("artist:{} track:{}", artist, title)
}

/// Maps played tracks to catalog tracks. The first search result wins.
pub struct TrackResolver<'a, S: StreamingService + ?Sized> {
    service: &'a S,
    log: &'a Logger,
}

impl<'a, S: StreamingService + ?Sized> TrackResolver<'a, S> {
    pub fn new(service: &'a S, log: &'a Logger) -> Self {
        Self { service, log }
    }

    /// Looks up `title` by `artist`.
    ///
    /// A miss is expected for songs outside the catalog and is not an error.
    /// Failed searches and results without a URI count as misses too.
    pub async fn resolve(&self, title: &str, artist: &str) -> Option<TrackUri> {
        let query = search_query(title, artist);

        let results = match self.service.search(&query, 1).await {
            Ok(results) => results,
            Err(e) => {
                warning!(self.log, "Search for '{}' by '{}' failed: {}", title, artist, e);
                return None;
            }
        };

        match results.into_iter().next().and_then(|t| t.uri) {
            Some(uri) => {
                let uri = TrackUri::new(uri);
                self.log.with_extras(
                    Level::Info,
                    format!("Found '{}' by '{}'", title, artist),
                    json!({ "uri": uri.as_str() }),
                );
                Some(uri)
            }
            None => {
                info!(self.log, "'{}' by '{}' is not on Spotify, skipping", title, artist);
                None
            }
        }
    }

    /// Resolves every track, keeping input order.
    pub async fn resolve_all(&self, tracks: Vec<PlayedTrack>) -> Vec<ResolvedTrack> {
        let mut resolved = Vec::with_capacity(tracks.len());
        for played_track in tracks {
            let track_uri = self.resolve(&played_track.title, &played_track.artist).await;
            resolved.push(ResolvedTrack {
                played_track,
                track_uri,
            });
        }
        resolved
    }
}
