use serde_json::json;

use crate::{
    error::ServiceError,
    info,
    logging::{Level, Logger},
    spotify::StreamingService,
    types::{ResolvedTrack, SyncOutcome},
    warning,
};

/// Position every new track is inserted at.
const HEAD: u32 = 0;

/// Adds resolved tracks that the playlist does not contain yet.
///
/// Tracks are expected oldest first. Each one is inserted at the head, so
/// after the pass the most recently played track is the first entry.
pub struct PlaylistSynchronizer<'a, S: StreamingService + ?Sized> {
    service: &'a S,
    log: &'a Logger,
}

impl<'a, S: StreamingService + ?Sized> PlaylistSynchronizer<'a, S> {
    pub fn new(service: &'a S, log: &'a Logger) -> Self {
        Self { service, log }
    }

    /// Brings `playlist_id` up to date with `tracks`.
    ///
    /// The playlist contents are read once at the start. Nothing guards
    /// against another client editing the playlist between that read and the
    /// adds. Failing to read the contents aborts; a failed add is logged and
    /// the remaining tracks are still attempted.
    pub async fn sync(&self, playlist_id: &str, tracks: &[ResolvedTrack]) -> Result<SyncOutcome, ServiceError> {
        let mut state = self.service.user_playlist(playlist_id).await?;
        info!(
            self.log,
            "Playlist '{}' holds {} tracks",
            state.playlist_id,
            state.track_ids.len()
        );

        let mut outcome = SyncOutcome::default();

        for track in tracks {
            let Some(uri) = &track.track_uri else {
                continue;
            };
            let played = &track.played_track;
            let track_id = uri.id().to_string();

            if state.track_ids.contains(&track_id) {
                info!(
                    self.log,
                    "'{}' by '{}' ({}) already in playlist",
                    played.title,
                    played.artist,
                    uri
                );
                outcome.skipped += 1;
                continue;
            }

            match self
                .service
                .user_playlist_add_tracks(playlist_id, std::slice::from_ref(&track_id), Some(HEAD))
                .await
            {
                Ok(()) => {
                    self.log.with_extras(
                        Level::Success,
                        format!("Added '{}' by '{}'", played.title, played.artist),
                        json!({ "track_id": track_id, "playlist_id": playlist_id }),
                    );
                    state.track_ids.insert(track_id);
                    outcome.added += 1;
                }
                Err(e) => {
                    warning!(
                        self.log,
                        "Failed to add '{}' by '{}' ({}): {}",
                        played.title,
                        played.artist,
                        uri,
                        e
                    );
                    outcome.failed += 1;
                }
            }
        }

        Ok(outcome)
    }
}
