use std::collections::HashSet;

use crate::{
    error::ServiceError,
    info,
    logging::Logger,
    spotify::StreamingService,
    success,
    types::{CreatePlaylistRequest, PlaylistState, PlaylistSummary},
    warning,
};

/// Finds the destination playlist, creating it on first use.
pub struct PlaylistLocator<'a, S: StreamingService + ?Sized> {
    service: &'a S,
    log: &'a Logger,
}

impl<'a, S: StreamingService + ?Sized> PlaylistLocator<'a, S> {
    pub fn new(service: &'a S, log: &'a Logger) -> Self {
        Self { service, log }
    }

    /// The playlist owned by `owner_id` named exactly `name`.
    ///
    /// When several match, the first in listing order wins.
    pub async fn find(&self, owner_id: &str, name: &str) -> Result<Option<PlaylistSummary>, ServiceError> {
        let mut matches = self
            .service
            .user_playlists(owner_id)
            .await?
            .into_iter()
            .filter(|p| p.owner_id == owner_id && p.name == name);

        let first = matches.next();
        let duplicates: Vec<String> = matches.map(|p| p.id).collect();
        if let Some(found) = &first {
            if !duplicates.is_empty() {
                warning!(
                    self.log,
                    "Several playlists are named '{}', using {} and ignoring {}",
                    name,
                    found.id,
                    duplicates.join(", ")
                );
            }
        }

        Ok(first)
    }

    /// Returns the playlist's state, creating an empty public playlist if
    /// none exists. Running it again finds the playlist created before.
    pub async fn find_or_create(
        &self,
        owner_id: &str,
        name: &str,
        description: &str,
    ) -> Result<PlaylistState, ServiceError> {
        if let Some(found) = self.find(owner_id, name).await? {
            info!(self.log, "Playlist '{}' already exists", name);
            return self.service.user_playlist(&found.id).await;
        }

        info!(self.log, "Creating new playlist '{}' for the first time", name);
        let request = CreatePlaylistRequest {
            name: name.to_string(),
            description: description.to_string(),
            public: true,
            collaborative: false,
        };
        let created = self.service.user_playlist_create(owner_id, &request).await?;
        success!(self.log, "Playlist '{}' created", name);

        Ok(PlaylistState {
            playlist_id: created.id,
            owner_id: created.owner_id,
            track_ids: HashSet::new(),
        })
    }
}
