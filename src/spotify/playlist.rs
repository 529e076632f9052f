use serde::Deserialize;

use crate::{
    error::ServiceError,
    spotify::SpotifyClient,
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest,
        GetUserPlaylistsResponse, Playlist, PlaylistOwner, PlaylistState, PlaylistSummary,
        PlaylistTracksPage,
    },
    utils,
};

const PLAYLISTS_PAGE_SIZE: usize = 50;
const TRACKS_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct PlaylistHeader {
    id: String,
    owner: PlaylistOwner,
}

/// Lists all playlists of `user_id`, following pagination until exhausted.
pub async fn list(client: &SpotifyClient, user_id: &str) -> Result<Vec<PlaylistSummary>, ServiceError> {
    let url = client.endpoint(&["users", user_id, "playlists"])?;
    let mut playlists = Vec::new();
    let mut offset = 0;

    loop {
        let page_offset = offset.to_string();
        let page_size = PLAYLISTS_PAGE_SIZE.to_string();
        let response = client
            .execute(|http| {
                http.get(url.clone())
                    .query(&[("limit", page_size.as_str()), ("offset", page_offset.as_str())])
            })
            .await?;

        let page: GetUserPlaylistsResponse = SpotifyClient::decode(response).await?;
        let fetched = page.items.len();
        // deleted playlists come back as null entries
        playlists.extend(page.items.into_iter().flatten().map(PlaylistSummary::from));

        if page.next.is_none() || fetched == 0 {
            return Ok(playlists);
        }
        offset += fetched;
    }
}

/// Creates a playlist owned by `user_id`.
pub async fn create(
    client: &SpotifyClient,
    user_id: &str,
    request: &CreatePlaylistRequest,
) -> Result<PlaylistSummary, ServiceError> {
    let url = client.endpoint(&["users", user_id, "playlists"])?;
    let response = client.execute(|http| http.post(url.clone()).json(request)).await?;
    let playlist: Playlist = SpotifyClient::decode(response).await?;
    Ok(playlist.into())
}

/// Fetches the owner and every track id of a playlist.
///
/// Local files and unavailable tracks carry no id and are left out.
pub async fn contents(client: &SpotifyClient, playlist_id: &str) -> Result<PlaylistState, ServiceError> {
    let header_url = client.endpoint(&["playlists", playlist_id])?;
    let response = client
        .execute(|http| http.get(header_url.clone()).query(&[("fields", "id,owner(id)")]))
        .await?;
    let header: PlaylistHeader = SpotifyClient::decode(response).await?;

    let tracks_url = client.endpoint(&["playlists", playlist_id, "tracks"])?;
    let mut state = PlaylistState {
        playlist_id: header.id,
        owner_id: header.owner.id,
        track_ids: Default::default(),
    };
    let mut offset = 0;

    loop {
        let page_offset = offset.to_string();
        let page_size = TRACKS_PAGE_SIZE.to_string();
        let response = client
            .execute(|http| {
                http.get(tracks_url.clone()).query(&[
                    ("fields", "items(track(id)),next"),
                    ("limit", page_size.as_str()),
                    ("offset", page_offset.as_str()),
                ])
            })
            .await?;

        let page: PlaylistTracksPage = SpotifyClient::decode(response).await?;
        let fetched = page.items.len();
        state.track_ids.extend(
            page.items
                .into_iter()
                .filter_map(|item| item.track.and_then(|t| t.id)),
        );

        if page.next.is_none() || fetched == 0 {
            return Ok(state);
        }
        offset += fetched;
    }
}

/// Inserts tracks into a playlist. Ids are sent as `spotify:track:<id>` URIs.
pub async fn add_tracks(
    client: &SpotifyClient,
    playlist_id: &str,
    track_ids: &[String],
    position: Option<u32>,
) -> Result<(), ServiceError> {
    let url = client.endpoint(&["playlists", playlist_id, "tracks"])?;
    let body = AddTrackToPlaylistRequest {
        uris: track_ids.iter().map(|id| utils::track_uri_from_id(id)).collect(),
        position,
    };

    let response = client.execute(|http| http.post(url.clone()).json(&body)).await?;
    let _: AddTrackToPlaylistResponse = SpotifyClient::decode(response).await?;
    Ok(())
}
