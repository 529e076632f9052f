use crate::{
    error::ServiceError,
    spotify::SpotifyClient,
    types::{SearchResponse, SearchTrack},
};

/// Searches the catalog for tracks.
///
/// A response without a `tracks` object yields an empty result instead of an
/// error; callers treat both as "nothing found".
pub async fn search_tracks(
    client: &SpotifyClient,
    query: &str,
    limit: u32,
) -> Result<Vec<SearchTrack>, ServiceError> {
    let url = client.endpoint(&["search"])?;
    let limit = limit.to_string();
    let response = client
        .execute(|http| {
            http.get(url.clone())
                .query(&[("q", query), ("type", "track"), ("limit", limit.as_str())])
        })
        .await?;

    let res: SearchResponse = SpotifyClient::decode(response).await?;
    Ok(res.tracks.map(|t| t.items).unwrap_or_default())
}
