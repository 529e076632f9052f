//! # Sync Module
//!
//! The decision procedure of rplsync: which played tracks end up in the
//! playlist, and in what order.
//!
//! ```text
//! FeedSource ─> ProgramFilter ─> TrackResolver ─> PlaylistSynchronizer
//!                                                      ↑
//!                               PlaylistLocator (once, up front)
//! ```
//!
//! - [`ProgramFilter`] drops plays inside recurring [`BlackoutWindow`]s
//! - [`TrackResolver`] maps `(title, artist)` to a catalog track, first hit wins
//! - [`PlaylistLocator`] finds or creates the destination playlist
//! - [`PlaylistSynchronizer`] head-inserts tracks the playlist lacks
//!
//! The feed arrives oldest first, and each new track is inserted at the
//! head, so the most recent play ends up first in the playlist.
//!
//! Everything here is generic over [`StreamingService`] and [`FeedSource`],
//! and the whole pass is sequential.

mod filter;
mod locator;
mod resolver;
mod synchronizer;

pub use filter::BlackoutWindow;
pub use filter::ProgramFilter;
pub use locator::PlaylistLocator;
pub use resolver::TrackResolver;
pub use resolver::search_query;
pub use synchronizer::PlaylistSynchronizer;

use serde_json::json;

use crate::{
    config::Config,
    error::{AuthError, SyncError},
    feed::FeedSource,
    info,
    logging::{Level, Logger},
    spotify::StreamingService,
    types::{PlayedTrack, PreviewRow, PreviewStatus, RunReport},
};

/// Confirms the credential belongs to the configured user.
pub async fn ensure_user<S>(service: &S, config: &Config, log: &Logger) -> Result<(), SyncError>
where
    S: StreamingService + ?Sized,
{
    let user = service.current_user().await.map_err(AuthError::from)?;
    if user.id != config.user_id {
        return Err(AuthError::UserMismatch {
            expected: config.user_id.clone(),
            actual: user.id,
        }
        .into());
    }
    info!(
        log,
        "Signed in as '{}'",
        user.display_name.as_deref().unwrap_or(&user.id)
    );
    Ok(())
}

/// Splits the fetched feed into plays to resolve and the number ignored.
fn apply_filter(tracks: Vec<PlayedTrack>, filter: &ProgramFilter, log: &Logger) -> (Vec<PlayedTrack>, usize) {
    let mut kept = Vec::with_capacity(tracks.len());
    let mut ignored = 0;

    for track in tracks {
        match filter.matching_window(&track) {
            Some(window) => {
                info!(
                    log,
                    "Skipping '{}' by '{}', played during ignored program ({})",
                    track.title,
                    track.artist,
                    window
                );
                ignored += 1;
            }
            None => kept.push(track),
        }
    }

    (kept, ignored)
}

/// Performs one complete sync pass.
///
/// Locates or creates the playlist, fetches the feed, filters, resolves and
/// synchronizes, strictly in that order. Per-track problems only show up in
/// the report counters; the returned error is always run-fatal.
pub async fn run_sync<S, F>(
    service: &S,
    feed: &F,
    filter: &ProgramFilter,
    config: &Config,
    log: &Logger,
) -> Result<RunReport, SyncError>
where
    S: StreamingService + ?Sized,
    F: FeedSource + ?Sized,
{
    ensure_user(service, config, log).await?;

    let playlist = PlaylistLocator::new(service, log)
        .find_or_create(&config.user_id, &config.playlist_name, &config.playlist_description)
        .await?;

    info!(log, "Getting recently played tracks");
    let played = feed.fetch().await?;
    let fetched = played.len();

    let (kept, ignored) = apply_filter(played, filter, log);

    let resolved = TrackResolver::new(service, log).resolve_all(kept).await;
    let unresolved = resolved.iter().filter(|t| t.track_uri.is_none()).count();

    let outcome = PlaylistSynchronizer::new(service, log)
        .sync(&playlist.playlist_id, &resolved)
        .await?;

    let report = RunReport {
        fetched,
        ignored,
        unresolved,
        added: outcome.added,
        skipped: outcome.skipped,
        failed: outcome.failed,
    };
    log.with_extras(Level::Success, "Sync finished", json!(report));

    Ok(report)
}

/// Shows what [`run_sync`] would do, without writing anything.
///
/// The playlist is looked up but never created; a missing playlist counts
/// as empty. Rows come out oldest play first.
pub async fn preview<S, F>(
    service: &S,
    feed: &F,
    filter: &ProgramFilter,
    config: &Config,
    log: &Logger,
) -> Result<Vec<PreviewRow>, SyncError>
where
    S: StreamingService + ?Sized,
    F: FeedSource + ?Sized,
{
    ensure_user(service, config, log).await?;

    let mut present = match PlaylistLocator::new(service, log)
        .find(&config.user_id, &config.playlist_name)
        .await?
    {
        Some(found) => service.user_playlist(&found.id).await?.track_ids,
        None => {
            info!(log, "Playlist '{}' does not exist yet", config.playlist_name);
            Default::default()
        }
    };

    let resolver = TrackResolver::new(service, log);
    let mut rows = Vec::new();

    for track in feed.fetch().await? {
        let status = if filter.is_ignored(&track) {
            PreviewStatus::Ignored
        } else {
            match resolver.resolve(&track.title, &track.artist).await {
                None => PreviewStatus::Unresolved,
                Some(uri) if !present.insert(uri.id().to_string()) => PreviewStatus::Present,
                Some(_) => PreviewStatus::New,
            }
        };

        rows.push(PreviewRow {
            played_at: track.played_at.format("%a %d %b %H:%M").to_string(),
            title: track.title,
            artist: track.artist,
            status,
        });
    }

    Ok(rows)
}
