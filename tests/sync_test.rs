mod common;

use common::*;
use rplsync::{
    error::{AuthError, SyncError},
    logging::Level,
    sync::{
        PlaylistLocator, PlaylistSynchronizer, ProgramFilter, TrackResolver, preview, run_sync,
    },
    types::{PreviewStatus, RunReport},
};

fn racket_filter() -> ProgramFilter {
    ProgramFilter::new(config().blackout_windows)
}

// Resolver

#[tokio::test]
async fn test_resolve_returns_first_match() {
    let (log, _) = capture_logger();
    let service = FakeService::new().with_track("Everybody", "Logic", "spotify:track:abc123");

    let uri = TrackResolver::new(&service, &log)
        .resolve("Everybody", "Logic")
        .await
        .expect("track should resolve");

    assert_eq!(uri.as_str(), "spotify:track:abc123");
    assert_eq!(uri.id(), "abc123");
}

#[tokio::test]
async fn test_resolve_zero_results_is_none() {
    let (log, sink) = capture_logger();
    let service = FakeService::new();

    let uri = TrackResolver::new(&service, &log)
        .resolve("Underground", "Nobody")
        .await;

    assert!(uri.is_none());
    assert!(sink.messages(Level::Error).is_empty());
    assert!(sink.messages(Level::Warning).is_empty());
    assert_eq!(service.search_calls(), 1);
}

#[tokio::test]
async fn test_resolve_malformed_result_is_none() {
    let (log, _) = capture_logger();
    let service = FakeService::new().with_malformed_result("Song", "Band");

    assert!(TrackResolver::new(&service, &log).resolve("Song", "Band").await.is_none());
}

#[tokio::test]
async fn test_resolve_failed_search_is_none_and_warns() {
    let (log, sink) = capture_logger();
    let service = FakeService::new().with_broken_search("Song", "Band");

    assert!(TrackResolver::new(&service, &log).resolve("Song", "Band").await.is_none());
    assert_eq!(sink.messages(Level::Warning).len(), 1);
}

#[tokio::test]
async fn test_resolve_all_keeps_order() {
    let (log, _) = capture_logger();
    let service = FakeService::new()
        .with_track("A", "X", "spotify:track:a")
        .with_track("C", "X", "spotify:track:c");

    let resolved = TrackResolver::new(&service, &log)
        .resolve_all(vec![
            played("A", "X", "2024-05-13T10:00:00+10:00"),
            played("B", "X", "2024-05-13T10:04:00+10:00"),
            played("C", "X", "2024-05-13T10:08:00+10:00"),
        ])
        .await;

    let ids: Vec<Option<&str>> = resolved
        .iter()
        .map(|r| r.track_uri.as_ref().map(|u| u.id()))
        .collect();
    assert_eq!(ids, vec![Some("a"), None, Some("c")]);
}

// Synchronizer

#[tokio::test]
async fn test_sync_head_insertion_puts_newest_first() {
    let (log, _) = capture_logger();
    let service = FakeService::new().with_playlist("pl", PLAYLIST_NAME, USER, &["old1", "old2"]);

    let outcome = PlaylistSynchronizer::new(&service, &log)
        .sync("pl", &[resolved("A"), resolved("B"), resolved("C")])
        .await
        .unwrap();

    assert_eq!(outcome.added, 3);
    assert_eq!(service.tracks("pl"), vec!["C", "B", "A", "old1", "old2"]);
}

#[tokio::test]
async fn test_sync_twice_adds_nothing_the_second_time() {
    let (log, _) = capture_logger();
    let service = FakeService::new().with_playlist("pl", PLAYLIST_NAME, USER, &[]);
    let synchronizer = PlaylistSynchronizer::new(&service, &log);
    let tracks = [resolved("A"), resolved("B")];

    let first = synchronizer.sync("pl", &tracks).await.unwrap();
    let second = synchronizer.sync("pl", &tracks).await.unwrap();

    assert_eq!(first.added, 2);
    assert_eq!(second.added, 0);
    assert_eq!(second.skipped, 2);
    assert_eq!(service.add_calls(), 2);
}

#[tokio::test]
async fn test_sync_skips_tracks_already_present() {
    let (log, sink) = capture_logger();
    let service = FakeService::new().with_playlist("pl", PLAYLIST_NAME, USER, &["B"]);

    let outcome = PlaylistSynchronizer::new(&service, &log)
        .sync("pl", &[resolved("A"), resolved("B")])
        .await
        .unwrap();

    assert_eq!(outcome.added, 1);
    assert_eq!(outcome.skipped, 1);
    assert_eq!(service.tracks("pl"), vec!["A", "B"]);
    assert!(
        sink.messages(Level::Info)
            .iter()
            .any(|m| m.contains("already in playlist"))
    );
}

#[tokio::test]
async fn test_sync_skips_duplicates_within_one_run() {
    let (log, _) = capture_logger();
    let service = FakeService::new().with_playlist("pl", PLAYLIST_NAME, USER, &[]);

    let outcome = PlaylistSynchronizer::new(&service, &log)
        .sync("pl", &[resolved("A"), resolved("B"), resolved("A")])
        .await
        .unwrap();

    assert_eq!(outcome.added, 2);
    assert_eq!(outcome.skipped, 1);
    assert_eq!(service.tracks("pl"), vec!["B", "A"]);
}

#[tokio::test]
async fn test_sync_continues_after_failed_add() {
    let (log, sink) = capture_logger();
    let service = FakeService::new()
        .with_playlist("pl", PLAYLIST_NAME, USER, &[])
        .with_failing_add("B");

    let outcome = PlaylistSynchronizer::new(&service, &log)
        .sync("pl", &[resolved("A"), resolved("B"), resolved("C")])
        .await
        .unwrap();

    assert_eq!(outcome.added, 2);
    assert_eq!(outcome.failed, 1);
    assert_eq!(service.tracks("pl"), vec!["C", "A"]);
    assert_eq!(sink.messages(Level::Warning).len(), 1);
}

#[tokio::test]
async fn test_sync_ignores_unresolved_tracks() {
    let (log, _) = capture_logger();
    let service = FakeService::new().with_playlist("pl", PLAYLIST_NAME, USER, &[]);

    let outcome = PlaylistSynchronizer::new(&service, &log)
        .sync("pl", &[unresolved("Lost"), resolved("A")])
        .await
        .unwrap();

    assert_eq!(outcome.added, 1);
    assert_eq!(outcome.skipped, 0);
    assert_eq!(service.add_calls(), 1);
}

#[tokio::test]
async fn test_sync_fails_when_playlist_cannot_be_read() {
    let (log, _) = capture_logger();
    let service = FakeService::new();

    let result = PlaylistSynchronizer::new(&service, &log)
        .sync("missing", &[resolved("A")])
        .await;

    assert!(result.is_err());
    assert_eq!(service.add_calls(), 0);
}

// Locator

#[tokio::test]
async fn test_find_or_create_creates_once() {
    let (log, _) = capture_logger();
    let service = FakeService::new();
    let locator = PlaylistLocator::new(&service, &log);

    let first = locator
        .find_or_create(USER, PLAYLIST_NAME, "description")
        .await
        .unwrap();
    let second = locator
        .find_or_create(USER, PLAYLIST_NAME, "description")
        .await
        .unwrap();

    assert_eq!(service.create_calls(), 1);
    assert_eq!(first.playlist_id, second.playlist_id);
    assert!(first.track_ids.is_empty());
}

#[tokio::test]
async fn test_find_or_create_returns_existing_contents() {
    let (log, _) = capture_logger();
    let service = FakeService::new().with_playlist("pl", PLAYLIST_NAME, USER, &["A", "B"]);

    let state = PlaylistLocator::new(&service, &log)
        .find_or_create(USER, PLAYLIST_NAME, "description")
        .await
        .unwrap();

    assert_eq!(service.create_calls(), 0);
    assert_eq!(state.playlist_id, "pl");
    assert_eq!(state.owner_id, USER);
    assert_eq!(state.track_ids.len(), 2);
}

#[tokio::test]
async fn test_find_requires_exact_name_and_owner() {
    let (log, _) = capture_logger();
    let service = FakeService::new()
        .with_playlist("lower", "triple j recently played", USER, &[])
        .with_playlist("foreign", PLAYLIST_NAME, "someone-else", &[]);

    let found = PlaylistLocator::new(&service, &log)
        .find(USER, PLAYLIST_NAME)
        .await
        .unwrap();

    assert!(found.is_none());
}

#[tokio::test]
async fn test_find_prefers_first_listed_duplicate() {
    let (log, sink) = capture_logger();
    let service = FakeService::new()
        .with_playlist("first", PLAYLIST_NAME, USER, &[])
        .with_playlist("second", PLAYLIST_NAME, USER, &[])
        .with_playlist("third", PLAYLIST_NAME, USER, &[]);

    let found = PlaylistLocator::new(&service, &log)
        .find(USER, PLAYLIST_NAME)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(found.id, "first");
    let warnings = sink.messages(Level::Warning);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("second, third"));
}

// Full runs

#[tokio::test]
async fn test_run_sync_end_to_end_is_idempotent() {
    let (log, _) = capture_logger();
    let config = config();
    let service = FakeService::new().with_track("Everybody", "Logic", "spotify:track:everybody");
    // a Monday afternoon, well outside the blackout window
    let feed = FakeFeed::new(vec![played("Everybody", "Logic", "2024-05-13T15:30:00+10:00")]);

    let first = run_sync(&service, &feed, &racket_filter(), &config, &log)
        .await
        .unwrap();
    let second = run_sync(&service, &feed, &racket_filter(), &config, &log)
        .await
        .unwrap();

    assert_eq!(
        first,
        RunReport {
            fetched: 1,
            ignored: 0,
            unresolved: 0,
            added: 1,
            skipped: 0,
            failed: 0,
        }
    );
    assert_eq!(second.added, 0);
    assert_eq!(second.skipped, 1);
    assert_eq!(service.create_calls(), 1);

    let playlists = service.playlists();
    assert_eq!(playlists.len(), 1);
    assert_eq!(playlists[0].name, PLAYLIST_NAME);
    assert_eq!(playlists[0].tracks, vec!["everybody"]);
}

#[tokio::test]
async fn test_run_sync_filters_and_counts() {
    let (log, _) = capture_logger();
    let config = config();
    let service = FakeService::new()
        .with_playlist("pl", PLAYLIST_NAME, USER, &["known"])
        .with_track("Early", "A", "spotify:track:early")
        .with_track("Racket", "B", "spotify:track:racket")
        .with_track("Known", "C", "spotify:track:known")
        .with_track("Late", "E", "spotify:track:late");
    let feed = FakeFeed::new(vec![
        played("Early", "A", "2024-05-14T21:30:00+10:00"),
        played("Racket", "B", "2024-05-14T23:00:00+10:00"),
        played("Known", "C", "2024-05-15T01:10:00+10:00"),
        played("Obscure", "D", "2024-05-15T01:20:00+10:00"),
        played("Late", "E", "2024-05-15T01:30:00+10:00"),
    ]);

    let report = run_sync(&service, &feed, &racket_filter(), &config, &log)
        .await
        .unwrap();

    assert_eq!(report.fetched, 5);
    assert_eq!(report.ignored, 1);
    assert_eq!(report.unresolved, 1);
    assert_eq!(report.added, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(service.tracks("pl"), vec!["late", "early", "known"]);
}

#[tokio::test]
async fn test_run_sync_aborts_when_feed_unavailable() {
    let (log, _) = capture_logger();
    let service = FakeService::new().with_playlist("pl", PLAYLIST_NAME, USER, &[]);

    let result = run_sync(&service, &FakeFeed::unavailable(), &racket_filter(), &config(), &log).await;

    assert!(matches!(result, Err(SyncError::FeedUnavailable(_))));
    assert_eq!(service.add_calls(), 0);
}

#[tokio::test]
async fn test_run_sync_rejects_foreign_credential() {
    let (log, _) = capture_logger();
    let mut service = FakeService::new();
    service.user_id = "somebody-else".to_string();

    let result = run_sync(&service, &FakeFeed::new(Vec::new()), &racket_filter(), &config(), &log).await;

    assert!(matches!(
        result,
        Err(SyncError::Auth(AuthError::UserMismatch { .. }))
    ));
    assert_eq!(service.create_calls(), 0);
}

#[tokio::test]
async fn test_preview_reports_statuses_without_writing() {
    let (log, _) = capture_logger();
    let config = config();
    let service = FakeService::new()
        .with_playlist("pl", PLAYLIST_NAME, USER, &["known"])
        .with_track("Known", "C", "spotify:track:known")
        .with_track("Fresh", "E", "spotify:track:fresh")
        .with_track("Racket", "B", "spotify:track:racket");
    let feed = FakeFeed::new(vec![
        played("Racket", "B", "2024-05-14T23:00:00+10:00"),
        played("Known", "C", "2024-05-15T01:10:00+10:00"),
        played("Obscure", "D", "2024-05-15T01:20:00+10:00"),
        played("Fresh", "E", "2024-05-15T01:30:00+10:00"),
        played("Fresh", "E", "2024-05-15T04:30:00+10:00"),
    ]);

    let rows = preview(&service, &feed, &racket_filter(), &config, &log)
        .await
        .unwrap();

    let statuses: Vec<PreviewStatus> = rows.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            PreviewStatus::Ignored,
            PreviewStatus::Present,
            PreviewStatus::Unresolved,
            PreviewStatus::New,
            PreviewStatus::Present,
        ]
    );
    assert_eq!(service.add_calls(), 0);
    assert_eq!(service.create_calls(), 0);
}
