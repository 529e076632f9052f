use crate::{
    error, feed::FeedClient, info, logging::Logger, success, sync::ProgramFilter, sync::run_sync,
};

pub async fn sync(log: &Logger) {
    let (config, client) = match super::connect(log).await {
        Ok(connected) => connected,
        Err(e) => {
            error!(log, "Cannot start sync: {}", e);
            return;
        }
    };

    info!(
        log,
        "Application starting for user '{}', playlist '{}'",
        config.user_id,
        config.playlist_name
    );

    let feed = FeedClient::from_config(&config);
    let filter = ProgramFilter::new(config.blackout_windows.clone());

    match run_sync(&client, &feed, &filter, &config, log).await {
        Ok(report) => success!(
            log,
            "Program finished: {} added, {} already present, {} not found, {} ignored",
            report.added,
            report.skipped,
            report.unresolved,
            report.ignored
        ),
        Err(e) => error!(log, "Sync aborted: {}", e),
    }
}
