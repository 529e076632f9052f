use tabled::Table;

use crate::{error, feed::FeedClient, info, logging::Logger, sync, sync::ProgramFilter};

pub async fn preview(log: &Logger) {
    let (config, client) = match super::connect(log).await {
        Ok(connected) => connected,
        Err(e) => {
            error!(log, "Cannot start preview: {}", e);
            return;
        }
    };

    let feed = FeedClient::from_config(&config);
    let filter = ProgramFilter::new(config.blackout_windows.clone());

    match sync::preview(&client, &feed, &filter, &config, log).await {
        Ok(rows) if rows.is_empty() => info!(log, "The feed has no plays for this station"),
        Ok(rows) => {
            let table = Table::new(rows);
            println!("Playlist: {}\n{}\n", config.playlist_name, table);
        }
        Err(e) => error!(log, "Preview aborted: {}", e),
    }
}
