//! # CLI Module
//!
//! User-facing commands. Each one loads the [`Config`](crate::config::Config),
//! obtains a credential, wires the concrete clients into the
//! [`sync`](crate::sync) pipeline, and reports through the injected logger.
//!
//! - [`sync`] - the default command: bring the playlist up to date
//! - [`preview`] - show what a sync would do, as a table, without writing
//! - [`auth`] - force a fresh interactive authorization
//!
//! Run-level failures are logged at error level and the command returns
//! normally, so the process always exits with code 0.
//!
//! ```bash
//! rplsync            # same as `rplsync sync`
//! rplsync preview
//! rplsync auth
//! ```

mod auth;
mod preview;
mod sync;

pub use auth::auth;
pub use preview::preview;
pub use sync::sync;

use crate::{
    config::Config,
    error::SyncError,
    logging::Logger,
    management::TokenManager,
    spotify::{SpotifyClient, auth::OAuthSettings},
};

/// Configuration and an authenticated client, ready for a pipeline run.
async fn connect(log: &Logger) -> Result<(Config, SpotifyClient), SyncError> {
    let config = Config::from_env()?;
    let oauth = OAuthSettings::from(&config);
    let token = TokenManager::new().valid_token(&oauth, log).await?;
    let client = SpotifyClient::new(&config.api_url, token.access_token);
    Ok((config, client))
}
