use crate::{
    config::Config, error, logging::Logger, management::TokenManager, spotify::auth::OAuthSettings,
};

/// Replaces the cached credential with a freshly authorized one.
pub async fn auth(log: &Logger) {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(log, "Cannot load configuration: {}", e);
            return;
        }
    };

    let oauth = OAuthSettings::from(&config);
    if let Err(e) = TokenManager::new().authorize(&oauth, log).await {
        error!(log, "Authentication failed: {}", e);
    }
}
