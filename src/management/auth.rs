use std::path::PathBuf;

use crate::{
    error::AuthError,
    info,
    logging::Logger,
    spotify::auth::{self, OAuthSettings},
    success,
    types::Token,
    utils, warning,
};

/// Where the cached credential stands before a run.
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialState {
    NoCredential,
    Cached(Token),
    Expired(Token),
    ScopeMismatch(Token),
}

impl CredentialState {
    /// Classifies a cached token against the scopes the run needs at `now`.
    ///
    /// A scope mismatch wins over expiry: refreshing cannot add scopes.
    pub fn classify(cached: Option<Token>, required_scope: &str, now: u64) -> Self {
        match cached {
            None => CredentialState::NoCredential,
            Some(token) if !token.covers_scope(required_scope) => CredentialState::ScopeMismatch(token),
            Some(token) if token.is_expired(now) => CredentialState::Expired(token),
            Some(token) => CredentialState::Cached(token),
        }
    }
}

/// On-disk cache of the OAuth token.
pub struct TokenManager {
    path: PathBuf,
}

impl TokenManager {
    /// Manager for `<data_local_dir>/rplsync/cache/token.json`.
    pub fn new() -> Self {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("rplsync/cache/token.json");
        Self { path }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the cached token.
    ///
    /// A missing file is `Ok(None)`; an unreadable or corrupt file is an error.
    pub async fn load(&self) -> Result<Option<Token>, AuthError> {
        let content = match async_fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AuthError::Cache(e.to_string())),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| AuthError::Cache(e.to_string()))
    }

    pub async fn persist(&self, token: &Token) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| AuthError::Cache(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(token).map_err(|e| AuthError::Cache(e.to_string()))?;
        async_fs::write(&self.path, json)
            .await
            .map_err(|e| AuthError::Cache(e.to_string()))
    }

    /// Deletes the cached token. Removing an absent cache succeeds.
    pub async fn remove(&self) -> Result<(), AuthError> {
        match async_fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::Cache(e.to_string())),
        }
    }

    /// Classifies the cache, treating a corrupt file as stale.
    pub async fn state(&self, required_scope: &str, log: &Logger) -> Result<CredentialState, AuthError> {
        let cached = match self.load().await {
            Ok(cached) => cached,
            Err(e) => {
                warning!(log, "Discarding unreadable token cache: {}", e);
                self.remove().await?;
                None
            }
        };
        Ok(CredentialState::classify(cached, required_scope, utils::now_timestamp()))
    }

    /// Returns a token that is valid for `oauth.scope`.
    ///
    /// Cached tokens are used as-is, expired ones refreshed. When refreshing
    /// fails or the cached scopes no longer match, the cache is deleted and
    /// the interactive flow runs once; its failure is final.
    pub async fn valid_token(&self, oauth: &OAuthSettings, log: &Logger) -> Result<Token, AuthError> {
        match self.state(&oauth.scope, log).await? {
            CredentialState::Cached(token) => return Ok(token),
            CredentialState::Expired(token) => match auth::refresh_token(oauth, &token.refresh_token).await {
                Ok(fresh) if fresh.covers_scope(&oauth.scope) => {
                    self.persist(&fresh).await?;
                    info!(log, "Refreshed access token");
                    return Ok(fresh);
                }
                Ok(_) => {
                    warning!(log, "Refreshed token lacks required scopes, re-authorizing");
                    self.remove().await?;
                }
                Err(e) => {
                    warning!(log, "Token refresh failed, re-authorizing: {}", e);
                    self.remove().await?;
                }
            },
            CredentialState::ScopeMismatch(_) => {
                warning!(log, "Scopes may have changed, re-authorizing");
                self.remove().await?;
            }
            CredentialState::NoCredential => {
                info!(log, "No cached credential, starting authorization");
            }
        }

        self.authorize(oauth, log).await
    }

    /// Runs the interactive flow and replaces the cache with its result.
    pub async fn authorize(&self, oauth: &OAuthSettings, log: &Logger) -> Result<Token, AuthError> {
        let token = auth::authorize(oauth, log).await?;
        self.persist(&token).await?;
        success!(log, "Authentication successful");
        Ok(token)
    }
}

impl Default for TokenManager {
    fn default() -> Self {
        Self::new()
    }
}
