//! Error types for every stage of a sync run.
//!
//! Per-item failures (a track that cannot be resolved, a single add that is
//! rejected) never surface as errors past the synchronizer. Everything in
//! [`SyncError`] aborts the run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("cannot prepare configuration directory: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Spotify API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response from Spotify API: {0}")]
    Decode(String),

    #[error("invalid request URL: {0}")]
    Url(String),

    #[error("rate limited by Spotify API, retry after {0} seconds")]
    RateLimited(u64),
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Unavailable(#[from] reqwest::Error),

    #[error("feed returned status {0}")]
    Status(u16),

    #[error("malformed feed: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no usable credential for user {0}")]
    NoCredential(String),

    #[error("credential belongs to {actual}, expected {expected}")]
    UserMismatch { expected: String, actual: String },

    #[error("token cache error: {0}")]
    Cache(String),

    #[error("token request failed: {0}")]
    Token(String),

    #[error("callback server error: {0}")]
    Server(String),

    #[error("authorization failed or timed out")]
    Timeout,

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Run-level failures. Each of these ends the run after being logged.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("authentication: {0}")]
    Auth(#[from] AuthError),

    #[error("feed unavailable: {0}")]
    FeedUnavailable(#[from] FeedError),

    #[error("playlist service: {0}")]
    Service(#[from] ServiceError),
}
