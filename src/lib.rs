//! Radio Playlist Sync Library
//!
//! This library keeps a Spotify playlist in sync with a radio station's
//! "recently played" feed. Played tracks are fetched from the station's public
//! JSON endpoint, filtered against recurring blackout windows, resolved to
//! Spotify tracks, and head-inserted into a named playlist when they are not
//! already part of it.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints for the local OAuth callback server
//! - `cli` - Command-line entry points
//! - `config` - Configuration loaded from `.env` files and the environment
//! - `error` - Error types for every stage of a run
//! - `feed` - Client for the station's recently played feed
//! - `logging` - Injected structured line logger
//! - `management` - Credential cache and credential state machine
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client and OAuth PKCE flow
//! - `sync` - Program filter, track resolver, playlist locator and synchronizer
//! - `types` - Domain records and wire types
//! - `utils` - PKCE helpers and small utilities
//!
//! # Example
//!
//! ```
//! use rplsync::{config, logging::Logger};
//!
//! #[tokio::main]
//! async fn main() -> rplsync::Res<()> {
//!     config::load_env().await?;
//!     let log = Logger::console();
//!     rplsync::info!(log, "Ready");
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod logging;
pub mod management;
pub mod server;
pub mod spotify;
pub mod sync;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Used at the outer edges of the application where the concrete error type
/// does not matter any more. Inner layers return the typed errors from
/// [`error`].
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Logs an informational message through the given [`logging::Logger`].
///
/// # Example
///
/// ```
/// info!(log, "Found {} tracks", count);
/// ```
#[macro_export]
macro_rules! info {
  ($log:expr, $($arg:tt)*) => ({
    $log.info(std::format!($($arg)*))
  })
}

/// Logs a success message through the given [`logging::Logger`].
#[macro_export]
macro_rules! success {
  ($log:expr, $($arg:tt)*) => ({
    $log.success(std::format!($($arg)*))
  })
}

/// Logs an error message through the given [`logging::Logger`].
///
/// Unlike a panic or `process::exit`, this only records the failure. Callers
/// decide themselves whether the run continues.
#[macro_export]
macro_rules! error {
  ($log:expr, $($arg:tt)*) => ({
    $log.error(std::format!($($arg)*))
  })
}

/// Logs a warning message through the given [`logging::Logger`].
#[macro_export]
macro_rules! warning {
  ($log:expr, $($arg:tt)*) => ({
    $log.warning(std::format!($($arg)*))
  })
}
