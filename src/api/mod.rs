//! # API Module
//!
//! HTTP endpoints served by the short-lived local server that exists only
//! while the user authorizes rplsync in the browser.
//!
//! - [`callback`] - receives the authorization code from Spotify and completes
//!   the PKCE exchange, storing the token in the shared state
//! - [`health`] - status and version, handy to check the redirect target is up
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use rplsync::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
