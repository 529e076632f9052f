use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{Extension, Router, routing::get};
use tokio::{net::TcpListener, sync::Mutex};

use crate::{api, error::AuthError, logging::Logger, spotify::auth::OAuthSettings, types::PkceToken};

/// State the callback handler needs to finish the code exchange.
#[derive(Clone)]
pub struct CallbackState {
    pub pkce: Arc<Mutex<Option<PkceToken>>>,
    pub oauth: OAuthSettings,
    pub log: Logger,
}

pub async fn bind(addr: &str) -> Result<TcpListener, AuthError> {
    let addr = SocketAddr::from_str(addr)
        .map_err(|e| AuthError::Server(format!("cannot parse server address '{}': {}", addr, e)))?;

    TcpListener::bind(&addr)
        .await
        .map_err(|e| AuthError::Server(format!("cannot bind {}: {}", addr, e)))
}

pub fn router(state: CallbackState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback).layer(Extension(state)))
}

pub async fn serve(listener: TcpListener, state: CallbackState) -> Result<(), AuthError> {
    axum::serve(listener, router(state))
        .await
        .map_err(|e| AuthError::Server(e.to_string()))
}
