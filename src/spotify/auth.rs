use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, Url};
use tokio::sync::Mutex;

use crate::{
    config::Config,
    error::AuthError,
    info,
    logging::Logger,
    server,
    types::{PkceToken, Token, TokenResponse},
    utils, warning,
};

/// Maximum time the user gets to approve access in the browser.
const AUTHORIZATION_TIMEOUT: Duration = Duration::from_secs(60);

/// OAuth client settings shared by the authorization flow and the callback server.
#[derive(Debug, Clone)]
pub struct OAuthSettings {
    pub client_id: String,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub scope: String,
    pub server_addr: String,
}

impl From<&Config> for OAuthSettings {
    fn from(config: &Config) -> Self {
        OAuthSettings {
            client_id: config.client_id.clone(),
            redirect_uri: config.redirect_uri.clone(),
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
            scope: config.scope.clone(),
            server_addr: config.server_addr.clone(),
        }
    }
}

/// Runs the interactive OAuth 2.0 PKCE flow and returns a fresh token.
///
/// 1. Generates the code verifier and its S256 challenge
/// 2. Binds the local callback server
/// 3. Opens the authorization URL in the browser (or asks the user to)
/// 4. Waits up to one minute for the callback to complete the code exchange
///
/// The callback server is shut down before returning.
pub async fn authorize(oauth: &OAuthSettings, log: &Logger) -> Result<Token, AuthError> {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    let shared_state: Arc<Mutex<Option<PkceToken>>> = Arc::new(Mutex::new(Some(PkceToken {
        code_verifier,
        token: None,
    })));

    let listener = server::bind(&oauth.server_addr).await?;
    let server_state = server::CallbackState {
        pkce: Arc::clone(&shared_state),
        oauth: oauth.clone(),
        log: log.clone(),
    };
    let server = tokio::spawn(server::serve(listener, server_state));

    let auth_url = authorization_url(oauth, &code_challenge)?;
    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            log,
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        );
    } else {
        info!(log, "Waiting for authorization in the browser");
    }

    let token = wait_for_token(shared_state).await;
    server.abort();

    token.ok_or(AuthError::Timeout)
}

/// Builds the authorize URL with properly encoded query parameters.
pub fn authorization_url(oauth: &OAuthSettings, code_challenge: &str) -> Result<Url, AuthError> {
    Url::parse_with_params(
        &oauth.auth_url,
        &[
            ("client_id", oauth.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", oauth.redirect_uri.as_str()),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
            ("scope", oauth.scope.as_str()),
        ],
    )
    .map_err(|e| AuthError::Token(format!("invalid authorization url: {}", e)))
}

/// Polls the shared state once per second until the callback stored a token.
async fn wait_for_token(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Option<Token> {
    use std::time::Instant;

    let pb = ProgressBar::new_spinner();
    pb.set_message("Waiting for Spotify authorization...");
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let start = Instant::now();
    while start.elapsed() < AUTHORIZATION_TIMEOUT {
        let lock = shared_state.lock().await;
        if let Some(token) = lock.as_ref().and_then(|pkce| pkce.token.clone()) {
            pb.finish_and_clear();
            return Some(token);
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    pb.finish_and_clear();
    None
}

/// Exchanges an authorization code for a token, proving possession of the verifier.
pub async fn exchange_code_pkce(
    oauth: &OAuthSettings,
    code: &str,
    verifier: &str,
) -> Result<Token, AuthError> {
    let client = Client::new();
    let res = client
        .post(&oauth.token_url)
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", oauth.client_id.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", oauth.redirect_uri.as_str()),
        ])
        .send()
        .await
        .map_err(|e| AuthError::Token(e.to_string()))?;

    let response = decode_token_response(res).await?;
    let refresh_token = response.refresh_token.clone().unwrap_or_default();
    Ok(into_token(response, refresh_token))
}

/// Exchanges a refresh token for a new access token.
///
/// Spotify may omit the refresh token from the response, in which case the
/// previous one stays valid and is carried over.
pub async fn refresh_token(oauth: &OAuthSettings, refresh_token: &str) -> Result<Token, AuthError> {
    let client = Client::new();
    let res = client
        .post(&oauth.token_url)
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", oauth.client_id.as_str()),
        ])
        .send()
        .await
        .map_err(|e| AuthError::Token(e.to_string()))?;

    let response = decode_token_response(res).await?;
    let carried = response
        .refresh_token
        .clone()
        .unwrap_or_else(|| refresh_token.to_string());
    Ok(into_token(response, carried))
}

async fn decode_token_response(res: reqwest::Response) -> Result<TokenResponse, AuthError> {
    let status = res.status();
    let body = res.text().await.map_err(|e| AuthError::Token(e.to_string()))?;
    if !status.is_success() {
        return Err(AuthError::Token(format!("token endpoint returned {}: {}", status, body)));
    }
    serde_json::from_str(&body).map_err(|e| AuthError::Token(e.to_string()))
}

fn into_token(response: TokenResponse, refresh_token: String) -> Token {
    Token {
        access_token: response.access_token,
        refresh_token,
        scope: response.scope,
        expires_in: response.expires_in,
        obtained_at: utils::now_timestamp(),
    }
}
