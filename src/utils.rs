use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Seconds since the Unix epoch.
pub fn now_timestamp() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

/// Builds the `spotify:track:<id>` URI the add endpoint expects.
pub fn track_uri_from_id(id: &str) -> String {
    format!("spotify:track:{}", id)
}
