mod auth;

pub use auth::CredentialState;
pub use auth::TokenManager;
