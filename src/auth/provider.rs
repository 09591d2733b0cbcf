//! Auth provider contract.

use crate::config::ProviderKind;
use crate::error::ErrorCode;
use crate::models::{Credentials, User};

/// Errors produced by identity backends.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Email/password pair was rejected.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Sign-up attempted for an email that already has an account.
    #[error("account already exists: {0}")]
    AccountExists(String),

    /// The HTTP request to the identity service failed.
    #[error("identity request failed: {0}")]
    Request(String),

    /// The identity service returned a non-success HTTP status.
    #[error("identity response error: status {status}")]
    Response { status: u16, body: String },

    /// The identity service response body could not be deserialized.
    #[error("identity response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for ProviderError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "E_INVALID_CREDENTIALS",
            Self::AccountExists(_) => "E_ACCOUNT_EXISTS",
            Self::Request(_) => "E_IDENTITY_REQUEST",
            Self::Response { .. } => "E_IDENTITY_RESPONSE",
            Self::Parse(_) => "E_IDENTITY_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Response { status: 429 | 500..=599, .. })
    }
}

/// Identity backend used by the session manager.
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// The identity already signed in with this provider, if any.
    async fn current_user(&self) -> Result<Option<User>, ProviderError>;

    async fn sign_in(&self, credentials: &Credentials) -> Result<User, ProviderError>;

    async fn sign_up(&self, credentials: &Credentials, display_name: Option<&str>) -> Result<User, ProviderError>;

    async fn sign_out(&self) -> Result<(), ProviderError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError>;
}
