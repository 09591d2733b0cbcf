//! Session errors and their render-friendly records.

use serde::{Deserialize, Serialize};

use crate::auth::ProviderError;
use crate::error::ErrorCode;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("auth initialization timed out after {timeout_ms}ms")]
    InitTimeout { timeout_ms: u64 },

    #[error("auth initialization failed: {0}")]
    InitSignaled(String),

    #[error("no user is signed in")]
    Unauthenticated,

    #[error("auth bypass is disabled outside test mode")]
    BypassDisallowed,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InitTimeout { .. } => "E_AUTH_TIMEOUT",
            Self::InitSignaled(_) => "E_AUTH_INIT",
            Self::Unauthenticated => "E_UNAUTHENTICATED",
            Self::BypassDisallowed => "E_BYPASS_DISALLOWED",
            Self::Provider(e) => e.error_code(),
            Self::Store(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::InitTimeout { .. } => true,
            Self::Provider(e) => e.retryable(),
            Self::Store(e) => e.retryable(),
            _ => false,
        }
    }
}

/// Which operation produced a recorded error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InitTimeout,
    InitSignaled,
    Setup,
    ProfileUpdate,
    SignIn,
    SignOut,
    Bypass,
}

/// Error as kept in `AuthState` for passive display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    pub code: String,
    pub message: String,
}

impl ErrorRecord {
    #[must_use]
    pub fn new(kind: ErrorKind, err: &SessionError) -> Self {
        Self { kind, code: err.error_code().to_owned(), message: err.to_string() }
    }
}
