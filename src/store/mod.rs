//! Profile persistence.
//!
//! ARCHITECTURE
//! ============
//! `ProfileStore` is the only path by which profile edits become durable.
//! The session manager holds it as `Arc<dyn ProfileStore>`; `main` picks the
//! Postgres implementation when `DATABASE_URL` is set and the in-memory one
//! otherwise.

pub mod memory;
pub mod postgres;

pub use memory::MemoryProfileStore;
pub use postgres::PgProfileStore;

use tracing::info;

use crate::error::ErrorCode;
use crate::models::{ProfileUpdate, User, UserProfile, now_ms};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("profile not found: {0}")]
    NotFound(String),
    #[error("profile already exists: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_PROFILE_NOT_FOUND",
            Self::Conflict(_) => "E_PROFILE_CONFLICT",
            Self::Db(_) => "E_DATABASE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Db(sqlx::Error::PoolTimedOut | sqlx::Error::Io(_)))
    }
}

#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Insert a new profile. Fails with `Conflict` if one exists for the uid.
    async fn create_profile(&self, profile: &UserProfile) -> Result<UserProfile, StoreError>;

    /// Merge `update` into the stored profile, stamp `updated_at`, and return
    /// the full result.
    async fn update_profile(&self, uid: &str, update: &ProfileUpdate) -> Result<UserProfile, StoreError>;
}

/// Fetch the profile for `user`, creating it on first access.
/// Returns the profile and whether it was just created.
///
/// # Errors
///
/// Propagates store failures.
pub async fn get_or_create_profile(store: &dyn ProfileStore, user: &User) -> Result<(UserProfile, bool), StoreError> {
    if let Some(profile) = store.get_profile(&user.uid).await? {
        return Ok((profile, false));
    }

    let fresh = UserProfile::for_user(user, now_ms());
    match store.create_profile(&fresh).await {
        Ok(profile) => {
            info!(uid = %user.uid, "profile created on first fetch");
            Ok((profile, true))
        }
        // Lost a race with a concurrent creator; read theirs.
        Err(StoreError::Conflict(_)) => {
            let profile = store
                .get_profile(&user.uid)
                .await?
                .ok_or_else(|| StoreError::NotFound(user.uid.clone()))?;
            Ok((profile, false))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
