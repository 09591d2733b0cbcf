//! Mock identity fixture and in-memory auth provider.
//!
//! DESIGN
//! ======
//! The development identity is a value built by a factory and shared through
//! `Arc`, not a process-wide constant. Tests that need a different fixture
//! build their own `MockIdentity` and inject it.
//!
//! `MockProvider` accepts any password for the fixture email and keeps
//! accounts created through `sign_up` in memory, so the non-bypass session
//! path can be exercised without a real identity service.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::provider::{AuthProvider, ProviderError};
use crate::config::ProviderKind;
use crate::models::{Credentials, Session, User, UserProfile, now_ms};

pub const MOCK_UID: &str = "test-user-id";
pub const MOCK_EMAIL: &str = "test@example.com";
pub const MOCK_DISPLAY_NAME: &str = "Test User";

// =============================================================================
// FIXTURE
// =============================================================================

/// The fixed fake identity installed by bypass mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockIdentity {
    user: User,
    profile: UserProfile,
}

impl MockIdentity {
    #[must_use]
    pub fn new(user: User, profile: UserProfile) -> Self {
        Self { user, profile }
    }

    /// The standard development identity (`test-user-id`).
    #[must_use]
    pub fn standard() -> Self {
        let user = User {
            uid: MOCK_UID.to_owned(),
            email: Some(MOCK_EMAIL.to_owned()),
            display_name: Some(MOCK_DISPLAY_NAME.to_owned()),
            photo_url: None,
            email_verified: true,
            is_anonymous: false,
            provider_id: "mock".to_owned(),
        };
        let mut profile = UserProfile::for_user(&user, now_ms());
        profile.bio = Some("This is a test user account".to_owned());
        Self { user, profile }
    }

    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    #[must_use]
    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Fresh copy of the fixture as a session pair.
    #[must_use]
    pub fn session(&self) -> Session {
        Session { user: self.user.clone(), profile: self.profile.clone() }
    }
}

impl Default for MockIdentity {
    fn default() -> Self {
        Self::standard()
    }
}

// =============================================================================
// PROVIDER
// =============================================================================

struct MockAccount {
    password: String,
    user: User,
}

pub struct MockProvider {
    identity: Arc<MockIdentity>,
    accounts: RwLock<HashMap<String, MockAccount>>,
    current: RwLock<Option<User>>,
    latency: Duration,
}

impl MockProvider {
    /// Provider that starts signed in as the fixture identity.
    #[must_use]
    pub fn new(identity: Arc<MockIdentity>) -> Self {
        let current = Some(identity.user().clone());
        Self { identity, accounts: RwLock::new(HashMap::new()), current: RwLock::new(current), latency: Duration::ZERO }
    }

    /// Provider that starts with nobody signed in.
    #[must_use]
    pub fn signed_out(identity: Arc<MockIdentity>) -> Self {
        Self { identity, accounts: RwLock::new(HashMap::new()), current: RwLock::new(None), latency: Duration::ZERO }
    }

    /// Delay every call by `latency` to imitate a network round trip.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn simulate_network(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn is_fixture_email(&self, email: &str) -> bool {
        self.identity
            .user()
            .email
            .as_deref()
            .is_some_and(|fixture| fixture.eq_ignore_ascii_case(email))
    }
}

#[async_trait::async_trait]
impl AuthProvider for MockProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Mock
    }

    async fn current_user(&self) -> Result<Option<User>, ProviderError> {
        self.simulate_network().await;
        Ok(self.current.read().await.clone())
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<User, ProviderError> {
        self.simulate_network().await;
        let email = credentials.email.trim().to_ascii_lowercase();
        if email.is_empty() || credentials.password.is_empty() {
            return Err(ProviderError::InvalidCredentials);
        }

        let user = if self.is_fixture_email(&email) {
            self.identity.user().clone()
        } else {
            let accounts = self.accounts.read().await;
            match accounts.get(&email) {
                Some(account) if account.password == credentials.password => account.user.clone(),
                _ => return Err(ProviderError::InvalidCredentials),
            }
        };

        debug!(uid = %user.uid, "mock sign-in");
        *self.current.write().await = Some(user.clone());
        Ok(user)
    }

    async fn sign_up(&self, credentials: &Credentials, display_name: Option<&str>) -> Result<User, ProviderError> {
        self.simulate_network().await;
        let email = credentials.email.trim().to_ascii_lowercase();
        if email.is_empty() || credentials.password.is_empty() {
            return Err(ProviderError::InvalidCredentials);
        }

        let mut accounts = self.accounts.write().await;
        if self.is_fixture_email(&email) || accounts.contains_key(&email) {
            return Err(ProviderError::AccountExists(email));
        }

        let user = User {
            uid: Uuid::new_v4().to_string(),
            email: Some(email.clone()),
            display_name: display_name.map(str::to_owned),
            photo_url: None,
            email_verified: false,
            is_anonymous: false,
            provider_id: "password".to_owned(),
        };
        accounts.insert(email, MockAccount { password: credentials.password.clone(), user: user.clone() });
        drop(accounts);

        info!(uid = %user.uid, "mock account created");
        *self.current.write().await = Some(user.clone());
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.simulate_network().await;
        *self.current.write().await = None;
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError> {
        self.simulate_network().await;
        if email.trim().is_empty() {
            return Err(ProviderError::InvalidCredentials);
        }
        info!(email, "mock password reset requested");
        Ok(())
    }
}

#[cfg(test)]
#[path = "mock_test.rs"]
mod tests;
