//! Auth-session state for the current dashboard client.
//!
//! SYSTEM CONTEXT
//! ==============
//! Route guards and user-aware views render from this record. Only the
//! session manager writes it; every transition below keeps
//! `user_profile.uid == user.uid` whenever both are present.

use serde::{Deserialize, Serialize};

use super::error::ErrorRecord;
use crate::models::{Session, User, UserProfile};

/// Coarse session phase derived from the state flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Loading,
    Bypassed,
    Authenticated,
    SignedOut,
    Errored,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub user: Option<User>,
    pub user_profile: Option<UserProfile>,
    pub loading: bool,
    pub error: Option<ErrorRecord>,
    pub is_new_user: bool,
    pub bypass_auth_enabled: bool,
    pub initialized: bool,
    pub retry_count: u32,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            user_profile: None,
            loading: true,
            error: None,
            is_new_user: false,
            bypass_auth_enabled: false,
            initialized: false,
            retry_count: 0,
        }
    }
}

impl AuthState {
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.loading {
            SessionPhase::Loading
        } else if self.bypass_auth_enabled && self.user.is_some() {
            SessionPhase::Bypassed
        } else if self.user.is_some() {
            SessionPhase::Authenticated
        } else if !self.initialized && self.error.is_some() {
            SessionPhase::Errored
        } else {
            SessionPhase::SignedOut
        }
    }

    /// Install the mock identity.
    pub(crate) fn install_bypass(&mut self, session: Session) {
        self.user = Some(session.user);
        self.user_profile = Some(session.profile);
        self.bypass_auth_enabled = true;
        self.is_new_user = false;
        self.settle();
    }

    /// Install a real identity with its profile.
    pub(crate) fn authenticate(&mut self, user: User, profile: UserProfile, is_new_user: bool) {
        debug_assert_eq!(user.uid, profile.uid);
        self.user = Some(user);
        self.user_profile = Some(profile);
        self.bypass_auth_enabled = false;
        self.is_new_user = is_new_user;
        self.settle();
    }

    /// Drop identity and profile, leaving bypass mode.
    pub(crate) fn sign_out(&mut self) {
        self.user = None;
        self.user_profile = None;
        self.bypass_auth_enabled = false;
        self.is_new_user = false;
        self.settle();
    }

    /// Adopt `profile` only if it belongs to the current user and is not
    /// older than the profile already held.
    pub(crate) fn adopt_profile(&mut self, profile: UserProfile) -> bool {
        let matches = self.user.as_ref().is_some_and(|u| u.uid == profile.uid);
        let stale = self
            .user_profile
            .as_ref()
            .is_some_and(|current| current.uid == profile.uid && current.updated_at > profile.updated_at);
        if !matches || stale {
            return false;
        }
        self.user_profile = Some(profile);
        true
    }

    /// Record a failure and stop loading. `initialized` is left as is.
    pub(crate) fn fail(&mut self, record: ErrorRecord) {
        self.error = Some(record);
        self.loading = false;
    }

    fn settle(&mut self) {
        self.error = None;
        self.loading = false;
        self.initialized = true;
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
