//! Route access decisions for dashboard pages.
//!
//! Every page applies the same rules: public pages always render, private
//! pages wait for the session to load, then redirect to `/login` without a
//! user and to `/onboarding` until the profile finishes onboarding.

use serde::Serialize;

use super::state::AuthState;
use crate::config::{AuthConfig, normalize_path};

pub const LOGIN_PATH: &str = "/login";
pub const ONBOARDING_PATH: &str = "/onboarding";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "action", content = "to")]
pub enum RouteAccess {
    Allow,
    Wait,
    Redirect(&'static str),
}

#[must_use]
pub fn route_access(state: &AuthState, path: &str, config: &AuthConfig) -> RouteAccess {
    if config.is_public_route(path) {
        return RouteAccess::Allow;
    }
    if state.loading {
        return RouteAccess::Wait;
    }
    if state.user.is_none() {
        return RouteAccess::Redirect(LOGIN_PATH);
    }

    let onboarded = state
        .user_profile
        .as_ref()
        .is_some_and(|profile| profile.is_onboarding_complete);
    if !onboarded && normalize_path(path) != ONBOARDING_PATH {
        return RouteAccess::Redirect(ONBOARDING_PATH);
    }
    RouteAccess::Allow
}

/// Whether a private page should bounce to `/login` right now.
#[must_use]
pub fn should_redirect_unauth(state: &AuthState) -> bool {
    !state.loading && state.user.is_none()
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
