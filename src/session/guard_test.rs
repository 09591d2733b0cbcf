use super::*;
use crate::auth::MockIdentity;

fn ready_state(onboarded: bool) -> AuthState {
    let mut session = MockIdentity::standard().session();
    session.profile.is_onboarding_complete = onboarded;
    let mut state = AuthState::default();
    state.authenticate(session.user, session.profile, false);
    state
}

// =============================================================================
// should_redirect_unauth
// =============================================================================

#[test]
fn should_redirect_unauth_when_not_loading_and_user_missing() {
    let state = AuthState { loading: false, ..AuthState::default() };
    assert!(should_redirect_unauth(&state));
}

#[test]
fn should_not_redirect_while_loading() {
    let state = AuthState::default();
    assert!(!should_redirect_unauth(&state));
}

#[test]
fn should_not_redirect_when_user_exists() {
    assert!(!should_redirect_unauth(&ready_state(true)));
}

// =============================================================================
// route_access
// =============================================================================

#[test]
fn public_route_always_allowed() {
    let config = AuthConfig::default();
    assert_eq!(route_access(&AuthState::default(), "/login", &config), RouteAccess::Allow);
    let signed_out = AuthState { loading: false, ..AuthState::default() };
    assert_eq!(route_access(&signed_out, "/signup", &config), RouteAccess::Allow);
}

#[test]
fn private_route_waits_while_loading() {
    let config = AuthConfig::default();
    assert_eq!(route_access(&AuthState::default(), "/dashboard", &config), RouteAccess::Wait);
}

#[test]
fn private_route_redirects_to_login_without_user() {
    let config = AuthConfig::default();
    let state = AuthState { loading: false, initialized: true, ..AuthState::default() };
    assert_eq!(route_access(&state, "/dashboard", &config), RouteAccess::Redirect(LOGIN_PATH));
}

#[test]
fn incomplete_onboarding_redirects_to_onboarding() {
    let config = AuthConfig::default();
    let state = ready_state(false);
    assert_eq!(route_access(&state, "/analytics", &config), RouteAccess::Redirect(ONBOARDING_PATH));
    assert_eq!(route_access(&state, "/onboarding/", &config), RouteAccess::Allow);
}

#[test]
fn onboarded_user_allowed_everywhere() {
    let config = AuthConfig::default();
    let state = ready_state(true);
    assert_eq!(route_access(&state, "/analytics", &config), RouteAccess::Allow);
    assert_eq!(route_access(&state, "/monetization", &config), RouteAccess::Allow);
}

#[test]
fn route_access_serializes_with_action_tag() {
    let json = serde_json::to_value(RouteAccess::Redirect(LOGIN_PATH)).unwrap();
    assert_eq!(json["action"], "redirect");
    assert_eq!(json["to"], "/login");
    let json = serde_json::to_value(RouteAccess::Wait).unwrap();
    assert_eq!(json["action"], "wait");
}
