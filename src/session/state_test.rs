use super::*;
use crate::auth::MockIdentity;
use crate::session::error::{ErrorKind, SessionError};

fn other_user(uid: &str) -> User {
    User {
        uid: uid.to_owned(),
        email: None,
        display_name: None,
        photo_url: None,
        email_verified: false,
        is_anonymous: false,
        provider_id: "password".into(),
    }
}

#[test]
fn default_state_is_loading() {
    let state = AuthState::default();
    assert!(state.loading);
    assert!(!state.initialized);
    assert_eq!(state.phase(), SessionPhase::Loading);
}

#[test]
fn install_bypass_settles_and_clears_error() {
    let mut state = AuthState::default();
    state.fail(ErrorRecord::new(ErrorKind::InitSignaled, &SessionError::InitSignaled("x".into())));
    state.install_bypass(MockIdentity::standard().session());

    assert!(!state.loading);
    assert!(state.initialized);
    assert!(state.error.is_none());
    assert!(state.bypass_auth_enabled);
    assert_eq!(state.phase(), SessionPhase::Bypassed);
}

#[test]
fn authenticate_leaves_bypass_mode() {
    let mut state = AuthState::default();
    state.install_bypass(MockIdentity::standard().session());
    let user = other_user("u1");
    let profile = UserProfile::for_user(&user, 1);
    state.authenticate(user, profile, true);

    assert!(!state.bypass_auth_enabled);
    assert!(state.is_new_user);
    assert_eq!(state.phase(), SessionPhase::Authenticated);
}

#[test]
fn fail_keeps_initialized_false() {
    let mut state = AuthState::default();
    state.fail(ErrorRecord::new(ErrorKind::InitTimeout, &SessionError::InitTimeout { timeout_ms: 10 }));
    assert!(!state.loading);
    assert!(!state.initialized);
    assert_eq!(state.phase(), SessionPhase::Errored);
    assert_eq!(state.error.as_ref().unwrap().code, "E_AUTH_TIMEOUT");
}

#[test]
fn sign_out_clears_identity() {
    let mut state = AuthState::default();
    state.install_bypass(MockIdentity::standard().session());
    state.sign_out();
    assert!(state.user.is_none());
    assert!(state.user_profile.is_none());
    assert!(!state.bypass_auth_enabled);
    assert_eq!(state.phase(), SessionPhase::SignedOut);
}

#[test]
fn adopt_profile_rejects_foreign_uid() {
    let mut state = AuthState::default();
    let user = other_user("u1");
    state.authenticate(user.clone(), UserProfile::for_user(&user, 1), false);

    let foreign = UserProfile::for_user(&other_user("u2"), 2);
    assert!(!state.adopt_profile(foreign));
    assert_eq!(state.user_profile.as_ref().unwrap().uid, "u1");

    let mut own = UserProfile::for_user(&user, 3);
    own.bio = Some("mine".into());
    assert!(state.adopt_profile(own));
    assert_eq!(state.user_profile.as_ref().unwrap().bio.as_deref(), Some("mine"));
}

#[test]
fn state_serializes_camel_case_flags() {
    let json = serde_json::to_value(AuthState::default()).unwrap();
    assert_eq!(json["loading"], true);
    assert_eq!(json["bypassAuthEnabled"], false);
    assert_eq!(json["retryCount"], 0);
    assert!(json["userProfile"].is_null());
}

#[test]
fn adopt_profile_rejects_stale_copy() {
    let mut state = AuthState::default();
    let user = other_user("u1");
    let mut current = UserProfile::for_user(&user, 10);
    current.bio = Some("newer".into());
    state.authenticate(user.clone(), current, false);

    let mut stale = UserProfile::for_user(&user, 5);
    stale.bio = Some("older".into());
    assert!(!state.adopt_profile(stale));
    assert_eq!(state.user_profile.as_ref().unwrap().bio.as_deref(), Some("newer"));

    let same_age = UserProfile::for_user(&user, 10);
    assert!(state.adopt_profile(same_age));
}
