use super::*;

fn creds(email: &str, password: &str) -> Credentials {
    Credentials { email: email.to_owned(), password: password.to_owned() }
}

// =============================================================================
// MockIdentity
// =============================================================================

#[test]
fn standard_identity_uses_fixed_uid() {
    let identity = MockIdentity::standard();
    assert_eq!(identity.user().uid, MOCK_UID);
    assert_eq!(identity.profile().uid, MOCK_UID);
    assert_eq!(identity.user().email.as_deref(), Some(MOCK_EMAIL));
    assert!(!identity.profile().is_onboarding_complete);
}

#[test]
fn session_returns_independent_copies() {
    let identity = MockIdentity::standard();
    let mut a = identity.session();
    a.profile.bio = Some("edited".into());
    let b = identity.session();
    assert_ne!(a.profile.bio, b.profile.bio);
    assert_eq!(b.profile, *identity.profile());
}

#[test]
fn custom_fixture_is_injectable() {
    let user = User {
        uid: "fixture-2".into(),
        email: Some("other@example.com".into()),
        display_name: None,
        photo_url: None,
        email_verified: false,
        is_anonymous: true,
        provider_id: "mock".into(),
    };
    let profile = UserProfile::for_user(&user, 1);
    let identity = MockIdentity::new(user, profile);
    assert_eq!(identity.session().user.uid, "fixture-2");
}

// =============================================================================
// MockProvider
// =============================================================================

#[tokio::test]
async fn new_provider_starts_signed_in_as_fixture() {
    let provider = MockProvider::new(Arc::new(MockIdentity::standard()));
    let user = provider.current_user().await.unwrap().unwrap();
    assert_eq!(user.uid, MOCK_UID);
    assert_eq!(provider.kind(), ProviderKind::Mock);
}

#[tokio::test]
async fn signed_out_provider_has_no_user() {
    let provider = MockProvider::signed_out(Arc::new(MockIdentity::standard()));
    assert!(provider.current_user().await.unwrap().is_none());
}

#[tokio::test]
async fn fixture_email_signs_in_with_any_password() {
    let provider = MockProvider::signed_out(Arc::new(MockIdentity::standard()));
    let user = provider.sign_in(&creds("TEST@example.com", "anything")).await.unwrap();
    assert_eq!(user.uid, MOCK_UID);
    assert_eq!(provider.current_user().await.unwrap().unwrap().uid, MOCK_UID);
}

#[tokio::test]
async fn empty_password_is_rejected() {
    let provider = MockProvider::signed_out(Arc::new(MockIdentity::standard()));
    let err = provider.sign_in(&creds(MOCK_EMAIL, "")).await.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidCredentials));
}

#[tokio::test]
async fn unknown_email_is_rejected() {
    let provider = MockProvider::signed_out(Arc::new(MockIdentity::standard()));
    let err = provider.sign_in(&creds("nobody@example.com", "pw")).await.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidCredentials));
}

#[tokio::test]
async fn sign_up_then_sign_in_round_trip() {
    let provider = MockProvider::signed_out(Arc::new(MockIdentity::standard()));
    let created = provider
        .sign_up(&creds("new@example.com", "s3cret"), Some("New Creator"))
        .await
        .unwrap();
    assert_ne!(created.uid, MOCK_UID);
    assert_eq!(created.display_name.as_deref(), Some("New Creator"));

    provider.sign_out().await.unwrap();
    assert!(provider.current_user().await.unwrap().is_none());

    let again = provider.sign_in(&creds("new@example.com", "s3cret")).await.unwrap();
    assert_eq!(again.uid, created.uid);

    let wrong = provider.sign_in(&creds("new@example.com", "nope")).await.unwrap_err();
    assert!(matches!(wrong, ProviderError::InvalidCredentials));
}

#[tokio::test]
async fn duplicate_sign_up_errors() {
    let provider = MockProvider::signed_out(Arc::new(MockIdentity::standard()));
    provider.sign_up(&creds("dup@example.com", "pw"), None).await.unwrap();
    let err = provider.sign_up(&creds("dup@example.com", "pw"), None).await.unwrap_err();
    assert!(matches!(err, ProviderError::AccountExists(_)));

    let err = provider.sign_up(&creds(MOCK_EMAIL, "pw"), None).await.unwrap_err();
    assert!(matches!(err, ProviderError::AccountExists(_)));
}

#[tokio::test]
async fn password_reset_requires_email() {
    let provider = MockProvider::new(Arc::new(MockIdentity::standard()));
    assert!(provider.send_password_reset("someone@example.com").await.is_ok());
    assert!(provider.send_password_reset("  ").await.is_err());
}

#[tokio::test]
async fn latency_delays_calls() {
    let provider = MockProvider::new(Arc::new(MockIdentity::standard())).with_latency(Duration::from_millis(20));
    let started = std::time::Instant::now();
    provider.current_user().await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(20));
}
