use super::*;

fn user(uid: &str) -> User {
    User {
        uid: uid.to_owned(),
        email: Some(format!("{uid}@example.com")),
        display_name: Some("Creator".into()),
        photo_url: None,
        email_verified: false,
        is_anonymous: false,
        provider_id: "password".into(),
    }
}

/// Store whose create always loses the race to a concurrent writer.
struct RacingStore {
    inner: MemoryProfileStore,
}

#[async_trait::async_trait]
impl ProfileStore for RacingStore {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, StoreError> {
        self.inner.get_profile(uid).await
    }

    async fn create_profile(&self, profile: &UserProfile) -> Result<UserProfile, StoreError> {
        let mut winner = profile.clone();
        winner.bio = Some("created elsewhere".into());
        self.inner.create_profile(&winner).await?;
        Err(StoreError::Conflict(profile.uid.clone()))
    }

    async fn update_profile(&self, uid: &str, update: &ProfileUpdate) -> Result<UserProfile, StoreError> {
        self.inner.update_profile(uid, update).await
    }
}

// =============================================================================
// get_or_create_profile
// =============================================================================

#[tokio::test]
async fn creates_profile_on_first_fetch() {
    let store = MemoryProfileStore::new();
    let (profile, created) = get_or_create_profile(&store, &user("u1")).await.unwrap();
    assert!(created);
    assert_eq!(profile.uid, "u1");
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn returns_existing_profile_without_creating() {
    let mut existing = UserProfile::for_user(&user("u1"), 42);
    existing.bio = Some("already here".into());
    let store = MemoryProfileStore::with_profiles([existing.clone()]);

    let (profile, created) = get_or_create_profile(&store, &user("u1")).await.unwrap();
    assert!(!created);
    assert_eq!(profile, existing);
}

#[tokio::test]
async fn conflict_on_create_reads_winner() {
    let store = RacingStore { inner: MemoryProfileStore::new() };
    let (profile, created) = get_or_create_profile(&store, &user("u2")).await.unwrap();
    assert!(!created);
    assert_eq!(profile.bio.as_deref(), Some("created elsewhere"));
}

// =============================================================================
// MemoryProfileStore
// =============================================================================

#[tokio::test]
async fn memory_update_merges_and_stamps() {
    let store = MemoryProfileStore::with_profiles([UserProfile::for_user(&user("u1"), 0)]);
    let update = ProfileUpdate { bio: Some("new bio".into()), ..ProfileUpdate::default() };

    let profile = store.update_profile("u1", &update).await.unwrap();
    assert_eq!(profile.bio.as_deref(), Some("new bio"));
    assert!(profile.updated_at > 0);
    assert_eq!(store.get_profile("u1").await.unwrap().unwrap(), profile);
}

#[tokio::test]
async fn memory_update_missing_profile_not_found() {
    let store = MemoryProfileStore::new();
    let err = store.update_profile("ghost", &ProfileUpdate::default()).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(ref uid) if uid == "ghost"));
    assert_eq!(err.error_code(), "E_PROFILE_NOT_FOUND");
    assert!(!err.retryable());
}

#[tokio::test]
async fn memory_duplicate_create_conflicts() {
    let store = MemoryProfileStore::new();
    let profile = UserProfile::for_user(&user("u1"), 1);
    store.create_profile(&profile).await.unwrap();
    assert!(matches!(store.create_profile(&profile).await, Err(StoreError::Conflict(_))));
    assert!(!store.is_empty().await);
}
