//! In-memory profile store for development and tests.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::{ProfileStore, StoreError};
use crate::models::{ProfileUpdate, UserProfile};

#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<HashMap<String, UserProfile>>,
}

impl MemoryProfileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `profiles`, keyed by uid.
    #[must_use]
    pub fn with_profiles(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        let profiles = profiles.into_iter().map(|p| (p.uid.clone(), p)).collect();
        Self { profiles: RwLock::new(profiles) }
    }

    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.profiles.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.profiles.read().await.get(uid).cloned())
    }

    async fn create_profile(&self, profile: &UserProfile) -> Result<UserProfile, StoreError> {
        let mut profiles = self.profiles.write().await;
        if profiles.contains_key(&profile.uid) {
            return Err(StoreError::Conflict(profile.uid.clone()));
        }
        profiles.insert(profile.uid.clone(), profile.clone());
        Ok(profile.clone())
    }

    async fn update_profile(&self, uid: &str, update: &ProfileUpdate) -> Result<UserProfile, StoreError> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .get_mut(uid)
            .ok_or_else(|| StoreError::NotFound(uid.to_owned()))?;
        update.apply(profile);
        profile.touch();
        Ok(profile.clone())
    }
}
