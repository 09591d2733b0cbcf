//! Identity and profile records.
//!
//! DESIGN
//! ======
//! `User` is what the identity provider knows about a person; `UserProfile`
//! is the dashboard's own record for that person. Both serialize with the
//! camelCase field names the browser dashboard already consumes.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Current time as milliseconds since Unix epoch.
#[must_use]
pub fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(i64::MAX)
}

// =============================================================================
// IDENTITY
// =============================================================================

/// Identity record returned by an auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub is_anonymous: bool,
    /// Provider that issued the identity (e.g. `"mock"`, `"password"`).
    #[serde(default)]
    pub provider_id: String,
}

/// Email/password pair submitted by the login and signup forms.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// PROFILE
// =============================================================================

/// Application-level profile. Mirrors the `user_profiles` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub is_onboarding_complete: bool,
    pub instagram_handle: Option<String>,
    pub youtube_handle: Option<String>,
    pub twitter_handle: Option<String>,
    pub tiktok_handle: Option<String>,
    pub linkedin_handle: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub content_types: Vec<String>,
}

impl UserProfile {
    /// Fresh profile seeded from the identity record, as created on first fetch.
    #[must_use]
    pub fn for_user(user: &User, now: i64) -> Self {
        Self {
            uid: user.uid.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            photo_url: user.photo_url.clone(),
            bio: None,
            created_at: now,
            updated_at: now,
            is_onboarding_complete: false,
            instagram_handle: None,
            youtube_handle: None,
            twitter_handle: None,
            tiktok_handle: None,
            linkedin_handle: None,
            interests: Vec::new(),
            content_types: Vec::new(),
        }
    }

    /// Stamp `updated_at` with the current time, never moving it backwards.
    pub fn touch(&mut self) {
        self.updated_at = now_ms().max(self.updated_at);
    }
}

/// Partial profile edit. Unset fields leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_onboarding_complete: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiktok_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_types: Option<Vec<String>>,
}

impl ProfileUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge every set field into `profile`. Does not touch timestamps.
    pub fn apply(&self, profile: &mut UserProfile) {
        fn text(slot: &mut Option<String>, value: Option<&String>) {
            if let Some(value) = value {
                *slot = Some(value.clone());
            }
        }

        text(&mut profile.email, self.email.as_ref());
        text(&mut profile.display_name, self.display_name.as_ref());
        text(&mut profile.photo_url, self.photo_url.as_ref());
        text(&mut profile.bio, self.bio.as_ref());
        text(&mut profile.instagram_handle, self.instagram_handle.as_ref());
        text(&mut profile.youtube_handle, self.youtube_handle.as_ref());
        text(&mut profile.twitter_handle, self.twitter_handle.as_ref());
        text(&mut profile.tiktok_handle, self.tiktok_handle.as_ref());
        text(&mut profile.linkedin_handle, self.linkedin_handle.as_ref());
        if let Some(done) = self.is_onboarding_complete {
            profile.is_onboarding_complete = done;
        }
        if let Some(interests) = &self.interests {
            profile.interests.clone_from(interests);
        }
        if let Some(content_types) = &self.content_types {
            profile.content_types.clone_from(content_types);
        }
    }
}

/// Identity plus profile for the active client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub profile: UserProfile,
}

#[cfg(test)]
#[path = "models_test.rs"]
mod tests;
