//! Postgres-backed profile store.
//!
//! DESIGN
//! ======
//! Updates are read-modify-write inside a transaction holding a row lock
//! (`SELECT ... FOR UPDATE`), so the merge rules in `ProfileUpdate::apply`
//! are the only merge rules; the SQL never decides which fields change.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::{ProfileStore, StoreError};
use crate::models::{ProfileUpdate, UserProfile};

const PROFILE_COLUMNS: &str = "uid, email, display_name, photo_url, bio, created_at, updated_at, \
     is_onboarding_complete, instagram_handle, youtube_handle, twitter_handle, tiktok_handle, \
     linkedin_handle, interests, content_types";

#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_profile(row: &PgRow) -> UserProfile {
    UserProfile {
        uid: row.get("uid"),
        email: row.get("email"),
        display_name: row.get("display_name"),
        photo_url: row.get("photo_url"),
        bio: row.get("bio"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        is_onboarding_complete: row.get("is_onboarding_complete"),
        instagram_handle: row.get("instagram_handle"),
        youtube_handle: row.get("youtube_handle"),
        twitter_handle: row.get("twitter_handle"),
        tiktok_handle: row.get("tiktok_handle"),
        linkedin_handle: row.get("linkedin_handle"),
        interests: row.get("interests"),
        content_types: row.get("content_types"),
    }
}

#[async_trait::async_trait]
impl ProfileStore for PgProfileStore {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, StoreError> {
        let row = sqlx::query(&format!("SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE uid = $1"))
            .bind(uid)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_profile))
    }

    async fn create_profile(&self, profile: &UserProfile) -> Result<UserProfile, StoreError> {
        let row = sqlx::query(&format!(
            r"INSERT INTO user_profiles ({PROFILE_COLUMNS})
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
              ON CONFLICT (uid) DO NOTHING
              RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(&profile.uid)
        .bind(&profile.email)
        .bind(&profile.display_name)
        .bind(&profile.photo_url)
        .bind(&profile.bio)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .bind(profile.is_onboarding_complete)
        .bind(&profile.instagram_handle)
        .bind(&profile.youtube_handle)
        .bind(&profile.twitter_handle)
        .bind(&profile.tiktok_handle)
        .bind(&profile.linkedin_handle)
        .bind(&profile.interests)
        .bind(&profile.content_types)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref()
            .map(row_to_profile)
            .ok_or_else(|| StoreError::Conflict(profile.uid.clone()))
    }

    async fn update_profile(&self, uid: &str, update: &ProfileUpdate) -> Result<UserProfile, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!("SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE uid = $1 FOR UPDATE"))
            .bind(uid)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::NotFound(uid.to_owned()))?;

        let mut profile = row_to_profile(&row);
        update.apply(&mut profile);
        profile.touch();

        sqlx::query(
            r"UPDATE user_profiles SET
                  email = $2,
                  display_name = $3,
                  photo_url = $4,
                  bio = $5,
                  updated_at = $6,
                  is_onboarding_complete = $7,
                  instagram_handle = $8,
                  youtube_handle = $9,
                  twitter_handle = $10,
                  tiktok_handle = $11,
                  linkedin_handle = $12,
                  interests = $13,
                  content_types = $14
              WHERE uid = $1",
        )
        .bind(&profile.uid)
        .bind(&profile.email)
        .bind(&profile.display_name)
        .bind(&profile.photo_url)
        .bind(&profile.bio)
        .bind(profile.updated_at)
        .bind(profile.is_onboarding_complete)
        .bind(&profile.instagram_handle)
        .bind(&profile.youtube_handle)
        .bind(&profile.twitter_handle)
        .bind(&profile.tiktok_handle)
        .bind(&profile.linkedin_handle)
        .bind(&profile.interests)
        .bind(&profile.content_types)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(profile)
    }
}

#[cfg(all(test, feature = "live-db-tests"))]
#[path = "postgres_test.rs"]
mod tests;
