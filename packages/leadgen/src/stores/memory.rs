//! In-memory profile store.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::error::{StoreError, StoreResult};
use crate::traits::{store::ProfileStore, usage::UsageRecorder};
use crate::types::profile::UserProfile;

/// Profiles kept in a `HashMap`, lost on drop.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<HashMap<String, UserProfile>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a profile, replacing any existing one with the same email.
    pub fn insert(&self, profile: UserProfile) {
        self.profiles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(profile.email.clone(), profile);
    }

    /// Current profile without creating or rolling it over.
    pub fn get(&self, email: &str) -> Option<UserProfile> {
        self.profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(email)
            .cloned()
    }

    fn update(&self, email: &str, f: impl FnOnce(&mut UserProfile)) -> StoreResult<()> {
        let mut profiles = self.profiles.write().unwrap_or_else(PoisonError::into_inner);
        let profile = profiles
            .get_mut(email)
            .ok_or_else(|| StoreError::ProfileNotFound {
                email: email.to_string(),
            })?;
        f(profile);
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn load_profile(&self, email: &str, today: NaiveDate) -> StoreResult<UserProfile> {
        let mut profiles = self.profiles.write().unwrap_or_else(PoisonError::into_inner);
        let profile = profiles
            .entry(email.to_string())
            .or_insert_with(|| UserProfile::new(email, today));
        profile.roll_over(today);
        Ok(profile.clone())
    }

    async fn increment_usage(&self, email: &str, leads: usize) -> StoreResult<()> {
        self.update(email, |p| p.apply_usage(leads))
    }

    async fn upgrade_to_pro(&self, email: &str) -> StoreResult<()> {
        self.update(email, UserProfile::upgrade)
    }
}

#[async_trait]
impl UsageRecorder for MemoryProfileStore {
    async fn record_usage(&self, user_id: &str, lead_count: usize) -> StoreResult<()> {
        self.increment_usage(user_id, lead_count).await
    }
}
