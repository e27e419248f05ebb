//! Profile storage trait.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use crate::error::StoreResult;
use crate::types::profile::UserProfile;

/// Storage for per-user quota state.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Get the profile for `email`, creating a free-tier one on first sight.
    ///
    /// If the stored `last_search_date` is not `today`, the daily run
    /// counter is reset and the new date persisted before returning.
    async fn load_profile(&self, email: &str, today: NaiveDate) -> StoreResult<UserProfile>;

    /// Add one run and `leads` extracted leads to the profile.
    async fn increment_usage(&self, email: &str, leads: usize) -> StoreResult<()>;

    /// Move the profile to the Pro plan.
    async fn upgrade_to_pro(&self, email: &str) -> StoreResult<()>;

    /// [`load_profile`](Self::load_profile) using the current UTC date.
    async fn load_profile_today(&self, email: &str) -> StoreResult<UserProfile> {
        self.load_profile(email, Utc::now().date_naive()).await
    }
}
