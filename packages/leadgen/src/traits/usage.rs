//! Usage recorder trait.

use async_trait::async_trait;

use crate::error::StoreResult;

/// Persists per-user usage after a run produced leads.
#[async_trait]
pub trait UsageRecorder: Send + Sync {
    /// Count one run and `lead_count` leads against `user_id`.
    async fn record_usage(&self, user_id: &str, lead_count: usize) -> StoreResult<()>;
}

#[async_trait]
impl<T: UsageRecorder + ?Sized> UsageRecorder for std::sync::Arc<T> {
    async fn record_usage(&self, user_id: &str, lead_count: usize) -> StoreResult<()> {
        (**self).record_usage(user_id, lead_count).await
    }
}
