//! Record source trait.

use async_trait::async_trait;

use crate::error::SourceResult;
use crate::types::{lead::Lead, tool::ToolKind};

/// Produces one batch of candidate leads per call.
///
/// Implementations wrap a specific generator (an LLM, a scraper, a fixture
/// file). The accumulator calls `fetch_batch` sequentially with increasing
/// `batch_index` and treats every returned lead as a candidate; duplicates
/// across or within batches are expected and filtered downstream.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch batch `batch_index` (zero-based) for a query.
    async fn fetch_batch(
        &self,
        tool: ToolKind,
        query: &str,
        batch_index: usize,
    ) -> SourceResult<Vec<Lead>>;
}

#[async_trait]
impl<T: RecordSource + ?Sized> RecordSource for std::sync::Arc<T> {
    async fn fetch_batch(
        &self,
        tool: ToolKind,
        query: &str,
        batch_index: usize,
    ) -> SourceResult<Vec<Lead>> {
        (**self).fetch_batch(tool, query, batch_index).await
    }
}
