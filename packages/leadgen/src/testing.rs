//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the accumulator
//! without making real model calls or touching a database.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{SourceError, SourceResult, StoreError, StoreResult};
use crate::traits::{quota::QuotaGate, source::RecordSource, usage::UsageRecorder};
use crate::types::{
    lead::Lead,
    profile::{LimitKind, QuotaDecision, UserProfile},
    tool::ToolKind,
};

type FetchHook = Arc<dyn Fn(usize) + Send + Sync>;

/// A scripted record source.
///
/// Batch `i` returns the `i`-th scripted batch, or an empty batch once the
/// script runs out. Failures can be injected at specific indices.
#[derive(Default, Clone)]
pub struct MockRecordSource {
    /// Scripted batches by index
    batches: Arc<RwLock<Vec<Vec<Lead>>>>,

    /// Injected failures by index
    failures: Arc<RwLock<HashMap<usize, String>>>,

    /// Called with the batch index while the fetch is in flight
    on_fetch: Option<FetchHook>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockSourceCall>>>,
}

/// Record of a call made to the mock source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockSourceCall {
    pub tool: ToolKind,
    pub query: String,
    pub batch_index: usize,
}

impl MockRecordSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one scripted batch.
    pub fn with_batch(self, leads: Vec<Lead>) -> Self {
        self.batches.write().unwrap().push(leads);
        self
    }

    /// Append several scripted batches.
    pub fn with_batches(self, batches: impl IntoIterator<Item = Vec<Lead>>) -> Self {
        self.batches.write().unwrap().extend(batches);
        self
    }

    /// Append `count` batches of `per_batch` leads, all with distinct emails.
    pub fn with_unique_batches(self, per_batch: usize, count: usize) -> Self {
        let start = self.batches.read().unwrap().len();
        let batches = (start..start + count).map(|b| unique_leads(&format!("b{b}"), per_batch));
        self.with_batches(batches)
    }

    /// Append batches whose sizes are given, all with distinct emails.
    pub fn with_batch_sizes(self, sizes: &[usize]) -> Self {
        let start = self.batches.read().unwrap().len();
        let batches = sizes
            .iter()
            .enumerate()
            .map(|(i, &n)| unique_leads(&format!("b{}", start + i), n));
        self.with_batches(batches)
    }

    /// Fail the call for `batch_index`.
    pub fn with_failure_at(self, batch_index: usize, message: impl Into<String>) -> Self {
        self.failures
            .write()
            .unwrap()
            .insert(batch_index, message.into());
        self
    }

    /// Run `hook` inside every fetch, before it returns.
    pub fn with_fetch_hook(mut self, hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.on_fetch = Some(Arc::new(hook));
        self
    }

    /// Get all calls made to this source.
    pub fn calls(&self) -> Vec<MockSourceCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }
}

#[async_trait]
impl RecordSource for MockRecordSource {
    async fn fetch_batch(
        &self,
        tool: ToolKind,
        query: &str,
        batch_index: usize,
    ) -> SourceResult<Vec<Lead>> {
        self.calls.write().unwrap().push(MockSourceCall {
            tool,
            query: query.to_string(),
            batch_index,
        });

        if let Some(hook) = &self.on_fetch {
            hook(batch_index);
        }

        if let Some(message) = self.failures.read().unwrap().get(&batch_index) {
            return Err(SourceError::Other(message.clone()));
        }

        Ok(self
            .batches
            .read()
            .unwrap()
            .get(batch_index)
            .cloned()
            .unwrap_or_default())
    }
}

/// Build `n` leads with distinct ids and emails derived from `prefix`.
pub fn unique_leads(prefix: &str, n: usize) -> Vec<Lead> {
    (0..n)
        .map(|i| {
            Lead::new(format!("{prefix}-{i}"))
                .with_name(format!("Lead {prefix}-{i}"))
                .with_email(format!("{prefix}-{i}@example.com"))
        })
        .collect()
}

/// A usage recorder that remembers every call.
#[derive(Default, Clone)]
pub struct MockUsageRecorder {
    calls: Arc<RwLock<Vec<(String, usize)>>>,
    fail_with: Option<String>,
}

impl MockUsageRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with a backend error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::default()
        }
    }

    /// `(user_id, lead_count)` for every call, in order.
    pub fn calls(&self) -> Vec<(String, usize)> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl UsageRecorder for MockUsageRecorder {
    async fn record_usage(&self, user_id: &str, lead_count: usize) -> StoreResult<()> {
        self.calls
            .write()
            .unwrap()
            .push((user_id.to_string(), lead_count));

        match &self.fail_with {
            Some(message) => Err(StoreError::Backend(message.clone().into())),
            None => Ok(()),
        }
    }
}

/// A quota gate that always returns the same decision.
#[derive(Debug, Clone, Copy)]
pub struct StaticQuotaGate(pub QuotaDecision);

impl StaticQuotaGate {
    pub fn allow() -> Self {
        Self(QuotaDecision::Allowed)
    }

    pub fn deny(limit: LimitKind) -> Self {
        Self(QuotaDecision::Denied(limit))
    }
}

impl QuotaGate for StaticQuotaGate {
    fn check(&self, _profile: &UserProfile) -> QuotaDecision {
        self.0
    }
}
