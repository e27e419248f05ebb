//! Batch Lead Accumulation Library
//!
//! Calls a record source (usually an LLM) repeatedly for the same query and
//! merges the batches into one deduplicated lead list, with live progress,
//! cooperative cancellation, an early stop when results dry up, per-user
//! quota checks and usage bookkeeping.
//!
//! # Usage
//!
//! ```rust,ignore
//! use leadgen::{Accumulator, AccumulatorConfig, MemoryProfileStore, PlanLimits, ProfileStore, ToolKind};
//! use leadgen::testing::MockRecordSource;
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryProfileStore::new());
//! let source = MockRecordSource::new().with_batch_sizes(&[40, 0, 15]);
//! let accumulator = Accumulator::new(source, PlanLimits::default(), store.clone(), AccumulatorConfig::quick());
//!
//! let profile = store.load_profile_today("ada@example.com").await?;
//! let report = accumulator.run(&profile, ToolKind::GoogleMaps, "Dentists in Austin").await?;
//!
//! leadgen::export::export_csv(leadgen::export::DEFAULT_FILENAME, &report.leads)?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator seams (RecordSource, QuotaGate, UsageRecorder, ProfileStore)
//! - [`types`] - Leads, tool kinds, profiles and run state
//! - [`pipeline`] - The accumulator and its uniqueness filter
//! - [`sources`] - Record source implementations (Gemini)
//! - [`stores`] - Profile storage implementations (memory, SQLite)
//! - [`export`] - CSV export
//! - [`view`] - Filtering and paging for table display
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod export;
pub mod pipeline;
pub mod sources;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use error::{ExportError, Result, RunError, SourceError, StoreError};
pub use traits::{
    quota::QuotaGate, source::RecordSource, store::ProfileStore, usage::UsageRecorder,
};
pub use types::{
    config::AccumulatorConfig,
    lead::{normalize_key, Lead, LeadField},
    profile::{LimitKind, PlanLimits, PlanType, QuotaDecision, TierLimits, UserProfile},
    run::{BatchStep, RunOutcome, RunPhase, RunReport, RunState, StopReason},
    tool::{ToolConfig, ToolKind, UnknownToolKind},
};

pub use pipeline::{Accumulator, CancelHandle, SeenSet};

pub use sources::{GeminiLeadSource, GeminiSourceConfig};

pub use stores::MemoryProfileStore;

#[cfg(feature = "sqlite")]
pub use stores::SqliteProfileStore;

pub use view::{filter_leads, paginate, Page, ITEMS_PER_PAGE};
