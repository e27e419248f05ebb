//! Configuration for the batch accumulator.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for one accumulator.
///
/// Different front-ends used different pacing for the same feature; each
/// preset below reproduces one of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccumulatorConfig {
    /// Maximum number of record-source calls per run.
    ///
    /// `None` keeps going until the early-stop heuristic fires or the run
    /// is cancelled. Default: 25.
    pub max_batches: Option<usize>,

    /// Pause between consecutive batches, in milliseconds.
    ///
    /// Paces requests against the record source. Default: 1000.
    pub batch_delay_ms: u64,

    /// Batches that must already have run before an empty batch ends the run.
    ///
    /// A batch that contributes no new leads at index `i >= early_stop_after`
    /// stops the loop. Default: 5.
    pub early_stop_after: usize,
}

impl Default for AccumulatorConfig {
    fn default() -> Self {
        Self {
            max_batches: Some(25),
            batch_delay_ms: 1000,
            early_stop_after: 5,
        }
    }
}

impl AccumulatorConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// One call, no pacing.
    pub fn single_shot() -> Self {
        Self {
            max_batches: Some(1),
            batch_delay_ms: 0,
            ..Self::default()
        }
    }

    /// Three quick batches.
    pub fn quick() -> Self {
        Self {
            max_batches: Some(3),
            batch_delay_ms: 1000,
            ..Self::default()
        }
    }

    /// Up to 25 batches, paced at 1.5 s.
    pub fn bulk() -> Self {
        Self {
            max_batches: Some(25),
            batch_delay_ms: 1500,
            early_stop_after: 5,
        }
    }

    /// No cap; runs until results dry up or the run is cancelled.
    pub fn open_ended() -> Self {
        Self {
            max_batches: None,
            batch_delay_ms: 500,
            early_stop_after: 5,
        }
    }

    /// Set the batch cap.
    pub fn with_max_batches(mut self, max: usize) -> Self {
        self.max_batches = Some(max);
        self
    }

    /// Remove the batch cap, keeping the current pacing and early-stop
    /// threshold. [`AccumulatorConfig::open_ended`] is the preset that also
    /// sets 500 ms pacing.
    pub fn without_batch_cap(mut self) -> Self {
        self.max_batches = None;
        self
    }

    /// Set the inter-batch delay.
    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the early-stop threshold.
    pub fn with_early_stop_after(mut self, batches: usize) -> Self {
        self.early_stop_after = batches;
        self
    }

    /// Inter-batch delay as a `Duration`.
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    /// Whether batch index `index` is within the cap.
    pub(crate) fn allows_batch(&self, index: usize) -> bool {
        self.max_batches.map_or(true, |max| index < max)
    }
}
