//! Run state published while a run is in flight, and the report it ends with.

use serde::Serialize;

use crate::error::RunError;
use crate::types::{lead::Lead, tool::ToolKind};

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// No run has started yet
    Idle,
    /// A run is in flight
    Running(BatchStep),
    /// The loop ended without error
    Completed,
    /// Cancellation was observed
    Cancelled,
    /// A batch failed
    Failed,
}

impl RunPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunPhase::Completed | RunPhase::Cancelled | RunPhase::Failed
        )
    }
}

/// Step within a running batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStep {
    /// About to call the record source
    BatchStarted,
    /// The batch has been merged into the result list
    BatchMerged,
    /// Waiting before the next batch
    Delaying,
    /// The early-stop heuristic fired
    StopConditionMet,
    /// The last allowed batch has run
    CapReached,
    /// Cancellation was observed before the next batch
    CancelRequested,
}

/// Snapshot of a run, republished after every step.
#[derive(Debug, Clone, Serialize)]
pub struct RunState {
    pub tool: Option<ToolKind>,
    pub query: String,
    pub phase: RunPhase,
    /// Zero-based index of the batch being processed (or last processed)
    pub batch_index: usize,
    /// Batch cap, or `None` when open-ended
    pub batch_cap: Option<usize>,
    /// Leads accepted so far; never decreases within a run
    pub found: usize,
    pub status: String,
    pub cancel_requested: bool,
    /// Accumulated leads in first-seen order
    pub leads: Vec<Lead>,
}

impl RunState {
    /// The state before any run has started.
    pub fn idle() -> Self {
        Self {
            tool: None,
            query: String::new(),
            phase: RunPhase::Idle,
            batch_index: 0,
            batch_cap: None,
            found: 0,
            status: "Idle".to_string(),
            cancel_requested: false,
            leads: Vec::new(),
        }
    }

    /// Initial state for a new run.
    pub(crate) fn started(tool: ToolKind, query: &str, batch_cap: Option<usize>) -> Self {
        Self {
            tool: Some(tool),
            query: query.to_string(),
            phase: RunPhase::Running(BatchStep::BatchStarted),
            batch_cap,
            status: "Starting extraction...".to_string(),
            ..Self::idle()
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, RunPhase::Running(_))
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::idle()
    }
}

/// Status line shown while batch `index` is processed.
pub(crate) fn batch_status(index: usize, cap: Option<usize>) -> String {
    match cap {
        Some(cap) => format!("Processing batch {} of {}...", index + 1, cap),
        None => format!("Processing batch {}...", index + 1),
    }
}

/// Why a successful loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every allowed batch ran
    CapReached,
    /// A late batch contributed nothing new
    DiminishingReturns,
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// The loop ended normally with at least one lead
    Completed(StopReason),
    /// The loop ended normally with zero leads
    NoResultsFound,
    /// Cancellation was observed; leads gathered so far are kept
    Cancelled,
    /// A batch failed; leads gathered before it are kept
    Failed(RunError),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Completed(_) | RunOutcome::NoResultsFound)
    }

    pub fn error(&self) -> Option<&RunError> {
        match self {
            RunOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Final result of a run.
#[derive(Debug)]
pub struct RunReport {
    pub tool: ToolKind,
    pub query: String,
    /// Deduplicated leads in first-seen order
    pub leads: Vec<Lead>,
    pub outcome: RunOutcome,
    /// Number of record-source calls made
    pub batches_run: usize,
    /// Set when usage bookkeeping failed after the run
    pub usage_warning: Option<RunError>,
}

impl RunReport {
    /// Single user-facing line describing the outcome.
    pub fn message(&self) -> String {
        let mut message = match &self.outcome {
            RunOutcome::Completed(_) => format!(
                "Found {} leads in {} batches.",
                self.leads.len(),
                self.batches_run
            ),
            RunOutcome::NoResultsFound => {
                "No results found. Try a broader query.".to_string()
            }
            RunOutcome::Cancelled => {
                format!("Extraction stopped. Kept {} leads.", self.leads.len())
            }
            RunOutcome::Failed(e) => {
                format!("{} Kept {} leads.", e.user_message(), self.leads.len())
            }
        };

        if let Some(warning) = &self.usage_warning {
            message.push(' ');
            message.push_str(&warning.user_message());
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;

    fn report(outcome: RunOutcome, leads: usize) -> RunReport {
        RunReport {
            tool: ToolKind::Apollo,
            query: "q".to_string(),
            leads: (0..leads).map(|i| Lead::new(i.to_string())).collect(),
            outcome,
            batches_run: 2,
            usage_warning: None,
        }
    }

    #[test]
    fn batch_status_handles_open_ended_runs() {
        assert_eq!(batch_status(0, Some(3)), "Processing batch 1 of 3...");
        assert_eq!(batch_status(4, None), "Processing batch 5...");
    }

    #[test]
    fn failed_message_mentions_kept_leads() {
        let failure = RunError::ExtractionFailed {
            batch: 1,
            cause: SourceError::Other("boom".into()),
        };
        let r = report(RunOutcome::Failed(failure), 20);

        assert!(r.message().contains("Kept 20 leads"));
        assert!(!r.outcome.is_success());
        assert!(r.outcome.error().is_some());
    }

    #[test]
    fn no_results_is_a_success() {
        let r = report(RunOutcome::NoResultsFound, 0);
        assert!(r.outcome.is_success());
        assert!(r.message().starts_with("No results found"));
    }

    #[test]
    fn idle_state_is_not_running() {
        assert!(!RunState::idle().is_running());
        assert!(RunState::started(ToolKind::Yelp, "q", Some(2)).is_running());
    }
}
