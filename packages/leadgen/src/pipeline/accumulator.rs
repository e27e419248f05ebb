//! The batch accumulator: repeated record-source calls merged into one
//! deduplicated lead list.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{Result, RunError};
use crate::pipeline::dedup::SeenSet;
use crate::traits::{quota::QuotaGate, source::RecordSource, usage::UsageRecorder};
use crate::types::{
    config::AccumulatorConfig,
    lead::Lead,
    profile::{QuotaDecision, UserProfile},
    run::{batch_status, BatchStep, RunOutcome, RunPhase, RunReport, RunState, StopReason},
    tool::ToolKind,
};

/// Shared cancellation switch for an accumulator.
///
/// Cloning yields another handle to the same switch. Each run installs a
/// fresh token, so a cancel issued between runs does not affect the next one.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    token: Arc<Mutex<CancellationToken>>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the current run.
    pub fn cancel(&self) {
        self.current().cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.current().is_cancelled()
    }

    fn current(&self) -> CancellationToken {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn reset(&self) -> CancellationToken {
        let fresh = CancellationToken::new();
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = fresh.clone();
        fresh
    }
}

/// Clears the in-flight flag when a run ends, however it ends.
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs a query against a record source batch after batch, keeping only
/// leads it has not seen before.
///
/// # Example
///
/// ```rust,ignore
/// let accumulator = Accumulator::new(source, PlanLimits::default(), store, AccumulatorConfig::bulk());
///
/// let mut progress = accumulator.subscribe();
/// let report = accumulator.run(&profile, ToolKind::GoogleMaps, "Dentists in Austin").await?;
/// println!("{}", report.message());
/// ```
pub struct Accumulator<S: RecordSource, Q: QuotaGate, U: UsageRecorder> {
    source: S,
    gate: Q,
    recorder: U,
    config: AccumulatorConfig,
    cancel: CancelHandle,
    running: AtomicBool,
    state: watch::Sender<RunState>,
}

impl<S: RecordSource, Q: QuotaGate, U: UsageRecorder> Accumulator<S, Q, U> {
    pub fn new(source: S, gate: Q, recorder: U, config: AccumulatorConfig) -> Self {
        let (state, _) = watch::channel(RunState::idle());
        Self {
            source,
            gate,
            recorder,
            config,
            cancel: CancelHandle::new(),
            running: AtomicBool::new(false),
            state,
        }
    }

    /// Use an externally created cancel handle.
    pub fn with_cancel_handle(mut self, handle: CancelHandle) -> Self {
        self.cancel = handle;
        self
    }

    pub fn config(&self) -> &AccumulatorConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn recorder(&self) -> &U {
        &self.recorder
    }

    /// A handle that cancels whatever run is in flight.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Request cooperative cancellation of the current run.
    ///
    /// An in-flight record-source call is not interrupted; its leads are
    /// merged and no further batch starts.
    pub fn cancel(&self) {
        self.cancel.cancel();
        self.state.send_modify(|s| {
            if s.is_running() {
                mark_cancel_requested(s);
            }
        });
    }

    /// Live progress. The receiver always holds the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    /// Latest published snapshot.
    pub fn state(&self) -> RunState {
        self.state.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Run one accumulation for `profile`.
    ///
    /// Returns `Err` only when the run could not start: empty query, another
    /// run in flight, or a quota refusal. Every run that started yields a
    /// [`RunReport`] carrying whatever leads were gathered.
    pub async fn run(&self, profile: &UserProfile, tool: ToolKind, query: &str) -> Result<RunReport> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RunError::EmptyQuery);
        }

        let _guard = RunGuard::acquire(&self.running).ok_or(RunError::RunInProgress)?;

        if let QuotaDecision::Denied(limit) = self.gate.check(profile) {
            info!(user = %profile.email, limit = ?limit, "Run refused by quota gate");
            return Err(RunError::QuotaExceeded { limit });
        }

        let token = self.cancel.reset();
        let cap = self.config.max_batches;

        info!(
            user = %profile.email,
            tool = %tool,
            query = %query,
            max_batches = ?cap,
            "Starting lead accumulation"
        );
        self.state.send_replace(RunState::started(tool, query, cap));

        let mut seen = SeenSet::new();
        let mut leads: Vec<Lead> = Vec::new();
        let mut batches_run = 0;
        let mut index = 0;

        let outcome = loop {
            if token.is_cancelled() {
                self.step(BatchStep::CancelRequested, mark_cancel_requested);
                break RunOutcome::Cancelled;
            }
            if !self.config.allows_batch(index) {
                self.step(BatchStep::CapReached, |_| {});
                break RunOutcome::Completed(StopReason::CapReached);
            }

            self.step(BatchStep::BatchStarted, |s| {
                s.batch_index = index;
                s.status = batch_status(index, cap);
            });

            // The in-flight call runs to completion; a cancel seen meanwhile
            // is published right away so every observer agrees on it.
            let fetch = self.source.fetch_batch(tool, query, index);
            tokio::pin!(fetch);
            let mut flagged = false;
            let fetched = loop {
                tokio::select! {
                    result = &mut fetch => break result,
                    _ = token.cancelled(), if !flagged => {
                        flagged = true;
                        debug!(batch = index, "Cancel requested while batch in flight");
                        self.state.send_modify(mark_cancel_requested);
                    }
                }
            };

            let batch = match fetched {
                Ok(batch) => batch,
                Err(cause) => {
                    warn!(batch = index, error = %cause, "Record source failed");
                    break RunOutcome::Failed(RunError::ExtractionFailed {
                        batch: index,
                        cause,
                    });
                }
            };
            batches_run += 1;

            let received = batch.len();
            let accepted = seen.filter_batch(batch);
            let added = accepted.len();
            leads.extend(accepted);

            debug!(
                batch = index,
                received,
                added,
                total = leads.len(),
                "Merged batch"
            );
            self.step(BatchStep::BatchMerged, |s| {
                s.found = leads.len();
                s.leads = leads.clone();
            });

            // A cancel seen here wins over every other stop condition.
            if token.is_cancelled() {
                self.step(BatchStep::CancelRequested, mark_cancel_requested);
                break RunOutcome::Cancelled;
            }
            if added == 0 && index >= self.config.early_stop_after {
                info!(batch = index, "No new leads; stopping early");
                self.step(BatchStep::StopConditionMet, |_| {});
                break RunOutcome::Completed(StopReason::DiminishingReturns);
            }
            if !self.config.allows_batch(index + 1) {
                self.step(BatchStep::CapReached, |_| {});
                break RunOutcome::Completed(StopReason::CapReached);
            }

            let delay = self.config.batch_delay();
            if !delay.is_zero() {
                self.step(BatchStep::Delaying, |_| {});
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = token.cancelled() => {
                        debug!(batch = index, "Delay interrupted by cancellation");
                    }
                }
            }

            index += 1;
        };

        let outcome = match outcome {
            RunOutcome::Completed(_) if leads.is_empty() => RunOutcome::NoResultsFound,
            other => other,
        };

        let usage_warning = if leads.is_empty() {
            None
        } else {
            match self.recorder.record_usage(&profile.email, leads.len()).await {
                Ok(()) => None,
                Err(e) => {
                    warn!(user = %profile.email, error = %e, "Failed to record usage");
                    Some(RunError::UsageRecordingFailed(e))
                }
            }
        };

        let report = RunReport {
            tool,
            query: query.to_string(),
            leads,
            outcome,
            batches_run,
            usage_warning,
        };

        info!(
            tool = %tool,
            leads = report.leads.len(),
            batches = batches_run,
            outcome = ?report.outcome,
            "Lead accumulation finished"
        );

        let phase = match report.outcome {
            RunOutcome::Completed(_) | RunOutcome::NoResultsFound => RunPhase::Completed,
            RunOutcome::Cancelled => RunPhase::Cancelled,
            RunOutcome::Failed(_) => RunPhase::Failed,
        };
        let message = report.message();
        self.state.send_modify(|s| {
            s.phase = phase;
            s.status = message;
            s.found = report.leads.len();
            s.leads = report.leads.clone();
        });

        Ok(report)
    }

    fn step(&self, step: BatchStep, update: impl FnOnce(&mut RunState)) {
        self.state.send_modify(|s| {
            s.phase = RunPhase::Running(step);
            update(s);
        });
    }
}

const STOPPING_STATUS: &str = "Stopping after the current batch...";

fn mark_cancel_requested(state: &mut RunState) {
    state.cancel_requested = true;
    state.status = STOPPING_STATUS.to_string();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockRecordSource, MockUsageRecorder, StaticQuotaGate};
    use chrono::NaiveDate;

    fn profile() -> UserProfile {
        UserProfile::new("ada@example.com", NaiveDate::from_ymd_opt(2026, 10, 14).unwrap())
    }

    fn fast(max: usize) -> AccumulatorConfig {
        AccumulatorConfig::new()
            .with_max_batches(max)
            .with_batch_delay(std::time::Duration::ZERO)
    }

    #[tokio::test]
    async fn empty_query_is_rejected() {
        let acc = Accumulator::new(
            MockRecordSource::new(),
            StaticQuotaGate::allow(),
            MockUsageRecorder::new(),
            fast(1),
        );

        let err = acc.run(&profile(), ToolKind::Yelp, "   ").await.unwrap_err();
        assert!(matches!(err, RunError::EmptyQuery));
        assert_eq!(acc.source().call_count(), 0);
    }

    #[tokio::test]
    async fn cancel_before_run_does_not_leak_into_it() {
        let acc = Accumulator::new(
            MockRecordSource::new().with_unique_batches(5, 2),
            StaticQuotaGate::allow(),
            MockUsageRecorder::new(),
            fast(2),
        );
        acc.cancel();

        let report = acc.run(&profile(), ToolKind::Yelp, "pizza").await.unwrap();
        assert!(matches!(report.outcome, RunOutcome::Completed(StopReason::CapReached)));
        assert_eq!(report.leads.len(), 10);
    }

    #[tokio::test]
    async fn terminal_state_is_published() {
        let acc = Accumulator::new(
            MockRecordSource::new().with_unique_batches(3, 1),
            StaticQuotaGate::allow(),
            MockUsageRecorder::new(),
            fast(1),
        );
        let rx = acc.subscribe();

        acc.run(&profile(), ToolKind::Apollo, "cto").await.unwrap();

        let state = rx.borrow().clone();
        assert_eq!(state.phase, RunPhase::Completed);
        assert_eq!(state.found, 3);
        assert_eq!(state.leads.len(), 3);
        assert!(!acc.is_running());
    }

    #[tokio::test]
    async fn zero_cap_finds_nothing_without_calling_source() {
        let acc = Accumulator::new(
            MockRecordSource::new(),
            StaticQuotaGate::allow(),
            MockUsageRecorder::new(),
            fast(0),
        );

        let report = acc.run(&profile(), ToolKind::Apollo, "cto").await.unwrap();
        assert!(matches!(report.outcome, RunOutcome::NoResultsFound));
        assert_eq!(acc.source().call_count(), 0);
        assert_eq!(acc.recorder().call_count(), 0);
    }
}
