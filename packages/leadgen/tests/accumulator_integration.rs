//! Integration tests for the batch accumulation loop.
//!
//! These tests drive full runs through scripted sources and verify:
//! 1. Uniqueness across batches
//! 2. Batch caps and the early stop
//! 3. Cancellation boundaries
//! 4. Quota refusals and usage bookkeeping

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use leadgen::{
    testing::{unique_leads, MockRecordSource, MockUsageRecorder, StaticQuotaGate},
    Accumulator, AccumulatorConfig, BatchStep, CancelHandle, Lead, LimitKind, MemoryProfileStore,
    PlanLimits, ProfileStore, RunError, RunOutcome, RunPhase, RunState, StopReason, ToolKind,
    UserProfile,
};
use tokio::sync::watch;

const USER: &str = "ada@example.com";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
}

fn profile() -> UserProfile {
    UserProfile::new(USER, today())
}

/// Config with no pacing and the given cap.
fn fast(max_batches: usize) -> AccumulatorConfig {
    AccumulatorConfig::new()
        .with_max_batches(max_batches)
        .with_batch_delay(Duration::ZERO)
}

fn accumulator(
    source: MockRecordSource,
    config: AccumulatorConfig,
) -> Accumulator<MockRecordSource, StaticQuotaGate, MockUsageRecorder> {
    Accumulator::new(source, StaticQuotaGate::allow(), MockUsageRecorder::new(), config)
}

#[tokio::test]
async fn test_email_is_unique_across_batches() {
    let source = MockRecordSource::new()
        .with_batch(vec![
            Lead::new("a").with_name("Ada").with_email("ada@acme.com"),
            Lead::new("b").with_name("Bob").with_email("bob@acme.com"),
        ])
        .with_batch(vec![
            Lead::new("c").with_name("Ada again").with_email(" ADA@acme.com "),
            Lead::new("d").with_name("Dee").with_email("dee@acme.com"),
        ]);
    let acc = accumulator(source, fast(2));

    let report = acc.run(&profile(), ToolKind::Apollo, "cto").await.unwrap();

    let emails: Vec<_> = report.leads.iter().filter_map(|l| l.email.as_deref()).collect();
    assert_eq!(emails, vec!["ada@acme.com", "bob@acme.com", "dee@acme.com"]);
}

#[tokio::test]
async fn test_name_only_leads_are_kept_even_when_repeated() {
    let pizza = || Lead::new("p").with_name("Joe's Pizza").with_phone("555-0100");
    let source = MockRecordSource::new()
        .with_batch(vec![pizza(), pizza()])
        .with_batch(vec![pizza()]);
    let acc = accumulator(source, fast(2));

    let report = acc.run(&profile(), ToolKind::Yelp, "pizza").await.unwrap();

    assert_eq!(report.leads.len(), 3);
    let ids: HashSet<_> = report.leads.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids.len(), 3, "ids should be re-keyed to stay unique");
}

#[tokio::test]
async fn test_found_count_never_decreases() {
    let slot: Arc<Mutex<Option<watch::Receiver<RunState>>>> = Arc::new(Mutex::new(None));
    let observed = Arc::new(Mutex::new(Vec::new()));

    let hook_slot = slot.clone();
    let hook_observed = observed.clone();
    let source = MockRecordSource::new()
        .with_batch(unique_leads("x", 4))
        // Overlaps the first batch entirely.
        .with_batch(unique_leads("x", 4))
        .with_batch(unique_leads("y", 2))
        .with_batch(Vec::new())
        .with_fetch_hook(move |_| {
            if let Some(rx) = hook_slot.lock().unwrap().as_ref() {
                hook_observed.lock().unwrap().push(rx.borrow().found);
            }
        });

    let acc = accumulator(source, fast(5));
    *slot.lock().unwrap() = Some(acc.subscribe());

    let report = acc.run(&profile(), ToolKind::Apollo, "cto").await.unwrap();

    let observed = observed.lock().unwrap().clone();
    assert_eq!(observed, vec![0, 4, 4, 6, 6]);
    assert!(observed.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(report.leads.len(), 6);
}

#[tokio::test]
async fn test_source_calls_never_exceed_cap() {
    let source = MockRecordSource::new().with_unique_batches(10, 10);
    let acc = accumulator(source, fast(4));

    let report = acc.run(&profile(), ToolKind::Apollo, "cto").await.unwrap();

    assert_eq!(acc.source().call_count(), 4);
    assert_eq!(report.batches_run, 4);
    assert!(matches!(
        report.outcome,
        RunOutcome::Completed(StopReason::CapReached)
    ));
    let indices: Vec<_> = acc.source().calls().iter().map(|c| c.batch_index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn test_early_stop_after_empty_late_batch() {
    // Five productive batches, then nothing new.
    let source = MockRecordSource::new().with_unique_batches(10, 5);
    let config = AccumulatorConfig::bulk().with_batch_delay(Duration::ZERO);
    let acc = accumulator(source, config);

    let report = acc.run(&profile(), ToolKind::GoogleMaps, "dentists").await.unwrap();

    assert_eq!(acc.source().call_count(), 6);
    assert_eq!(report.leads.len(), 50);
    assert!(matches!(
        report.outcome,
        RunOutcome::Completed(StopReason::DiminishingReturns)
    ));
}

#[tokio::test]
async fn test_early_batches_may_be_empty_without_stopping() {
    let source = MockRecordSource::new().with_batch_sizes(&[40, 0, 15]);
    let acc = accumulator(source, fast(3));

    let report = acc.run(&profile(), ToolKind::GoogleMaps, "dentists").await.unwrap();

    assert_eq!(report.leads.len(), 55);
    assert_eq!(acc.source().call_count(), 3);
    assert_eq!(acc.recorder().calls(), vec![(USER.to_string(), 55)]);
    assert!(report.outcome.is_success());
}

#[tokio::test]
async fn test_cancel_during_batch_merges_it_and_stops() {
    let handle = CancelHandle::new();
    let cancel_on_third = handle.clone();

    let source = MockRecordSource::new()
        .with_unique_batches(5, 6)
        .with_fetch_hook(move |index| {
            if index == 2 {
                cancel_on_third.cancel();
            }
        });
    let acc = accumulator(source, fast(6)).with_cancel_handle(handle);

    let report = acc.run(&profile(), ToolKind::Apollo, "cto").await.unwrap();

    assert!(matches!(report.outcome, RunOutcome::Cancelled));
    assert_eq!(acc.source().call_count(), 3, "batch 3 must never start");
    assert_eq!(report.leads.len(), 15, "in-flight batch is still merged");
    assert_eq!(acc.recorder().calls(), vec![(USER.to_string(), 15)]);
    assert_eq!(acc.state().phase, RunPhase::Cancelled);
    assert!(acc.state().cancel_requested);
}

#[tokio::test]
async fn test_cancel_during_last_batch_reports_cancelled() {
    let handle = CancelHandle::new();
    let cancel_on_last = handle.clone();

    let source = MockRecordSource::new()
        .with_unique_batches(5, 3)
        .with_fetch_hook(move |index| {
            if index == 2 {
                cancel_on_last.cancel();
            }
        });
    let acc = accumulator(source, fast(3)).with_cancel_handle(handle);

    let report = acc.run(&profile(), ToolKind::Apollo, "cto").await.unwrap();

    assert!(matches!(report.outcome, RunOutcome::Cancelled));
    assert_eq!(acc.source().call_count(), 3);
    assert_eq!(report.leads.len(), 15);
    assert!(report.message().starts_with("Extraction stopped"));
    let state = acc.state();
    assert_eq!(state.phase, RunPhase::Cancelled);
    assert!(state.cancel_requested);
}

#[tokio::test]
async fn test_cancel_beats_early_stop_on_empty_late_batch() {
    let handle = CancelHandle::new();
    let cancel_on_empty = handle.clone();

    let source = MockRecordSource::new()
        .with_batch_sizes(&[4, 0])
        .with_fetch_hook(move |index| {
            if index == 1 {
                cancel_on_empty.cancel();
            }
        });
    let config = fast(5).with_early_stop_after(1);
    let acc = accumulator(source, config).with_cancel_handle(handle);

    let report = acc.run(&profile(), ToolKind::Apollo, "cto").await.unwrap();

    assert!(matches!(report.outcome, RunOutcome::Cancelled));
    assert_eq!(acc.source().call_count(), 2);
    assert_eq!(report.leads.len(), 4);
}

#[tokio::test]
async fn test_cancel_interrupts_delay() {
    let source = MockRecordSource::new().with_unique_batches(3, 5);
    let config = AccumulatorConfig::new()
        .with_max_batches(5)
        .with_batch_delay(Duration::from_secs(30));
    let acc = Arc::new(accumulator(source, config));
    let mut rx = acc.subscribe();

    let running = acc.clone();
    let task = tokio::spawn(async move { running.run(&profile(), ToolKind::Apollo, "cto").await });

    rx.wait_for(|s| s.phase == RunPhase::Running(BatchStep::Delaying))
        .await
        .unwrap();
    acc.cancel_handle().cancel();

    let report = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("delay should end on cancel")
        .unwrap()
        .unwrap();

    assert!(matches!(report.outcome, RunOutcome::Cancelled));
    assert_eq!(report.leads.len(), 3);
    assert_eq!(acc.source().call_count(), 1);
    assert!(acc.state().cancel_requested, "handle cancels are published too");
}

#[tokio::test]
async fn test_second_run_is_refused_while_one_is_in_flight() {
    let source = MockRecordSource::new().with_unique_batches(1, 3);
    let config = AccumulatorConfig::new()
        .with_max_batches(3)
        .with_batch_delay(Duration::from_secs(30));
    let acc = Arc::new(accumulator(source, config));
    let mut rx = acc.subscribe();

    let running = acc.clone();
    let task = tokio::spawn(async move { running.run(&profile(), ToolKind::Apollo, "cto").await });
    rx.wait_for(|s| s.phase == RunPhase::Running(BatchStep::Delaying))
        .await
        .unwrap();

    let err = acc.run(&profile(), ToolKind::Apollo, "cto").await.unwrap_err();
    assert!(matches!(err, RunError::RunInProgress));

    acc.cancel();
    task.await.unwrap().unwrap();
    assert!(!acc.is_running());
}

#[tokio::test]
async fn test_quota_refusal_makes_no_source_calls() {
    let source = MockRecordSource::new().with_unique_batches(5, 3);
    let acc = Accumulator::new(
        source,
        StaticQuotaGate::deny(LimitKind::DailyRuns),
        MockUsageRecorder::new(),
        fast(3),
    );

    let err = acc.run(&profile(), ToolKind::Apollo, "cto").await.unwrap_err();

    assert!(matches!(
        err,
        RunError::QuotaExceeded {
            limit: LimitKind::DailyRuns
        }
    ));
    assert_eq!(acc.source().call_count(), 0);
    assert_eq!(acc.recorder().call_count(), 0);
}

#[tokio::test]
async fn test_failure_keeps_partial_leads_and_records_usage() {
    let source = MockRecordSource::new()
        .with_batch_sizes(&[20, 20, 20])
        .with_failure_at(1, "upstream exploded");
    let acc = accumulator(source, fast(3));

    let report = acc.run(&profile(), ToolKind::Apollo, "cto").await.unwrap();

    match &report.outcome {
        RunOutcome::Failed(RunError::ExtractionFailed { batch, .. }) => assert_eq!(*batch, 1),
        other => panic!("expected extraction failure, got {other:?}"),
    }
    assert_eq!(report.leads.len(), 20);
    assert_eq!(report.batches_run, 1);
    assert_eq!(acc.source().call_count(), 2);
    assert_eq!(acc.recorder().calls(), vec![(USER.to_string(), 20)]);
    assert!(report.message().contains("Kept 20 leads"));
}

#[tokio::test]
async fn test_no_results_is_an_empty_success() {
    let acc = accumulator(MockRecordSource::new(), fast(3));

    let report = acc.run(&profile(), ToolKind::Apollo, "nothing").await.unwrap();

    assert!(matches!(report.outcome, RunOutcome::NoResultsFound));
    assert!(report.leads.is_empty());
    assert_eq!(acc.recorder().call_count(), 0);
}

#[tokio::test]
async fn test_usage_failure_is_a_warning() {
    let acc = Accumulator::new(
        MockRecordSource::new().with_batch_sizes(&[7]),
        StaticQuotaGate::allow(),
        MockUsageRecorder::failing("disk full"),
        fast(1),
    );

    let report = acc.run(&profile(), ToolKind::Apollo, "cto").await.unwrap();

    assert_eq!(report.leads.len(), 7);
    assert!(report.outcome.is_success());
    assert!(matches!(
        report.usage_warning,
        Some(RunError::UsageRecordingFailed(_))
    ));
}

#[tokio::test]
async fn test_free_plan_daily_limit_with_memory_store() {
    let store = Arc::new(MemoryProfileStore::new());
    let acc = Accumulator::new(
        MockRecordSource::new().with_batch_sizes(&[2]),
        PlanLimits::default(),
        store.clone(),
        fast(1),
    );

    for _ in 0..3 {
        let profile = store.load_profile(USER, today()).await.unwrap();
        acc.run(&profile, ToolKind::Apollo, "cto").await.unwrap();
    }

    let profile = store.load_profile(USER, today()).await.unwrap();
    assert_eq!(profile.searches_today, 3);
    // The same two leads each run; per-run dedup only.
    assert_eq!(profile.total_leads_extracted, 6);

    let err = acc.run(&profile, ToolKind::Apollo, "cto").await.unwrap_err();
    assert!(matches!(
        err,
        RunError::QuotaExceeded {
            limit: LimitKind::DailyRuns
        }
    ));

    let tomorrow = today().succ_opt().unwrap();
    let profile = store.load_profile(USER, tomorrow).await.unwrap();
    assert!(acc.run(&profile, ToolKind::Apollo, "cto").await.is_ok());
}
