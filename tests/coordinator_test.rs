//! End-to-end run behaviour with recording and failing sinks.

mod common;

use common::{
    coordinator, recipients, scpl, FailingNotificationSink, FailingReportSink,
    RecordingNotificationSink, RecordingReportSink, ScriptedProbe,
};
use std::sync::Arc;
use tempfile::TempDir;

use sitewatch::models::{RunOutcome, RunStage, StatusOutcome, TriggerSource};

#[tokio::test]
async fn test_successful_run_renders_then_notifies() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Website_Status_Report_2026-10-19.pdf");
    let report = RecordingReportSink::new();
    let notifier = RecordingNotificationSink::new();

    let record = coordinator(
        ScriptedProbe::new().status("https://scpl.biz/", 200),
        vec![scpl()],
        Arc::new(report.clone()),
        Arc::new(notifier.clone()),
    )
    .execute_run(TriggerSource::Startup, path.clone())
    .await;

    assert_eq!(record.outcome, Some(RunOutcome::Success));
    assert_eq!(record.triggered_by, TriggerSource::Startup);
    assert!(record.finished_at.is_some());

    let renders = report.renders.lock().unwrap();
    assert_eq!(renders.len(), 1);
    assert_eq!(renders[0].0, path);
    assert_eq!(renders[0].1.rows()[0].outcome, StatusOutcome::Up);

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.as_slice(), &[(path, recipients())]);
}

#[tokio::test]
async fn test_render_failure_never_notifies() {
    let dir = TempDir::new().unwrap();
    let report = FailingReportSink::default();
    let notifier = RecordingNotificationSink::new();

    let record = coordinator(
        ScriptedProbe::new().status("https://scpl.biz/", 200),
        vec![scpl()],
        Arc::new(report.clone()),
        Arc::new(notifier.clone()),
    )
    .execute_run(TriggerSource::Scheduled, dir.path().join("r.pdf"))
    .await;

    assert_eq!(*report.attempts.lock().unwrap(), 1);
    assert_eq!(notifier.count(), 0);
    match record.outcome {
        Some(RunOutcome::FailedAt { stage, ref cause }) => {
            assert_eq!(stage, RunStage::Render);
            assert!(cause.contains("read-only volume"));
        }
        other => panic!("expected render failure, got {other:?}"),
    }
    assert!(!record.is_partial_failure());
}

#[tokio::test]
async fn test_notify_failure_leaves_report_on_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("r.pdf");
    let notifier = FailingNotificationSink::default();

    let record = coordinator(
        ScriptedProbe::new().status("https://scpl.biz/", 500),
        vec![scpl()],
        Arc::new(RecordingReportSink::new()),
        Arc::new(notifier.clone()),
    )
    .execute_run(TriggerSource::OnDemand, path.clone())
    .await;

    assert!(path.exists());
    assert_eq!(*notifier.attempts.lock().unwrap(), 1, "delivery is not retried");
    assert_eq!(
        record.outcome.as_ref().and_then(RunOutcome::failed_stage),
        Some(RunStage::Notify)
    );
    assert!(record.is_partial_failure());
    assert_eq!(record.sites_down, 1);
}

#[tokio::test]
async fn test_missing_directory_surfaces_as_render_failure() {
    let dir = TempDir::new().unwrap();
    let notifier = RecordingNotificationSink::new();

    let record = coordinator(
        ScriptedProbe::new().status("https://scpl.biz/", 200),
        vec![scpl()],
        Arc::new(RecordingReportSink::new()),
        Arc::new(notifier.clone()),
    )
    .execute_run(
        TriggerSource::OnDemand,
        dir.path().join("missing").join("r.pdf"),
    )
    .await;

    assert_eq!(
        record.outcome.as_ref().and_then(RunOutcome::failed_stage),
        Some(RunStage::Render)
    );
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn test_failed_run_does_not_block_the_next_one() {
    let dir = TempDir::new().unwrap();
    let report = RecordingReportSink::new();
    let coordinator = coordinator(
        ScriptedProbe::new().status("https://scpl.biz/", 200),
        vec![scpl()],
        Arc::new(report.clone()),
        Arc::new(RecordingNotificationSink::new()),
    );

    let failed = coordinator
        .execute_run(TriggerSource::OnDemand, dir.path().join("nope").join("r.pdf"))
        .await;
    let ok = coordinator
        .execute_run(TriggerSource::Scheduled, dir.path().join("r.pdf"))
        .await;

    assert!(!failed.is_success());
    assert!(ok.is_success());
    assert_ne!(failed.run_id, ok.run_id);
}

#[tokio::test]
async fn test_overlapping_runs_produce_independent_files() {
    let dir = TempDir::new().unwrap();
    let report = RecordingReportSink::new();
    let notifier = RecordingNotificationSink::new();
    let coordinator = Arc::new(coordinator(
        ScriptedProbe::new().status("https://scpl.biz/", 200),
        vec![scpl()],
        Arc::new(report.clone()),
        Arc::new(notifier.clone()),
    ));

    let first = dir.path().join("a.pdf");
    let second = dir.path().join("b.pdf");
    let (a, b) = tokio::join!(
        coordinator.execute_run(TriggerSource::Startup, first.clone()),
        coordinator.execute_run(TriggerSource::OnDemand, second.clone()),
    );

    assert!(a.is_success() && b.is_success());
    assert!(first.exists() && second.exists());
    assert_eq!(report.count(), 2);
    assert_eq!(notifier.count(), 2);
}
