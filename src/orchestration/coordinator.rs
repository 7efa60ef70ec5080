//! # Run Coordinator
//!
//! One end-to-end run as an explicit three-stage pipeline:
//!
//! ```text
//! Idle ──► Probing ──► Rendering ──► Notifying ──► Done(Success)
//!                          │              │
//!                          ▼              ▼
//!               Done(FailedAt Render)  Done(FailedAt Notify)
//! ```
//!
//! Probing cannot fail. A render failure skips notification because there is
//! no file to send; a notify failure leaves the rendered file on disk. Neither
//! is retried and neither escapes [`RunCoordinator::execute_run`].
//!
//! The coordinator holds no per-run state, so the startup, scheduled and
//! on-demand triggers may call it concurrently. Runs are distinguished only by
//! their output path.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error};

use crate::logging;
use crate::models::{RunOutcome, RunRecord, RunStage, RunState, Site, TriggerSource};
use crate::notify::NotificationSink;
use crate::probe::SiteProbeRunner;
use crate::report::ReportSink;

/// Sequences probe → render → notify for one output path
#[derive(Clone)]
pub struct RunCoordinator {
    runner: SiteProbeRunner,
    /// Read-only roster shared by every run
    roster: Arc<[Site]>,
    report_sink: Arc<dyn ReportSink>,
    notifier: Arc<dyn NotificationSink>,
    recipients: Arc<[String]>,
}

impl std::fmt::Debug for RunCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunCoordinator")
            .field("sites", &self.roster.len())
            .field("report_sink", &self.report_sink.name())
            .field("notifier", &self.notifier.name())
            .field("recipients", &self.recipients.len())
            .finish()
    }
}

impl RunCoordinator {
    pub fn new(
        runner: SiteProbeRunner,
        roster: Vec<Site>,
        report_sink: Arc<dyn ReportSink>,
        notifier: Arc<dyn NotificationSink>,
        recipients: Vec<String>,
    ) -> Self {
        Self {
            runner,
            roster: roster.into(),
            report_sink,
            notifier,
            recipients: recipients.into(),
        }
    }

    pub fn roster(&self) -> &[Site] {
        &self.roster
    }

    /// Run the full pipeline once. Never fails; the outcome is in the record.
    pub async fn execute_run(&self, triggered_by: TriggerSource, output_path: PathBuf) -> RunRecord {
        let mut record = RunRecord::start(triggered_by, output_path);
        let mut state = RunState::Idle;

        advance(&mut state, RunState::Probing, &record);
        let dataset = self.runner.run(&self.roster).await;
        record.sites_probed = dataset.len();
        record.sites_down = dataset.down_count();

        advance(&mut state, RunState::Rendering, &record);
        if let Err(e) = self
            .report_sink
            .render(&dataset, &record.output_path)
            .await
        {
            return self.fail(record, &mut state, RunStage::Render, e.to_string());
        }

        advance(&mut state, RunState::Notifying, &record);
        if let Err(e) = self
            .notifier
            .send(&record.output_path, &self.recipients)
            .await
        {
            return self.fail(record, &mut state, RunStage::Notify, e.to_string());
        }

        advance(&mut state, RunState::Done, &record);
        let record = record.finish(RunOutcome::Success);
        logging::log_run_record(&record);
        record
    }

    fn fail(
        &self,
        record: RunRecord,
        state: &mut RunState,
        stage: RunStage,
        cause: String,
    ) -> RunRecord {
        let sink = match stage {
            RunStage::Render => self.report_sink.name(),
            RunStage::Notify => self.notifier.name(),
            RunStage::Probe => "probe",
        };
        error!(
            run_id = %record.run_id,
            stage = %stage,
            sink = sink,
            error = %cause,
            "❌ RUN: Stage failed"
        );
        advance(state, RunState::Done, &record);

        let record = record.finish(RunOutcome::FailedAt { stage, cause });
        logging::log_run_record(&record);
        record
    }
}

fn advance(state: &mut RunState, next: RunState, record: &RunRecord) {
    debug_assert!(
        state.can_transition_to(next),
        "illegal run transition {state} -> {next}"
    );
    debug!(
        run_id = %record.run_id,
        triggered_by = %record.triggered_by,
        from = %state,
        to = %next,
        "Run state transition"
    );
    *state = next;
}
