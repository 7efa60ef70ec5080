//! # Run Records
//!
//! Lifecycle types for one probe → render → notify cycle. A [`RunRecord`] is
//! created when a run starts, finalized when it ends, and only ever logged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// What started a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerSource {
    /// Process start
    Startup,
    /// Daily calendar timer
    Scheduled,
    /// Inbound HTTP request
    OnDemand,
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Startup => write!(f, "startup"),
            Self::Scheduled => write!(f, "scheduled"),
            Self::OnDemand => write!(f, "on_demand"),
        }
    }
}

/// Pipeline stage, used to attribute failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    Probe,
    Render,
    Notify,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Probe => write!(f, "probe"),
            Self::Render => write!(f, "render"),
            Self::Notify => write!(f, "notify"),
        }
    }
}

/// Position of a run in its state machine.
///
/// `Idle → Probing → Rendering → Notifying → Done`, with any working state
/// allowed to jump straight to `Done` on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Probing,
    Rendering,
    Notifying,
    Done,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Stage being worked while in this state
    pub fn stage(&self) -> Option<RunStage> {
        match self {
            Self::Probing => Some(RunStage::Probe),
            Self::Rendering => Some(RunStage::Render),
            Self::Notifying => Some(RunStage::Notify),
            Self::Idle | Self::Done => None,
        }
    }

    pub fn can_transition_to(&self, next: RunState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Probing)
                | (Self::Probing, Self::Rendering)
                | (Self::Rendering, Self::Notifying)
                | (Self::Probing | Self::Rendering | Self::Notifying, Self::Done)
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Probing => write!(f, "probing"),
            Self::Rendering => write!(f, "rendering"),
            Self::Notifying => write!(f, "notifying"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Terminal result of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RunOutcome {
    Success,
    /// Stage that failed and its error text; later stages were skipped
    FailedAt { stage: RunStage, cause: String },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn failed_stage(&self) -> Option<RunStage> {
        match self {
            Self::Success => None,
            Self::FailedAt { stage, .. } => Some(*stage),
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::FailedAt { stage, cause } => write!(f, "failed at {stage}: {cause}"),
        }
    }
}

/// Observability record for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: Uuid,
    pub triggered_by: TriggerSource,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub output_path: PathBuf,
    /// Sites probed, zero until the probe stage completes
    pub sites_probed: usize,
    pub sites_down: usize,
    /// `None` while the run is in flight
    pub outcome: Option<RunOutcome>,
}

impl RunRecord {
    pub fn start(triggered_by: TriggerSource, output_path: PathBuf) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            triggered_by,
            started_at: Utc::now(),
            finished_at: None,
            output_path,
            sites_probed: 0,
            sites_down: 0,
            outcome: None,
        }
    }

    pub fn finish(mut self, outcome: RunOutcome) -> Self {
        self.finished_at = Some(Utc::now());
        self.outcome = Some(outcome);
        self
    }

    pub fn is_success(&self) -> bool {
        self.outcome.as_ref().is_some_and(RunOutcome::is_success)
    }

    /// Report written but not delivered
    pub fn is_partial_failure(&self) -> bool {
        self.outcome
            .as_ref()
            .and_then(RunOutcome::failed_stage)
            .is_some_and(|stage| stage == RunStage::Notify)
    }

    pub fn duration_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_milliseconds())
    }
}
