//! Shared test doubles for integration tests.
//!
//! Every double records what it was asked to do in an `Arc<Mutex<_>>` so a
//! test can hand one clone to the code under test and inspect another.

#![allow(dead_code)]

pub mod strategies;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sitewatch::error::{DeliveryError, RenderError};
use sitewatch::models::{ReportDataset, Site};
use sitewatch::notify::NotificationSink;
use sitewatch::orchestration::{Clock, RunCoordinator};
use sitewatch::probe::{HttpProbe, ProbeObservation, SiteProbeRunner, StatusClassifier};
use sitewatch::report::ReportSink;

/// Probe that replays scripted observations per URL.
///
/// Each URL has a queue; the last observation repeats once the queue is down to
/// one entry. Unscripted URLs observe a failure with no signals.
#[derive(Clone, Default)]
pub struct ScriptedProbe {
    script: Arc<Mutex<HashMap<String, VecDeque<ProbeObservation>>>>,
    calls: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, url: &str, observation: ProbeObservation) -> Self {
        self.script
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(observation);
        self
    }

    pub fn status(self, url: &str, status: u16) -> Self {
        self.respond(url, ProbeObservation::Response { status })
    }

    /// Every fetch takes `delay` (tokio time) before answering
    pub fn with_delay(self, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..self
        }
    }

    /// URLs fetched so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpProbe for ScriptedProbe {
    async fn fetch(&self, url: &str) -> ProbeObservation {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut script = self.script.lock().unwrap();
        match script.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => ProbeObservation::Failure(sitewatch::probe::TransportFailure::new("unscripted")),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Writes a small placeholder file and remembers every render
#[derive(Clone, Default)]
pub struct RecordingReportSink {
    pub renders: Arc<Mutex<Vec<(PathBuf, ReportDataset)>>>,
}

impl RecordingReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.renders
            .lock()
            .unwrap()
            .iter()
            .map(|(path, _)| path.clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.renders.lock().unwrap().len()
    }
}

#[async_trait]
impl ReportSink for RecordingReportSink {
    async fn render(&self, dataset: &ReportDataset, destination: &Path) -> Result<(), RenderError> {
        std::fs::write(destination, b"%PDF-recorded")
            .map_err(|e| RenderError::io(destination, e))?;
        self.renders
            .lock()
            .unwrap()
            .push((destination.to_path_buf(), dataset.clone()));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Always fails and counts attempts
#[derive(Clone, Default)]
pub struct FailingReportSink {
    pub attempts: Arc<Mutex<usize>>,
}

#[async_trait]
impl ReportSink for FailingReportSink {
    async fn render(&self, _dataset: &ReportDataset, destination: &Path) -> Result<(), RenderError> {
        *self.attempts.lock().unwrap() += 1;
        Err(RenderError::io(
            destination,
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only volume"),
        ))
    }

    fn name(&self) -> &'static str {
        "failing_report"
    }
}

/// Records `(attachment, recipients)` for every send
#[derive(Clone, Default)]
pub struct RecordingNotificationSink {
    pub sent: Arc<Mutex<Vec<(PathBuf, Vec<String>)>>>,
}

impl RecordingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotificationSink {
    async fn send(&self, attachment: &Path, recipients: &[String]) -> Result<(), DeliveryError> {
        self.sent
            .lock()
            .unwrap()
            .push((attachment.to_path_buf(), recipients.to_vec()));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Always fails with a transport error and counts attempts
#[derive(Clone, Default)]
pub struct FailingNotificationSink {
    pub attempts: Arc<Mutex<usize>>,
}

#[async_trait]
impl NotificationSink for FailingNotificationSink {
    async fn send(&self, _attachment: &Path, _recipients: &[String]) -> Result<(), DeliveryError> {
        *self.attempts.lock().unwrap() += 1;
        Err(DeliveryError::Transport {
            message: "535 authentication rejected".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "failing_notify"
    }
}

/// Records like [`RecordingNotificationSink`] after waiting `delay`
#[derive(Clone)]
pub struct SlowNotificationSink {
    pub delay: Duration,
    pub inner: RecordingNotificationSink,
}

#[async_trait]
impl NotificationSink for SlowNotificationSink {
    async fn send(&self, attachment: &Path, recipients: &[String]) -> Result<(), DeliveryError> {
        tokio::time::sleep(self.delay).await;
        self.inner.send(attachment, recipients).await
    }

    fn name(&self) -> &'static str {
        "slow"
    }
}

/// Never completes a send, like a relay that accepts and then goes silent
#[derive(Clone, Default)]
pub struct HangingNotificationSink {
    pub attempts: Arc<Mutex<usize>>,
}

#[async_trait]
impl NotificationSink for HangingNotificationSink {
    async fn send(&self, _attachment: &Path, _recipients: &[String]) -> Result<(), DeliveryError> {
        *self.attempts.lock().unwrap() += 1;
        std::future::pending().await
    }

    fn name(&self) -> &'static str {
        "hanging"
    }
}

/// Wall clock that advances with tokio's (pausable) clock
pub struct TokioClock {
    origin: DateTime<Utc>,
    started: tokio::time::Instant,
}

impl TokioClock {
    pub fn starting_at(origin: DateTime<Utc>) -> Self {
        Self {
            origin,
            started: tokio::time::Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = tokio::time::Instant::now() - self.started;
        self.origin + chrono::Duration::from_std(elapsed).unwrap_or_else(|_| chrono::Duration::zero())
    }
}

/// Fixed wall clock
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn scpl() -> Site {
    Site::new("SCPL", "https://scpl.biz/")
}

pub fn recipients() -> Vec<String> {
    vec!["ops@example.com".to_string()]
}

pub fn coordinator(
    probe: ScriptedProbe,
    roster: Vec<Site>,
    report_sink: Arc<dyn ReportSink>,
    notifier: Arc<dyn NotificationSink>,
) -> RunCoordinator {
    RunCoordinator::new(
        SiteProbeRunner::new(StatusClassifier::new(Arc::new(probe))),
        roster,
        report_sink,
        notifier,
        recipients(),
    )
}
