//! # Daily Scheduler
//!
//! Fires the [`RunCoordinator`] once at startup and then once per calendar day
//! at a fixed wall-clock time in a fixed timezone, independent of the host's
//! local timezone.
//!
//! ## Lifecycle
//!
//! - [`Scheduler::initialize`] parses the cron expression and timezone. Any
//!   problem is a [`ScheduleConfigError`] and should abort process start.
//! - [`Scheduler::start`] spawns the single timer task. Call it only once the
//!   rest of the process is ready so the startup run cannot race anything.
//!   Each run gets its own task; the timer goes straight back to waiting for
//!   the next fire, so a run that hangs never holds up later days.
//! - [`Scheduler::stop`] interrupts the wait between runs and awaits the timer
//!   task, which drains every run still in flight. A started run always
//!   completes.
//!
//! There is no catch-up: fires missed while the process was down are not
//! replayed.
//!
//! ## Time
//!
//! Wall-clock time comes from an injected [`Clock`]; waiting uses
//! `tokio::time::sleep`. Tests pair a paused tokio runtime with a clock derived
//! from tokio's instant to step through days deterministically.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use parking_lot::Mutex;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{error, info, warn};

use super::coordinator::RunCoordinator;
use crate::config::SitewatchConfig;
use crate::error::ScheduleConfigError;
use crate::models::{RunRecord, TriggerSource};
use crate::report::ReportPaths;

/// Source of wall-clock time
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Parsed cron expression bound to a timezone
#[derive(Debug, Clone)]
pub struct ScheduleSpec {
    expression: String,
    schedule: cron::Schedule,
    timezone: Tz,
}

impl ScheduleSpec {
    pub fn parse(expression: &str, timezone: &str) -> Result<Self, ScheduleConfigError> {
        let timezone = Tz::from_str(timezone).map_err(|_| ScheduleConfigError::UnknownTimezone {
            timezone: timezone.to_string(),
        })?;

        let schedule =
            cron::Schedule::from_str(expression).map_err(|e| ScheduleConfigError::InvalidCron {
                expression: expression.to_string(),
                reason: e.to_string(),
            })?;

        if schedule.upcoming(timezone).next().is_none() {
            return Err(ScheduleConfigError::NeverFires {
                expression: expression.to_string(),
            });
        }

        Ok(Self {
            expression: expression.to_string(),
            schedule,
            timezone,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// First fire strictly after `instant`, evaluated in the schedule timezone
    pub fn next_fire_after(&self, instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule
            .after(&instant.with_timezone(&self.timezone))
            .next()
            .map(|local| local.with_timezone(&Utc))
    }
}

/// Everything the timer task needs, cloned out of the scheduler on start
#[derive(Clone)]
struct TimerContext {
    spec: ScheduleSpec,
    run_on_startup: bool,
    coordinator: Arc<RunCoordinator>,
    paths: ReportPaths,
    clock: Arc<dyn Clock>,
    runs_fired: Arc<AtomicUsize>,
}

impl TimerContext {
    async fn fire(&self, trigger: TriggerSource) -> RunRecord {
        let output_path = self.paths.default_path(self.clock.now());
        info!(
            trigger = %trigger,
            output_path = %output_path.display(),
            "⏰ SCHEDULER: Launching run"
        );
        self.runs_fired.fetch_add(1, Ordering::SeqCst);
        self.coordinator.execute_run(trigger, output_path).await
    }

    /// Launch a run on its own task so a slow run never delays the next fire
    fn launch(&self, in_flight: &mut JoinSet<RunRecord>, trigger: TriggerSource) {
        let context = self.clone();
        in_flight.spawn(async move { context.fire(trigger).await });
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut in_flight = JoinSet::new();

        // Measured before the startup run so a run straddling a fire time
        // cannot push that fire to the next day
        let mut after = self.clock.now();

        if self.run_on_startup {
            self.launch(&mut in_flight, TriggerSource::Startup);
        }

        loop {
            let stopping = *shutdown.borrow();
            if stopping {
                break;
            }

            while let Some(finished) = in_flight.try_join_next() {
                if let Err(e) = finished {
                    error!(error = %e, "❌ SCHEDULER: Run task ended abnormally");
                }
            }

            let Some(next) = self.spec.next_fire_after(after) else {
                warn!(
                    cron = %self.spec.expression(),
                    "⚠️ SCHEDULER: Schedule has no further fire times, stopping"
                );
                break;
            };

            let now = self.clock.now();
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            info!(
                next_fire = %next.with_timezone(&self.spec.timezone()),
                wait_secs = wait.as_secs(),
                in_flight = in_flight.len(),
                "⏰ SCHEDULER: Waiting for next fire"
            );

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = shutdown.changed() => break,
            }

            // Never fire the same slot twice if the timer wakes a hair early
            after = next.max(self.clock.now());
            self.launch(&mut in_flight, TriggerSource::Scheduled);
        }

        if !in_flight.is_empty() {
            info!(
                in_flight = in_flight.len(),
                "🛑 SCHEDULER: Waiting for in-flight runs"
            );
        }
        while let Some(finished) = in_flight.join_next().await {
            if let Err(e) = finished {
                error!(error = %e, "❌ SCHEDULER: Run task ended abnormally");
            }
        }

        info!("🛑 SCHEDULER: Timer task exited");
    }
}

struct RunningTimer {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Owns the daily timer task
pub struct Scheduler {
    context: TimerContext,
    running: Mutex<Option<RunningTimer>>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("spec", &self.context.spec)
            .field("run_on_startup", &self.context.run_on_startup)
            .field("running", &self.is_running())
            .finish()
    }
}

impl Scheduler {
    /// Validate the schedule and wire the scheduler. Nothing runs until [`start`](Self::start).
    pub fn initialize(
        config: &SitewatchConfig,
        coordinator: Arc<RunCoordinator>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ScheduleConfigError> {
        let spec = ScheduleSpec::parse(&config.schedule.cron, &config.schedule.timezone)?;
        let paths = ReportPaths::from_config(&config.report, spec.timezone());

        info!(
            cron = %spec.expression(),
            timezone = %spec.timezone(),
            run_on_startup = config.schedule.run_on_startup,
            "✅ SCHEDULER: Initialized"
        );

        Ok(Self {
            context: TimerContext {
                spec,
                run_on_startup: config.schedule.run_on_startup,
                coordinator,
                paths,
                clock,
                runs_fired: Arc::new(AtomicUsize::new(0)),
            },
            running: Mutex::new(None),
        })
    }

    /// Spawn the timer task. A second call while running is a no-op.
    pub fn start(&self) {
        let mut running = self.running.lock();
        if running.is_some() {
            warn!("Scheduler already started");
            return;
        }

        let (shutdown, receiver) = watch::channel(false);
        let task = tokio::spawn(self.context.clone().run(receiver));
        *running = Some(RunningTimer { shutdown, task });

        info!("🚀 SCHEDULER: Started");
    }

    /// Stop the timer and wait for every in-flight run. Idempotent.
    pub async fn stop(&self) {
        let Some(timer) = self.running.lock().take() else {
            return;
        };

        let _ = timer.shutdown.send(true);
        if let Err(e) = timer.task.await {
            error!(error = %e, "❌ SCHEDULER: Timer task ended abnormally");
        }
        info!("🛑 SCHEDULER: Stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }

    /// Runs launched by this scheduler (startup plus scheduled)
    pub fn runs_fired(&self) -> usize {
        self.context.runs_fired.load(Ordering::SeqCst)
    }

    pub fn next_fire_after(&self, instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.context.spec.next_fire_after(instant)
    }

    pub fn spec(&self) -> &ScheduleSpec {
        &self.context.spec
    }

    pub fn report_paths(&self) -> &ReportPaths {
        &self.context.paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reference() -> ScheduleSpec {
        ScheduleSpec::parse("0 0 12 * * *", "Asia/Kolkata").unwrap()
    }

    #[test]
    fn test_noon_kolkata_is_0630_utc() {
        let before = Utc.with_ymd_and_hms(2026, 10, 19, 3, 30, 0).unwrap();
        assert_eq!(
            reference().next_fire_after(before),
            Some(Utc.with_ymd_and_hms(2026, 10, 19, 6, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_next_fire_is_strictly_after() {
        let at_fire = Utc.with_ymd_and_hms(2026, 10, 19, 6, 30, 0).unwrap();
        assert_eq!(
            reference().next_fire_after(at_fire),
            Some(Utc.with_ymd_and_hms(2026, 10, 20, 6, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_fire_time_ignores_host_timezone_late_evening() {
        // 23:00 UTC is already 04:30 the next day in Kolkata
        let late = Utc.with_ymd_and_hms(2026, 10, 19, 23, 0, 0).unwrap();
        assert_eq!(
            reference().next_fire_after(late),
            Some(Utc.with_ymd_and_hms(2026, 10, 20, 6, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_invalid_inputs_are_schedule_errors() {
        assert!(matches!(
            ScheduleSpec::parse("0 0 12 * * *", "Mars/Olympus"),
            Err(ScheduleConfigError::UnknownTimezone { .. })
        ));
        assert!(matches!(
            ScheduleSpec::parse("every day at noon", "UTC"),
            Err(ScheduleConfigError::InvalidCron { .. })
        ));
        assert!(matches!(
            ScheduleSpec::parse("0 0 12 * * * 2001", "UTC"),
            Err(ScheduleConfigError::NeverFires { .. })
        ));
    }
}
