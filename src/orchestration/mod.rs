//! # Orchestration
//!
//! Run sequencing and timing.
//!
//! - [`RunCoordinator`]: one probe → render → notify pipeline per call
//! - [`Scheduler`]: startup run plus a daily timer in a fixed timezone
//! - [`bootstrap`]: process wiring and lifecycle for the whole service

pub mod bootstrap;
pub mod coordinator;
pub mod scheduler;

pub use bootstrap::{BootstrapConfig, SitewatchBootstrap, SitewatchSystemHandle, SystemStatus};
pub use coordinator::RunCoordinator;
pub use scheduler::{Clock, ScheduleSpec, Scheduler, SystemClock};
