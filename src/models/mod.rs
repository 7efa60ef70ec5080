//! # Data Models
//!
//! Plain value types shared by the probe, report, notify and orchestration
//! layers. Nothing here is persisted; every value lives for one run at most.

pub mod report;
pub mod run;
pub mod site;
pub mod status;

pub use report::{ReportDataset, ReportRow};
pub use run::{RunOutcome, RunRecord, RunStage, RunState, TriggerSource};
pub use site::Site;
pub use status::{DownReason, StatusOutcome};
