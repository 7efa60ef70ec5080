#![allow(clippy::doc_markdown)] // Allow technical terms like SMTP, IANA in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Sitewatch Core
//!
//! Website status monitoring: probe a fixed roster of sites, classify each
//! into a closed status taxonomy, render a PDF report and email it.
//!
//! ## Overview
//!
//! Runs are triggered three ways and all go through the same pipeline:
//!
//! ```text
//!   startup ─┐
//!   daily   ─┼─► RunCoordinator ─► SiteProbeRunner ─► StatusClassifier (per site)
//!   HTTP    ─┘         │
//!                      ├─► ReportSink        (PDF file)
//!                      └─► NotificationSink  (SMTP)
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Layered configuration, validation and sanitized views
//! - [`probe`] - HTTP probe seam, status classification and roster probing
//! - [`report`] - Report sink trait, PDF rendering and file naming
//! - [`notify`] - Notification sink trait and SMTP delivery
//! - [`orchestration`] - Run coordinator, daily scheduler and service bootstrap
//! - [`web`] - On-demand HTML trigger surface
//! - [`models`] - Value types shared across the pipeline
//! - [`error`] - Error taxonomy
//! - [`logging`] - Structured logging setup and run logging helpers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sitewatch::orchestration::{BootstrapConfig, SitewatchBootstrap};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! sitewatch::logging::init_structured_logging();
//! let mut handle = SitewatchBootstrap::bootstrap(BootstrapConfig::default()).await?;
//! tokio::signal::ctrl_c().await?;
//! handle.stop().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod models;
pub mod notify;
pub mod orchestration;
pub mod probe;
pub mod report;
pub mod web;

pub use config::{ConfigManager, SitewatchConfig};
pub use error::{Result, SitewatchError};
pub use models::{
    DownReason, ReportDataset, ReportRow, RunOutcome, RunRecord, RunStage, Site, StatusOutcome,
    TriggerSource,
};
pub use notify::NotificationSink;
pub use orchestration::{RunCoordinator, Scheduler};
pub use probe::{SiteProbeRunner, StatusClassifier};
pub use report::ReportSink;
