//! # Error Types
//!
//! Crate-level error taxonomy. Each pipeline stage owns its own error type so
//! the coordinator can attribute a failure to the stage that produced it;
//! [`SitewatchError`] wraps them for the bootstrap and binaries.
//!
//! Probe failures deliberately have no error type: they are absorbed into a
//! [`StatusOutcome`](crate::models::StatusOutcome) by the classifier.

use std::path::PathBuf;
use thiserror::Error;

pub use crate::config::ConfigurationError;

/// Invalid schedule definition. Fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleConfigError {
    #[error("Invalid cron expression '{expression}': {reason}")]
    InvalidCron { expression: String, reason: String },

    #[error("Unknown timezone '{timezone}'")]
    UnknownTimezone { timezone: String },

    #[error("Cron expression '{expression}' never fires")]
    NeverFires { expression: String },
}

/// Failure while writing the report document.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Report destination '{path}' is not writable: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode report document: {message}")]
    Encoding { message: String },

    #[error("Render task aborted: {message}")]
    TaskAborted { message: String },
}

impl RenderError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn encoding<E: std::fmt::Display>(error: E) -> Self {
        Self::Encoding {
            message: error.to_string(),
        }
    }
}

/// Failure while delivering the rendered report.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Invalid mailbox '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("No recipients configured")]
    NoRecipients,

    #[error("Failed to read attachment '{path}': {source}")]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build message: {message}")]
    MessageBuild { message: String },

    #[error("Mail transport error: {message}")]
    Transport { message: String },
}

/// Top-level error for bootstrap, server and binaries
#[derive(Debug, Error)]
pub enum SitewatchError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Schedule(#[from] ScheduleConfigError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error("Probe client error: {message}")]
    ProbeClient { message: String },

    #[error("Web server error: {message}")]
    Web { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SitewatchError>;
