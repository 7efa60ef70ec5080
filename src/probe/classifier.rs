//! # Status Classification
//!
//! Maps the raw result of one HTTP GET to a [`StatusOutcome`].
//!
//! ## Overview
//!
//! A probe either receives a response or fails before one is usable. Received
//! responses are classified by status code. Failures are classified by an
//! ordered rule table: several failure signals can be present at once (a
//! timed-out request may still carry a 404 response, for example), so the
//! first rule that matches decides and the order of [`FAILURE_RULES`] is part
//! of the contract.
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐     ┌──────────────────┐
//! │ ProbeObservation │────▶│ StatusClassifier │────▶│  StatusOutcome   │
//! │ response|failure │     │ status / rules   │     │  Up | Down(..)   │
//! └──────────────────┘     └──────────────────┘     └──────────────────┘
//! ```
//!
//! Classification is total: anything no rule recognizes becomes
//! [`DownReason::UnknownError`]. It never returns an error, so one bad site can
//! never stop the rest of the roster from being probed.
//!
//! ## Usage
//!
//! ```rust
//! use sitewatch::probe::{classify_observation, ProbeObservation, TransportFailure};
//! use sitewatch::models::{DownReason, StatusOutcome};
//!
//! let outcome = classify_observation(&ProbeObservation::Response { status: 200 });
//! assert_eq!(outcome, StatusOutcome::Up);
//!
//! let failure = TransportFailure::new("operation timed out")
//!     .timed_out()
//!     .with_response_status(404);
//! let outcome = classify_observation(&ProbeObservation::Failure(failure));
//! assert_eq!(outcome, StatusOutcome::Down(DownReason::Timeout));
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::http::HttpProbe;
use crate::models::{DownReason, StatusOutcome};

/// Raw result of a single GET, before classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeObservation {
    /// A response arrived with this status code
    Response { status: u16 },
    /// The attempt failed before a usable response
    Failure(TransportFailure),
}

/// Signals extracted from a failed attempt. Signals are not mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportFailure {
    pub connection_refused: bool,
    pub timed_out: bool,
    pub dns_failed: bool,
    pub tls_failed: bool,
    /// Status of an HTTP response attached to the failure, if any
    pub response_status: Option<u16>,
    /// Full error text, matched for signals that only show up in messages
    pub message: String,
}

impl TransportFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn connection_refused(mut self) -> Self {
        self.connection_refused = true;
        self
    }

    pub fn timed_out(mut self) -> Self {
        self.timed_out = true;
        self
    }

    pub fn dns_failed(mut self) -> Self {
        self.dns_failed = true;
        self
    }

    pub fn tls_failed(mut self) -> Self {
        self.tls_failed = true;
        self
    }

    pub fn with_response_status(mut self, status: u16) -> Self {
        self.response_status = Some(status);
        self
    }

    fn message_contains_any(&self, needles: &[&str]) -> bool {
        let lowered = self.message.to_lowercase();
        needles.iter().any(|needle| lowered.contains(needle))
    }
}

/// One entry of the failure precedence table
pub struct FailureRule {
    /// Identifier used in debug logs
    pub name: &'static str,
    pub matches: fn(&TransportFailure) -> Option<DownReason>,
}

const REDIRECT_LOOP_MARKERS: &[&str] = &["too many redirects", "redirect loop", "maximum redirect"];
const NETWORK_UNREACHABLE_MARKERS: &[&str] = &["network is unreachable", "network unreachable", "enetunreach"];

/// Failure precedence, evaluated top to bottom; first match wins
pub const FAILURE_RULES: &[FailureRule] = &[
    FailureRule {
        name: "connection_refused",
        matches: |f| f.connection_refused.then_some(DownReason::ConnectionRefused),
    },
    FailureRule {
        name: "timed_out",
        matches: |f| f.timed_out.then_some(DownReason::Timeout),
    },
    FailureRule {
        name: "dns_lookup_failed",
        matches: |f| f.dns_failed.then_some(DownReason::DnsLookupFailed),
    },
    FailureRule {
        name: "tls_certificate",
        matches: |f| f.tls_failed.then_some(DownReason::TlsCertificateError),
    },
    FailureRule {
        name: "redirect_loop",
        matches: |f| {
            f.message_contains_any(REDIRECT_LOOP_MARKERS)
                .then_some(DownReason::RedirectLoop)
        },
    },
    FailureRule {
        name: "attached_401_403_404",
        matches: |f| match f.response_status {
            Some(401) => Some(DownReason::Unauthorized),
            Some(403) => Some(DownReason::Forbidden),
            Some(404) => Some(DownReason::NotFound),
            _ => None,
        },
    },
    FailureRule {
        name: "network_unreachable",
        matches: |f| {
            f.message_contains_any(NETWORK_UNREACHABLE_MARKERS)
                .then_some(DownReason::NetworkUnreachable)
        },
    },
    FailureRule {
        name: "attached_other_status",
        matches: |f| f.response_status.map(DownReason::OtherHttpError),
    },
];

/// Classify a received status code
pub fn classify_status(status: u16) -> StatusOutcome {
    match status {
        200 => StatusOutcome::Up,
        400..=499 => StatusOutcome::Down(DownReason::ClientError(status)),
        500..=u16::MAX => StatusOutcome::Down(DownReason::ServerError(status)),
        _ => StatusOutcome::Down(DownReason::UnknownStatusCode(status)),
    }
}

/// Classify a failed attempt through [`FAILURE_RULES`]
pub fn classify_failure(failure: &TransportFailure) -> DownReason {
    FAILURE_RULES
        .iter()
        .find_map(|rule| {
            (rule.matches)(failure).inspect(|reason| {
                debug!(rule = rule.name, reason = %reason, "Failure rule matched");
            })
        })
        .unwrap_or(DownReason::UnknownError)
}

/// Total, deterministic mapping from observation to outcome
pub fn classify_observation(observation: &ProbeObservation) -> StatusOutcome {
    match observation {
        ProbeObservation::Response { status } => classify_status(*status),
        ProbeObservation::Failure(failure) => StatusOutcome::Down(classify_failure(failure)),
    }
}

/// Performs one bounded GET through an [`HttpProbe`] and classifies the result
#[derive(Clone)]
pub struct StatusClassifier {
    probe: Arc<dyn HttpProbe>,
}

impl std::fmt::Debug for StatusClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusClassifier")
            .field("probe", &self.probe.name())
            .finish()
    }
}

impl StatusClassifier {
    pub fn new(probe: Arc<dyn HttpProbe>) -> Self {
        Self { probe }
    }

    /// Probe `url` once and classify. Never fails.
    pub async fn classify(&self, url: &str) -> StatusOutcome {
        let observation = self.probe.fetch(url).await;
        let outcome = classify_observation(&observation);
        debug!(url = url, observation = ?observation, outcome = %outcome, "Classified probe");
        outcome
    }
}
