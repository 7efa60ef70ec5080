//! # Status Taxonomy
//!
//! The closed set of outcomes a single probe can produce. Every raw transport
//! or HTTP result maps to exactly one [`StatusOutcome`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of probing one site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum StatusOutcome {
    /// HTTP 200 received
    Up,
    /// Anything else, with the most specific reason available
    Down(DownReason),
}

/// Why a site was classified as down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "code", rename_all = "snake_case")]
pub enum DownReason {
    /// Response received with a 4xx status
    ClientError(u16),
    /// Response received with a 5xx status
    ServerError(u16),
    /// Response received with a status that is neither 200 nor 4xx/5xx
    UnknownStatusCode(u16),
    ConnectionRefused,
    Timeout,
    DnsLookupFailed,
    TlsCertificateError,
    RedirectLoop,
    /// Failure carried a 401 response
    Unauthorized,
    /// Failure carried a 403 response
    Forbidden,
    /// Failure carried a 404 response
    NotFound,
    NetworkUnreachable,
    /// Failure carried some other HTTP response
    OtherHttpError(u16),
    /// Nothing recognizable in the failure
    UnknownError,
}

impl StatusOutcome {
    pub fn is_up(&self) -> bool {
        matches!(self, Self::Up)
    }

    pub fn down_reason(&self) -> Option<DownReason> {
        match self {
            Self::Up => None,
            Self::Down(reason) => Some(*reason),
        }
    }

    /// One-line label used in the report, e.g. `Down (Timeout)`
    pub fn rendered_text(&self) -> String {
        self.to_string()
    }
}

impl DownReason {
    /// HTTP status carried by the reason, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ClientError(code)
            | Self::ServerError(code)
            | Self::UnknownStatusCode(code)
            | Self::OtherHttpError(code) => Some(*code),
            Self::Unauthorized => Some(401),
            Self::Forbidden => Some(403),
            Self::NotFound => Some(404),
            _ => None,
        }
    }
}

impl fmt::Display for StatusOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "Up"),
            Self::Down(reason) => write!(f, "Down ({reason})"),
        }
    }
}

impl fmt::Display for DownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientError(code) => write!(f, "Client Error {code}"),
            Self::ServerError(code) => write!(f, "Server Error {code}"),
            Self::UnknownStatusCode(code) => write!(f, "Unknown Status Code {code}"),
            Self::ConnectionRefused => write!(f, "Connection Refused"),
            Self::Timeout => write!(f, "Timeout"),
            Self::DnsLookupFailed => write!(f, "DNS Lookup Failed"),
            Self::TlsCertificateError => write!(f, "TLS Certificate Error"),
            Self::RedirectLoop => write!(f, "Redirect Loop"),
            Self::Unauthorized => write!(f, "Unauthorized"),
            Self::Forbidden => write!(f, "Forbidden"),
            Self::NotFound => write!(f, "Not Found"),
            Self::NetworkUnreachable => write!(f, "Network Unreachable"),
            Self::OtherHttpError(code) => write!(f, "HTTP Error {code}"),
            Self::UnknownError => write!(f, "Unknown Error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_text() {
        assert_eq!(StatusOutcome::Up.rendered_text(), "Up");
        assert_eq!(
            StatusOutcome::Down(DownReason::ConnectionRefused).rendered_text(),
            "Down (Connection Refused)"
        );
        assert_eq!(
            StatusOutcome::Down(DownReason::Timeout).rendered_text(),
            "Down (Timeout)"
        );
        assert_eq!(
            StatusOutcome::Down(DownReason::ServerError(503)).rendered_text(),
            "Down (Server Error 503)"
        );
    }

    #[test]
    fn test_status_code_extraction() {
        assert_eq!(DownReason::NotFound.status_code(), Some(404));
        assert_eq!(DownReason::OtherHttpError(429).status_code(), Some(429));
        assert_eq!(DownReason::DnsLookupFailed.status_code(), None);
        assert_eq!(StatusOutcome::Up.down_reason(), None);
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(StatusOutcome::Down(DownReason::ClientError(418))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "down", "reason": {"kind": "client_error", "code": 418}})
        );
        let up = serde_json::to_value(StatusOutcome::Up).unwrap();
        assert_eq!(up, serde_json::json!({"status": "up"}));
    }
}
