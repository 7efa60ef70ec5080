//! # HTTP Probe Transport
//!
//! [`HttpProbe`] is the seam between classification and the network. The
//! production implementation issues exactly one GET through `reqwest` with a
//! fixed timeout and reduces any error to a [`TransportFailure`].

use async_trait::async_trait;
use std::error::Error as StdError;
use std::io;
use tracing::debug;

use super::classifier::{ProbeObservation, TransportFailure};
use crate::config::ProbeConfig;
use crate::error::{Result, SitewatchError};

/// One bounded GET. Implementations must not retry and must not fail:
/// every error becomes [`ProbeObservation::Failure`].
#[async_trait]
pub trait HttpProbe: Send + Sync {
    async fn fetch(&self, url: &str) -> ProbeObservation;

    /// Name used in logs
    fn name(&self) -> &'static str;
}

/// `reqwest`-backed probe; the client is shared across runs
#[derive(Debug, Clone)]
pub struct ReqwestProbe {
    client: reqwest::Client,
}

impl ReqwestProbe {
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| SitewatchError::ProbeClient {
                message: e.to_string(),
            })?;

        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpProbe for ReqwestProbe {
    async fn fetch(&self, url: &str) -> ProbeObservation {
        match self.client.get(url).send().await {
            Ok(response) => ProbeObservation::Response {
                status: response.status().as_u16(),
            },
            Err(err) => {
                let failure = failure_from_reqwest(&err);
                debug!(url = url, error = %failure.message, "Probe transport failure");
                ProbeObservation::Failure(failure)
            }
        }
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

/// Reduce a reqwest error to classifier signals
pub fn failure_from_reqwest(err: &reqwest::Error) -> TransportFailure {
    let message = error_chain_message(err);
    let io_kind = find_io_error_kind(err);
    // The URL itself must not trigger markers (e.g. a host named "ssl...")
    let searchable = match err.url() {
        Some(url) => message.replace(url.as_str(), ""),
        None => message.clone(),
    };

    TransportFailure {
        connection_refused: io_kind == Some(io::ErrorKind::ConnectionRefused)
            || message_has(&searchable, CONNECTION_REFUSED_MARKERS),
        timed_out: err.is_timeout() || io_kind == Some(io::ErrorKind::TimedOut),
        dns_failed: message_has(&searchable, DNS_MARKERS),
        tls_failed: message_has(&searchable, TLS_MARKERS),
        response_status: err.status().map(|status| status.as_u16()),
        message,
    }
}

const CONNECTION_REFUSED_MARKERS: &[&str] = &["connection refused"];
const DNS_MARKERS: &[&str] = &[
    "dns error",
    "failed to lookup address",
    "name or service not known",
    "no such host",
    "nodename nor servname",
];
const TLS_MARKERS: &[&str] = &["certificate", "tls", "ssl", "handshake"];

fn message_has(message: &str, markers: &[&str]) -> bool {
    let lowered = message.to_lowercase();
    markers.iter().any(|marker| lowered.contains(marker))
}

/// `outer: inner: innermost`
pub fn error_chain_message(err: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if parts.last() != Some(&text) {
            parts.push(text);
        }
        source = cause.source();
    }
    parts.join(": ")
}

fn find_io_error_kind(err: &(dyn StdError + 'static)) -> Option<io::ErrorKind> {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            return Some(io_err.kind());
        }
        source = cause.source();
    }
    None
}
