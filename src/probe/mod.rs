//! # Site Probing
//!
//! One bounded GET per site, classified into the closed status taxonomy, then
//! assembled into a report dataset in roster order.

pub mod classifier;
pub mod http;
pub mod runner;

pub use classifier::{
    classify_failure, classify_observation, classify_status, FailureRule, ProbeObservation,
    StatusClassifier, TransportFailure, FAILURE_RULES,
};
pub use http::{HttpProbe, ReqwestProbe};
pub use runner::SiteProbeRunner;
