//! Proptest strategies for probe observations.

use proptest::prelude::*;

use sitewatch::probe::{ProbeObservation, TransportFailure};

/// Error text with and without the markers the classifier looks for
pub fn failure_message_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z ]{0,40}",
        Just("error following redirect: too many redirects".to_string()),
        Just("connect error: Network is unreachable (os error 101)".to_string()),
        Just("operation timed out".to_string()),
        Just(String::new()),
    ]
}

pub fn transport_failure_strategy() -> impl Strategy<Value = TransportFailure> {
    (
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        proptest::option::of(any::<u16>()),
        failure_message_strategy(),
    )
        .prop_map(
            |(connection_refused, timed_out, dns_failed, tls_failed, response_status, message)| {
                TransportFailure {
                    connection_refused,
                    timed_out,
                    dns_failed,
                    tls_failed,
                    response_status,
                    message,
                }
            },
        )
}

pub fn observation_strategy() -> impl Strategy<Value = ProbeObservation> {
    prop_oneof![
        any::<u16>().prop_map(|status| ProbeObservation::Response { status }),
        transport_failure_strategy().prop_map(ProbeObservation::Failure),
    ]
}
