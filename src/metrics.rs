//! Prometheus counters for control channel events, replies and errors.

use crate::server::controlchan::ControlChanErrorKind;
use lazy_static::lazy_static;
use prometheus::{opts, register_int_counter_vec, IntCounterVec};

lazy_static! {
    static ref FTP_AUTH_FAILURES: IntCounterVec = register_int_counter_vec!(opts!("wharfftp_auth_failures_total", "Total number of authentication failures."), &[]).unwrap();
    static ref FTP_SESSIONS: IntCounterVec = register_int_counter_vec!(opts!("wharfftp_sessions_total", "Total number of control channel sessions accepted."), &[]).unwrap();
    static ref FTP_COMMANDS_TOTAL: IntCounterVec = register_int_counter_vec!(opts!("wharfftp_commands_total", "Total number of commands and internal events processed."), &["event"]).unwrap();
    static ref FTP_ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(opts!("wharfftp_errors_total", "Total number of control channel errors."), &["kind"]).unwrap();
}

/// Records a control channel event (command or internal message) by its debug label.
pub fn add_event_metric(label: &str) {
    let event = label.split_whitespace().next().unwrap_or(label).trim_end_matches('{');
    FTP_COMMANDS_TOTAL.with_label_values(&[event]).inc();
}

/// Records a control channel error by its kind.
pub fn add_error_metric(kind: &ControlChanErrorKind) {
    FTP_ERRORS_TOTAL.with_label_values(&[&format!("{:?}", kind)]).inc();
}

/// Records a new session being accepted.
pub fn add_session_metric() {
    FTP_SESSIONS.with_label_values(&[]).inc();
}

/// Records an authentication failure.
pub fn add_auth_failure_metric() {
    FTP_AUTH_FAILURES.with_label_values(&[]).inc();
}

/// Renders all registered metrics in Prometheus text exposition format, for the
/// manager control endpoint's `STATUS` command to embed.
pub fn gather() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buf = Vec::new();
    encoder.encode(&metric_families, &mut buf).unwrap_or_default();
    String::from_utf8(buf).unwrap_or_default()
}
