//! # Structured Logging Module
//!
//! Environment-aware structured logging that writes human-readable output to
//! the console and JSON lines to a per-process file under `log/`.

use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::ConfigManager;
use crate::models::{ReportRow, RunRecord};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = ConfigManager::detect_environment();
        let log_level = get_log_level(&environment);

        let console_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_level(true)
            .with_ansi(true)
            .with_filter(build_filter(&log_level));

        let log_dir = PathBuf::from("log");
        let pid = process::id();
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let log_filename = format!("{environment}.{pid}.{timestamp}.log");

        // Console-only when the log directory cannot be created
        let file_layer = match fs::create_dir_all(&log_dir) {
            Ok(()) => {
                let file_appender = tracing_appender::rolling::never(&log_dir, &log_filename);
                let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
                // The writer must outlive every span in the process
                std::mem::forget(guard);
                Some(
                    fmt::layer()
                        .with_writer(file_writer)
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_level(true)
                        .with_ansi(false)
                        .json()
                        .with_filter(build_filter(&log_level)),
                )
            }
            Err(_) => None,
        };
        let file_enabled = file_layer.is_some();

        let subscriber = tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer);

        if subscriber.try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            pid = pid,
            environment = %environment,
            log_file = %log_dir.join(&log_filename).display(),
            file_enabled = file_enabled,
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

/// `RUST_LOG` wins when set
fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log one probe result
pub fn log_probe_result(row: &ReportRow) {
    tracing::info!(
        site = %row.site.name,
        url = %row.site.url,
        status = %row.rendered_status_text,
        up = row.outcome.is_up(),
        "🔍 PROBE_RESULT"
    );
}

/// Log a finalized run record
pub fn log_run_record(record: &RunRecord) {
    let outcome = record
        .outcome
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "in_flight".to_string());

    if record.is_success() {
        tracing::info!(
            run_id = %record.run_id,
            triggered_by = %record.triggered_by,
            output_path = %record.output_path.display(),
            sites_probed = record.sites_probed,
            sites_down = record.sites_down,
            duration_ms = record.duration_ms(),
            outcome = %outcome,
            "📋 RUN_COMPLETED"
        );
    } else {
        tracing::warn!(
            run_id = %record.run_id,
            triggered_by = %record.triggered_by,
            output_path = %record.output_path.display(),
            sites_probed = record.sites_probed,
            sites_down = record.sites_down,
            duration_ms = record.duration_ms(),
            partial = record.is_partial_failure(),
            outcome = %outcome,
            "⚠️ RUN_FAILED"
        );
    }
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "❌ ERROR"
    );
}
