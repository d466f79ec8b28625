//! Structural validation for export configs, audit metadata and payloads.
//!
//! Validators never mutate and never panic. Errors block an export; warnings
//! are surfaced to the log. The `assert_*` guard converts a report with
//! errors into a [`ValidationError`] carrying every message at once.

mod checks;
mod context;
mod issue;

pub use context::{DEFAULT_ROW_SAMPLE, ValidationContext};
pub use issue::{Severity, ValidationError, ValidationIssue, ValidationReport};

use std::time::Instant;

use tracing::debug;

use audex_model::{ExportConfig, ExportMetadata, ExportPayload};

pub fn validate_config(config: &ExportConfig, ctx: &ValidationContext) -> ValidationReport {
    let mut report = ValidationReport::new();
    report.extend(checks::config::check(config, ctx));
    report
}

pub fn validate_metadata(metadata: &ExportMetadata) -> ValidationReport {
    let mut report = ValidationReport::new();
    report.extend(checks::metadata::check(metadata));
    report
}

/// Validate config, metadata, columns, sampled rows and extra sheets.
pub fn validate_payload(payload: &ExportPayload, ctx: &ValidationContext) -> ValidationReport {
    let start = Instant::now();
    let report = checks::run_all(payload, ctx);
    debug!(
        module = %payload.config.module,
        errors = report.error_count(),
        warnings = report.warning_count(),
        duration_ms = start.elapsed().as_millis(),
        "payload validated"
    );
    report
}

/// Guard for adapter and pipeline entry: fails with every error message.
pub fn assert_valid_payload(
    payload: &ExportPayload,
    ctx: &ValidationContext,
) -> Result<ValidationReport, ValidationError> {
    validate_payload(payload, ctx).into_result()
}

pub fn assert_valid_config(
    config: &ExportConfig,
    ctx: &ValidationContext,
) -> Result<ValidationReport, ValidationError> {
    validate_config(config, ctx).into_result()
}
