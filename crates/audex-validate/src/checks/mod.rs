//! Validation check modules.
//!
//! Each module performs one family of checks and returns its issues.

pub(crate) mod config;
pub(crate) mod metadata;
pub(crate) mod structure;

use audex_model::ExportPayload;

use crate::context::ValidationContext;
use crate::issue::{ValidationIssue, ValidationReport};

/// Run all validation checks on an assembled payload.
pub fn run_all(payload: &ExportPayload, ctx: &ValidationContext) -> ValidationReport {
    let mut report = ValidationReport::new();

    // 1. Config: format, module, field selection, date range
    report.extend(config::check(&payload.config, ctx));

    // 2. Metadata: required fields, timestamp
    report.extend(metadata::check(&payload.metadata));

    // 3. Primary columns and sampled rows
    report.extend(structure::check_columns("columns", &payload.columns));
    report.extend(structure::check_rows(
        "rows",
        &payload.rows,
        &payload.columns,
        ctx.row_sample,
    ));

    // 4. Record count agrees with the data
    let rows = payload.rows.len() as u64;
    if payload.metadata.record_count != rows {
        report.add(ValidationIssue::error(
            "metadata.recordCount",
            format!(
                "record count {} does not match {rows} data rows",
                payload.metadata.record_count
            ),
        ));
    }

    // 5. Caller-supplied sheets
    for (idx, sheet) in payload.additional_sheets.iter().enumerate() {
        let prefix = format!("additionalSheets[{idx}]");
        if sheet.name.trim().is_empty() {
            report.add(ValidationIssue::error(
                format!("{prefix}.name"),
                "sheet name is required",
            ));
        }
        report.extend(structure::check_columns(
            &format!("{prefix}.columns"),
            &sheet.columns,
        ));
        report.extend(structure::check_rows(
            &format!("{prefix}.rows"),
            &sheet.rows,
            &sheet.columns,
            ctx.row_sample,
        ));
    }

    report
}
