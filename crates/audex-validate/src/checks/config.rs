//! Export configuration checks.

use std::collections::BTreeSet;

use audex_model::ExportConfig;

use crate::context::ValidationContext;
use crate::issue::ValidationIssue;

pub fn check(config: &ExportConfig, ctx: &ValidationContext) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if !ctx.format_supported(config.format) {
        issues.push(ValidationIssue::error(
            "config.format",
            format!("format '{}' is not supported", config.format),
        ));
    }

    let module = config.module.trim();
    if module.is_empty() {
        issues.push(ValidationIssue::error("config.module", "module is required"));
    } else if !ctx.module_known(module) {
        issues.push(ValidationIssue::error(
            "config.module",
            format!("module '{module}' is not recognized"),
        ));
    }

    if config.selected_fields.is_empty() {
        issues.push(ValidationIssue::error(
            "config.selectedFields",
            "at least one field must be selected",
        ));
    }
    let mut seen = BTreeSet::new();
    for (idx, key) in config.selected_fields.iter().enumerate() {
        if key.trim().is_empty() {
            issues.push(ValidationIssue::error(
                format!("config.selectedFields[{idx}]"),
                "field key must not be empty",
            ));
        } else if !seen.insert(key.as_str()) {
            issues.push(ValidationIssue::warning(
                format!("config.selectedFields[{idx}]"),
                format!("field '{key}' is selected more than once"),
            ));
        }
    }

    if let Some(range) = &config.date_range
        && !range.is_ordered()
    {
        issues.push(ValidationIssue::error(
            "config.dateRange",
            format!("start {} is after end {}", range.from, range.to),
        ));
    }

    issues
}
