//! Audit metadata checks.

use chrono::DateTime;

use audex_model::ExportMetadata;

use crate::issue::ValidationIssue;

const CHECKSUM_HEX_LEN: usize = 64;

pub fn check(metadata: &ExportMetadata) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let required = [
        ("metadata.exportId", metadata.export_id.as_str()),
        ("metadata.timestamp", metadata.timestamp.as_str()),
        ("metadata.userHash", metadata.user_hash.as_str()),
        ("metadata.module", metadata.module.as_str()),
        ("metadata.checksum", metadata.checksum.as_str()),
    ];
    for (path, value) in required {
        if value.trim().is_empty() {
            issues.push(ValidationIssue::error(path, "value is required"));
        }
    }

    if !metadata.timestamp.trim().is_empty()
        && DateTime::parse_from_rfc3339(&metadata.timestamp).is_err()
    {
        issues.push(ValidationIssue::error(
            "metadata.timestamp",
            format!("'{}' is not an RFC 3339 timestamp", metadata.timestamp),
        ));
    }

    let checksum = metadata.checksum.trim();
    if !checksum.is_empty()
        && (checksum.len() != CHECKSUM_HEX_LEN || !checksum.chars().all(|c| c.is_ascii_hexdigit()))
    {
        issues.push(ValidationIssue::warning(
            "metadata.checksum",
            format!("expected {CHECKSUM_HEX_LEN} hex characters"),
        ));
    }

    issues
}
