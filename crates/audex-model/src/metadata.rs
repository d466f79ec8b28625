//! Audit metadata embedded in every export.

use std::collections::BTreeMap;

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::config::ExportFormat;

/// Audit record generated fresh for each run.
///
/// This is the only trace of who exported what. It travels inside the output
/// file and holds a truncated hash of the initiator, never the raw identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub export_id: String,
    /// RFC 3339 timestamp in UTC.
    pub timestamp: String,
    pub user_hash: String,
    pub module: String,
    pub format: ExportFormat,
    pub filters: BTreeMap<String, serde_json::Value>,
    pub record_count: u64,
    /// Checksum over the redacted rows.
    pub checksum: String,
    pub full_export: bool,
    pub included_fields: Vec<String>,
    /// Hashed, masked and excluded field keys.
    pub redacted_fields: Vec<String>,
}

impl ExportMetadata {
    /// `YYYYMMDD` taken from the timestamp.
    pub fn date_stamp(&self) -> String {
        match DateTime::parse_from_rfc3339(&self.timestamp) {
            Ok(parsed) => parsed.format("%Y%m%d").to_string(),
            Err(_) => self
                .timestamp
                .chars()
                .filter(char::is_ascii_digit)
                .take(8)
                .collect(),
        }
    }

    /// Deterministic output name: `<module>-export-<YYYYMMDD>-<exportId>.<ext>`.
    pub fn filename(&self, extension: &str) -> String {
        format!(
            "{}-export-{}-{}.{}",
            sanitize_file_component(&self.module),
            self.date_stamp(),
            self.export_id,
            extension
        )
    }

    /// Property/value pairs in audit-sheet order.
    pub fn audit_entries(&self) -> Vec<(&'static str, String)> {
        let filters = serde_json::to_string(&self.filters).unwrap_or_default();
        vec![
            ("Export ID", self.export_id.clone()),
            ("Timestamp", self.timestamp.clone()),
            ("Initiated By (hash)", self.user_hash.clone()),
            ("Module", self.module.clone()),
            ("Record Count", self.record_count.to_string()),
            ("Data Checksum", self.checksum.clone()),
            ("Full Export", if self.full_export { "Yes" } else { "No" }.to_string()),
            ("Included Fields", self.included_fields.join(", ")),
            ("Redacted Fields", self.redacted_fields.join(", ")),
            ("Filters", filters),
            ("Format", self.format.to_string()),
        ]
    }
}

fn sanitize_file_component(value: &str) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "data".to_string()
    } else {
        cleaned
    }
}
