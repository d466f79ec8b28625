//! Export request configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::payload::ExportSheet;

/// Output file formats with a built-in encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Stored-ZIP spreadsheet package.
    Xlsx,
    /// Paginated document.
    Pdf,
}

impl ExportFormat {
    pub const ALL: [Self; 2] = [Self::Xlsx, Self::Pdf];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Pdf => "pdf",
        }
    }

    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" | "excel" | "spreadsheet" => Ok(Self::Xlsx),
            "pdf" | "document" => Ok(Self::Pdf),
            other => Err(ModelError::UnknownFormat(other.to_string())),
        }
    }
}

/// Inclusive date window the caller filtered records by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    pub fn is_ordered(&self) -> bool {
        self.from <= self.to
    }
}

/// User intent for a single export. Built once per request and not mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub format: ExportFormat,
    pub module: String,
    pub selected_fields: Vec<String>,
    #[serde(default)]
    pub date_range: Option<DateRange>,
    #[serde(default = "default_include_audit")]
    pub include_audit_metadata: bool,
    /// Request the PII-inclusive mode that lifts overridable redactions.
    #[serde(default)]
    pub full_export: bool,
    /// Set once the user has explicitly confirmed a full export.
    #[serde(default)]
    pub full_export_confirmed: bool,
    #[serde(default)]
    pub filters: BTreeMap<String, serde_json::Value>,
    /// Caller-computed sheets (e.g. totals) that bypass redaction.
    #[serde(default)]
    pub additional_sheets: Vec<ExportSheet>,
}

fn default_include_audit() -> bool {
    true
}

impl ExportConfig {
    pub fn new(format: ExportFormat, module: impl Into<String>, selected_fields: Vec<String>) -> Self {
        Self {
            format,
            module: module.into(),
            selected_fields,
            date_range: None,
            include_audit_metadata: default_include_audit(),
            full_export: false,
            full_export_confirmed: false,
            filters: BTreeMap::new(),
            additional_sheets: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    #[must_use]
    pub fn with_audit_metadata(mut self, enable: bool) -> Self {
        self.include_audit_metadata = enable;
        self
    }

    /// Request a full export. `confirmed` records whether the user passed the
    /// confirmation step.
    #[must_use]
    pub fn with_full_export(mut self, confirmed: bool) -> Self {
        self.full_export = true;
        self.full_export_confirmed = confirmed;
        self
    }

    #[must_use]
    pub fn with_filter(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.filters.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn with_sheet(mut self, sheet: ExportSheet) -> Self {
        self.additional_sheets.push(sheet);
        self
    }

    /// Filters snapshot including the date range, as recorded in audit metadata.
    pub fn filters_snapshot(&self) -> BTreeMap<String, serde_json::Value> {
        let mut snapshot = self.filters.clone();
        if let Some(range) = &self.date_range {
            snapshot.insert(
                "dateRange".to_string(),
                serde_json::json!({
                    "from": range.from.to_string(),
                    "to": range.to.to_string(),
                }),
            );
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parses_aliases() {
        assert_eq!("XLSX".parse::<ExportFormat>().unwrap(), ExportFormat::Xlsx);
        assert_eq!(" pdf ".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert!(matches!(
            "csv".parse::<ExportFormat>(),
            Err(ModelError::UnknownFormat(_))
        ));
    }

    #[test]
    fn filters_snapshot_includes_date_range() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let config = ExportConfig::new(ExportFormat::Pdf, "plans", vec!["name".to_string()])
            .with_filter("status", serde_json::json!("active"))
            .with_date_range(DateRange::new(from, to));
        let snapshot = config.filters_snapshot();
        assert_eq!(snapshot["status"], serde_json::json!("active"));
        assert_eq!(snapshot["dateRange"]["from"], serde_json::json!("2024-01-01"));
        assert_eq!(snapshot["dateRange"]["to"], serde_json::json!("2024-03-31"));
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let json = r#"{"format": "xlsx", "module": "plans", "selected_fields": ["a"]}"#;
        let config: ExportConfig = serde_json::from_str(json).expect("parse config");
        assert!(config.include_audit_metadata);
        assert!(!config.full_export);
        assert!(config.additional_sheets.is_empty());
    }
}
