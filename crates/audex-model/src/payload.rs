//! Assembled export payloads and named sheets.

use serde::{Deserialize, Serialize};

use crate::config::ExportConfig;
use crate::metadata::ExportMetadata;
use crate::value::ExportRow;

/// Name of the implicit primary sheet.
pub const DATA_SHEET_NAME: &str = "Data";

/// Name of the trailing audit sheet.
pub const AUDIT_SHEET_NAME: &str = "Audit";

/// Output column: a field key plus its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub key: String,
    pub label: String,
}

impl ColumnDef {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// A named tabular section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSheet {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub rows: Vec<ExportRow>,
}

impl ExportSheet {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_rows(mut self, rows: Vec<ExportRow>) -> Self {
        self.rows = rows;
        self
    }

    pub fn push_row(&mut self, row: ExportRow) {
        self.rows.push(row);
    }
}

/// The fully assembled, redaction-applied unit handed to an adapter.
///
/// Every row's keys are a subset of `columns`, and `columns` only holds
/// policy fields that were selected and not excluded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportPayload {
    pub config: ExportConfig,
    pub metadata: ExportMetadata,
    pub columns: Vec<ColumnDef>,
    pub rows: Vec<ExportRow>,
    pub additional_sheets: Vec<ExportSheet>,
}

impl ExportPayload {
    /// The primary data section as a sheet view.
    pub fn data_sheet(&self) -> ExportSheet {
        ExportSheet {
            name: DATA_SHEET_NAME.to_string(),
            columns: self.columns.clone(),
            rows: self.rows.clone(),
        }
    }

    pub fn column_keys(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.key.as_str()).collect()
    }

    pub fn include_audit(&self) -> bool {
        self.config.include_audit_metadata
    }
}
