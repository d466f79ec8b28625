//! Spreadsheet [`FormatAdapter`].

use std::time::Instant;

use chrono::DateTime;
use tracing::{debug, info};

use audex_model::{
    AUDIT_SHEET_NAME, AdapterError, CancelFlag, CellValue, ColumnDef, DATA_SHEET_NAME,
    ExportFormat, ExportPayload, ExportRow, FormatAdapter, GeneratedFile,
};
use audex_validate::{ValidationContext, assert_valid_payload};

use crate::archive::{DosDateTime, ZipWriter};
use crate::package::{
    CONTENT_TYPES_PATH, ROOT_RELS_PATH, WORKBOOK_PATH, WORKBOOK_RELS_PATH, content_types,
    root_rels, workbook, workbook_rels, worksheet_path,
};
use crate::sheet::{SheetNamer, SheetSpec, worksheet_xml};

pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Encodes a payload as a stored-ZIP workbook: `Data`, any extra sheets, then
/// `Audit` when audit metadata is enabled.
#[derive(Debug, Clone, Default)]
pub struct XlsxAdapter {
    context: ValidationContext,
}

impl XlsxAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate payloads against `context` instead of the permissive default.
    #[must_use]
    pub fn with_context(mut self, context: ValidationContext) -> Self {
        self.context = context;
        self
    }
}

impl FormatAdapter for XlsxAdapter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Xlsx
    }

    fn mime_type(&self) -> &'static str {
        XLSX_MIME_TYPE
    }

    fn generate(
        &self,
        payload: &ExportPayload,
        cancel: &CancelFlag,
    ) -> Result<GeneratedFile, AdapterError> {
        let start = Instant::now();
        assert_valid_payload(payload, &self.context)
            .map_err(|err| AdapterError::InvalidPayload(err.message))?;

        let audit_columns = vec![
            ColumnDef::new("property", "Property"),
            ColumnDef::new("value", "Value"),
        ];
        let audit_rows: Vec<ExportRow> = payload
            .metadata
            .audit_entries()
            .into_iter()
            .map(|(label, value)| {
                ExportRow::from([
                    ("property".to_string(), CellValue::text(label)),
                    ("value".to_string(), CellValue::text(value)),
                ])
            })
            .collect();

        let include_audit = payload.include_audit();
        let mut namer = SheetNamer::new();
        namer.reserve(DATA_SHEET_NAME);
        if include_audit {
            namer.reserve(AUDIT_SHEET_NAME);
        }

        let mut sheets = vec![SheetSpec {
            name: DATA_SHEET_NAME.to_string(),
            columns: &payload.columns,
            rows: &payload.rows,
        }];
        for extra in &payload.additional_sheets {
            sheets.push(SheetSpec {
                name: namer.assign(&extra.name),
                columns: &extra.columns,
                rows: &extra.rows,
            });
        }
        if include_audit {
            sheets.push(SheetSpec {
                name: AUDIT_SHEET_NAME.to_string(),
                columns: &audit_columns,
                rows: &audit_rows,
            });
        }

        let stamp = DateTime::parse_from_rfc3339(&payload.metadata.timestamp)
            .map(|parsed| DosDateTime::from_naive(parsed.naive_utc()))
            .unwrap_or(DosDateTime::EPOCH);
        let mut zip = ZipWriter::new().with_timestamp(stamp);

        let names: Vec<String> = sheets.iter().map(|sheet| sheet.name.clone()).collect();
        zip.add_entry(CONTENT_TYPES_PATH, &content_types(sheets.len())?)?;
        zip.add_entry(ROOT_RELS_PATH, &root_rels()?)?;
        zip.add_entry(WORKBOOK_PATH, &workbook(&names)?)?;
        zip.add_entry(WORKBOOK_RELS_PATH, &workbook_rels(sheets.len())?)?;

        for (idx, sheet) in sheets.iter().enumerate() {
            cancel.check()?;
            let bytes = worksheet_xml(sheet.columns, sheet.rows)?;
            debug!(
                sheet = %sheet.name,
                rows = sheet.rows.len(),
                bytes = bytes.len(),
                "worksheet encoded"
            );
            zip.add_entry(&worksheet_path(idx + 1), &bytes)?;
        }

        let bytes = zip.finish()?;
        info!(
            module = %payload.metadata.module,
            sheets = sheets.len(),
            bytes = bytes.len(),
            duration_ms = start.elapsed().as_millis(),
            "xlsx generated"
        );
        Ok(GeneratedFile {
            filename: payload.metadata.filename(ExportFormat::Xlsx.extension()),
            mime_type: XLSX_MIME_TYPE,
            bytes,
        })
    }
}
