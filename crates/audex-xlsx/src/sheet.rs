//! Worksheet naming and cell encoding.

use std::collections::BTreeSet;

use audex_model::value::format_number;
use audex_model::{AdapterError, CellValue, ColumnDef, ExportRow};

use crate::xml::{MAIN_NS, XmlPart};

/// Maximum worksheet name length accepted by spreadsheet readers.
pub const MAX_SHEET_NAME_LEN: usize = 31;

const FORBIDDEN_NAME_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];
const FALLBACK_SHEET_NAME: &str = "Sheet";

/// Zero-based column index to spreadsheet letters (`0 -> A`, `26 -> AA`).
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Strip characters readers reject and cap the length.
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|ch| !FORBIDDEN_NAME_CHARS.contains(ch) && !ch.is_control())
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'').trim();
    let capped: String = cleaned.chars().take(MAX_SHEET_NAME_LEN).collect();
    if capped.is_empty() {
        FALLBACK_SHEET_NAME.to_string()
    } else {
        capped
    }
}

/// Hands out unique, sanitized sheet names. Comparison ignores case, the
/// same way readers do.
#[derive(Debug, Default)]
pub struct SheetNamer {
    used: BTreeSet<String>,
}

impl SheetNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a name up front so later sheets cannot take it.
    pub fn reserve(&mut self, name: &str) {
        self.used.insert(name.to_lowercase());
    }

    /// Next free variant of `name`: `Totals`, `Totals (2)`, `Totals (3)`...
    pub fn assign(&mut self, name: &str) -> String {
        let base = sanitize_sheet_name(name);
        if self.used.insert(base.to_lowercase()) {
            return base;
        }
        let mut n = 2usize;
        loop {
            let suffix = format!(" ({n})");
            let keep = MAX_SHEET_NAME_LEN.saturating_sub(suffix.chars().count());
            let stem: String = base.chars().take(keep).collect();
            let candidate = format!("{}{suffix}", stem.trim_end());
            if self.used.insert(candidate.to_lowercase()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// One worksheet ready to encode.
#[derive(Debug, Clone)]
pub struct SheetSpec<'a> {
    pub name: String,
    pub columns: &'a [ColumnDef],
    pub rows: &'a [ExportRow],
}

/// Encode a worksheet: a header row of labels followed by one row per record.
pub fn worksheet_xml(columns: &[ColumnDef], rows: &[ExportRow]) -> Result<Vec<u8>, AdapterError> {
    let mut xml = XmlPart::new()?;
    xml.start("worksheet", &[("xmlns", MAIN_NS)])?;
    xml.start("sheetData", &[])?;

    let letters: Vec<String> = (0..columns.len()).map(column_letter).collect();

    write_row(&mut xml, 1, &letters, columns.iter().map(|column| {
        Some(CellValue::text(column.label.as_str()))
    }))?;

    for (idx, row) in rows.iter().enumerate() {
        let cells = columns.iter().map(|column| row.get(&column.key).cloned());
        write_row(&mut xml, idx + 2, &letters, cells)?;
    }

    xml.end("sheetData")?;
    xml.end("worksheet")?;
    Ok(xml.finish())
}

fn write_row(
    xml: &mut XmlPart,
    number: usize,
    letters: &[String],
    cells: impl Iterator<Item = Option<CellValue>>,
) -> Result<(), AdapterError> {
    let row_ref = number.to_string();
    xml.start("row", &[("r", row_ref.as_str())])?;
    for (letter, cell) in letters.iter().zip(cells) {
        if let Some(cell) = cell {
            write_cell(xml, &format!("{letter}{number}"), &cell)?;
        }
    }
    xml.end("row")
}

fn write_cell(xml: &mut XmlPart, cell_ref: &str, value: &CellValue) -> Result<(), AdapterError> {
    match value {
        CellValue::Null => Ok(()),
        CellValue::Number(n) if n.is_finite() => {
            xml.start("c", &[("r", cell_ref)])?;
            xml.start("v", &[])?;
            xml.text(&format_number(*n))?;
            xml.end("v")?;
            xml.end("c")
        }
        CellValue::Bool(b) => {
            xml.start("c", &[("r", cell_ref), ("t", "b")])?;
            xml.start("v", &[])?;
            xml.text(if *b { "1" } else { "0" })?;
            xml.end("v")?;
            xml.end("c")
        }
        other => inline_string(xml, cell_ref, &other.display_text()),
    }
}

fn inline_string(xml: &mut XmlPart, cell_ref: &str, text: &str) -> Result<(), AdapterError> {
    xml.start("c", &[("r", cell_ref), ("t", "inlineStr")])?;
    xml.start("is", &[])?;
    if text.trim() != text {
        xml.start("t", &[("xml:space", "preserve")])?;
    } else {
        xml.start("t", &[])?;
    }
    xml.text(text)?;
    xml.end("t")?;
    xml.end("is")?;
    xml.end("c")
}
