//! Raw record loading.
//!
//! Records arrive either as a JSON array of objects or as CSV with a header
//! row. CSV headers containing dots (`owner.email`) become nested objects so
//! dot-path field keys resolve the same way for both inputs.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use tracing::{Level, debug, trace};

use crate::logging::redact_value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Json,
    Csv,
}

impl RecordFormat {
    /// `.csv` files are CSV; everything else is treated as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Json,
        }
    }
}

pub fn load_records(path: &Path) -> Result<Vec<Value>> {
    let start = Instant::now();
    let format = RecordFormat::from_path(path);
    let file = File::open(path).with_context(|| format!("open records {}", path.display()))?;
    let reader = BufReader::new(file);
    let records = match format {
        RecordFormat::Json => parse_json_records(reader),
        RecordFormat::Csv => parse_csv_records(reader),
    }
    .with_context(|| format!("read records {}", path.display()))?;
    debug!(
        path = %path.display(),
        format = ?format,
        records = records.len(),
        duration_ms = start.elapsed().as_millis(),
        "records loaded"
    );
    Ok(records)
}

pub fn parse_json_records(reader: impl Read) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_reader(reader).context("parse JSON")?;
    let Value::Array(items) = value else {
        bail!("expected a JSON array of records");
    };
    for (index, item) in items.iter().enumerate() {
        if !item.is_object() {
            bail!("record {index} is not an object");
        }
        if tracing::enabled!(Level::TRACE) {
            trace!(index, record = redact_value(&item.to_string()), "record");
        }
    }
    Ok(items)
}

/// Cells are text except whole integers, which become numbers. Empty cells
/// are left out of the record.
pub fn parse_csv_records(reader: impl Read) -> Result<Vec<Value>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let headers = csv.headers().context("read CSV header")?.clone();
    let mut records = Vec::new();
    for (index, row) in csv.records().enumerate() {
        let row = row.with_context(|| format!("read CSV row {}", index + 1))?;
        let mut record = Map::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            if header.is_empty() || cell.is_empty() {
                continue;
            }
            insert_path(&mut record, header, csv_cell(cell));
        }
        let record = Value::Object(record);
        if tracing::enabled!(Level::TRACE) {
            trace!(index, record = redact_value(&record.to_string()), "record");
        }
        records.push(record);
    }
    Ok(records)
}

fn csv_cell(raw: &str) -> Value {
    match raw.parse::<i64>() {
        Ok(number) if number.to_string() == raw => Value::from(number),
        _ => Value::String(raw.to_string()),
    }
}

/// Insert under a dot path, creating intermediate objects. A segment that
/// already holds a scalar keeps the full dotted key flat instead.
fn insert_path(record: &mut Map<String, Value>, path: &str, value: Value) {
    let Some((head, rest)) = path.split_once('.') else {
        record.insert(path.to_string(), value);
        return;
    };
    if !matches!(record.get(head), None | Some(Value::Object(_))) {
        record.insert(path.to_string(), value);
        return;
    }
    if let Value::Object(child) = record
        .entry(head.to_string())
        .or_insert_with(|| Value::Object(Map::new()))
    {
        insert_path(child, rest, value);
    }
}
