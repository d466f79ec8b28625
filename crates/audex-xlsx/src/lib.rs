//! Spreadsheet encoder.
//!
//! Writes an Office Open XML workbook into a ZIP container whose entries are
//! all stored uncompressed, with CRC-32 computed here rather than by a
//! compression library. [`read_entries`] walks the result back for
//! verification.

mod adapter;
mod archive;
mod crc;
mod package;
mod reader;
mod sheet;
mod xml;

pub use adapter::{XLSX_MIME_TYPE, XlsxAdapter};
pub use archive::{DosDateTime, ZipWriter};
pub use crc::{CRC_TABLE, Crc32, crc32};
pub use reader::{ArchiveEntry, ArchiveError, read_entries};
pub use sheet::{MAX_SHEET_NAME_LEN, SheetNamer, column_letter, sanitize_sheet_name};
