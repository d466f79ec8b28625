//! Stored (uncompressed) ZIP container writer.
//!
//! Layout: for each entry a local header immediately followed by its raw
//! bytes, then the central directory, then the end-of-central-directory
//! record. All integers are little-endian.

use chrono::{Datelike, NaiveDateTime, Timelike};

use audex_model::AdapterError;

use crate::crc::crc32;

pub(crate) const LOCAL_HEADER_SIG: u32 = 0x0403_4B50;
pub(crate) const CENTRAL_HEADER_SIG: u32 = 0x0201_4B50;
pub(crate) const END_OF_CENTRAL_DIR_SIG: u32 = 0x0605_4B50;

pub(crate) const LOCAL_HEADER_LEN: usize = 30;
pub(crate) const CENTRAL_HEADER_LEN: usize = 46;
pub(crate) const END_OF_CENTRAL_DIR_LEN: usize = 22;

const VERSION: u16 = 20;
/// General-purpose bit 11: names are UTF-8.
const FLAG_UTF8: u16 = 0x0800;
const METHOD_STORE: u16 = 0;

/// MS-DOS packed date and time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DosDateTime {
    pub time: u16,
    pub date: u16,
}

impl DosDateTime {
    /// 1980-01-01 00:00:00, the earliest representable instant.
    pub const EPOCH: Self = Self {
        time: 0,
        date: (1 << 5) | 1,
    };

    pub fn from_naive(value: NaiveDateTime) -> Self {
        let year = value.year();
        if year < 1980 {
            return Self::EPOCH;
        }
        let year = year.min(2107) as u16;
        let time = ((value.hour() as u16) << 11)
            | ((value.minute() as u16) << 5)
            | (value.second() as u16 / 2);
        let date = ((year - 1980) << 9) | ((value.month() as u16) << 5) | value.day() as u16;
        Self { time, date }
    }
}

#[derive(Debug, Clone)]
struct CentralRecord {
    name: String,
    crc: u32,
    size: u32,
    offset: u32,
}

/// Accumulates entries into an in-memory archive.
#[derive(Debug)]
pub struct ZipWriter {
    buf: Vec<u8>,
    records: Vec<CentralRecord>,
    stamp: DosDateTime,
}

impl Default for ZipWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ZipWriter {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            records: Vec::new(),
            stamp: DosDateTime::EPOCH,
        }
    }

    #[must_use]
    pub fn with_timestamp(mut self, stamp: DosDateTime) -> Self {
        self.stamp = stamp;
        self
    }

    pub fn entry_count(&self) -> usize {
        self.records.len()
    }

    /// Append one stored entry.
    pub fn add_entry(&mut self, name: &str, bytes: &[u8]) -> Result<(), AdapterError> {
        let size = to_u32(name, bytes.len())?;
        let offset = to_u32(name, self.buf.len())?;
        let name_len = name_len(name)?;
        let crc = crc32(bytes);

        self.buf.extend_from_slice(&build_local_header(
            crc,
            size,
            name_len,
            self.stamp,
        ));
        self.buf.extend_from_slice(name.as_bytes());
        self.buf.extend_from_slice(bytes);
        to_u32(name, self.buf.len())?;

        self.records.push(CentralRecord {
            name: name.to_string(),
            crc,
            size,
            offset,
        });
        Ok(())
    }

    /// Write the central directory and end record, returning the archive.
    pub fn finish(mut self) -> Result<Vec<u8>, AdapterError> {
        let entries = u16::try_from(self.records.len()).map_err(|_| AdapterError::TooLarge {
            name: "central directory".to_string(),
            size: self.records.len() as u64,
        })?;
        let cd_offset = to_u32("central directory", self.buf.len())?;

        for record in &self.records {
            let name_len = name_len(&record.name)?;
            self.buf.extend_from_slice(&build_central_header(
                record.crc,
                record.size,
                name_len,
                record.offset,
                self.stamp,
            ));
            self.buf.extend_from_slice(record.name.as_bytes());
        }

        let cd_size = to_u32("central directory", self.buf.len() - cd_offset as usize)?;
        self.buf.extend_from_slice(&build_end_of_central_dir(
            entries, cd_size, cd_offset,
        ));
        Ok(self.buf)
    }
}

fn to_u32(name: &str, len: usize) -> Result<u32, AdapterError> {
    u32::try_from(len).map_err(|_| AdapterError::TooLarge {
        name: name.to_string(),
        size: len as u64,
    })
}

fn name_len(name: &str) -> Result<u16, AdapterError> {
    u16::try_from(name.len()).map_err(|_| AdapterError::TooLarge {
        name: name.to_string(),
        size: name.len() as u64,
    })
}

fn build_local_header(crc: u32, size: u32, name_len: u16, stamp: DosDateTime) -> [u8; LOCAL_HEADER_LEN] {
    let mut out = [0u8; LOCAL_HEADER_LEN];
    out[0..4].copy_from_slice(&LOCAL_HEADER_SIG.to_le_bytes());
    out[4..6].copy_from_slice(&VERSION.to_le_bytes());
    out[6..8].copy_from_slice(&FLAG_UTF8.to_le_bytes());
    out[8..10].copy_from_slice(&METHOD_STORE.to_le_bytes());
    out[10..12].copy_from_slice(&stamp.time.to_le_bytes());
    out[12..14].copy_from_slice(&stamp.date.to_le_bytes());
    out[14..18].copy_from_slice(&crc.to_le_bytes());
    // Stored: compressed and uncompressed sizes are identical.
    out[18..22].copy_from_slice(&size.to_le_bytes());
    out[22..26].copy_from_slice(&size.to_le_bytes());
    out[26..28].copy_from_slice(&name_len.to_le_bytes());
    // extra field length stays 0
    out
}

fn build_central_header(
    crc: u32,
    size: u32,
    name_len: u16,
    offset: u32,
    stamp: DosDateTime,
) -> [u8; CENTRAL_HEADER_LEN] {
    let mut out = [0u8; CENTRAL_HEADER_LEN];
    out[0..4].copy_from_slice(&CENTRAL_HEADER_SIG.to_le_bytes());
    out[4..6].copy_from_slice(&VERSION.to_le_bytes());
    out[6..8].copy_from_slice(&VERSION.to_le_bytes());
    out[8..10].copy_from_slice(&FLAG_UTF8.to_le_bytes());
    out[10..12].copy_from_slice(&METHOD_STORE.to_le_bytes());
    out[12..14].copy_from_slice(&stamp.time.to_le_bytes());
    out[14..16].copy_from_slice(&stamp.date.to_le_bytes());
    out[16..20].copy_from_slice(&crc.to_le_bytes());
    out[20..24].copy_from_slice(&size.to_le_bytes());
    out[24..28].copy_from_slice(&size.to_le_bytes());
    out[28..30].copy_from_slice(&name_len.to_le_bytes());
    // extra, comment, disk start, internal and external attributes stay 0
    out[42..46].copy_from_slice(&offset.to_le_bytes());
    out
}

fn build_end_of_central_dir(entries: u16, cd_size: u32, cd_offset: u32) -> [u8; END_OF_CENTRAL_DIR_LEN] {
    let mut out = [0u8; END_OF_CENTRAL_DIR_LEN];
    out[0..4].copy_from_slice(&END_OF_CENTRAL_DIR_SIG.to_le_bytes());
    out[8..10].copy_from_slice(&entries.to_le_bytes());
    out[10..12].copy_from_slice(&entries.to_le_bytes());
    out[12..16].copy_from_slice(&cd_size.to_le_bytes());
    out[16..20].copy_from_slice(&cd_offset.to_le_bytes());
    out
}
