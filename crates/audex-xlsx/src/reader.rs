//! Read-back of stored archives.
//!
//! Walks the central directory the same way a spreadsheet reader would and
//! returns every entry with its recorded CRC, so callers can verify the
//! stored bytes without a third-party unzip.

use thiserror::Error;

use crate::archive::{
    CENTRAL_HEADER_LEN, CENTRAL_HEADER_SIG, END_OF_CENTRAL_DIR_LEN, END_OF_CENTRAL_DIR_SIG,
    LOCAL_HEADER_LEN, LOCAL_HEADER_SIG,
};
use crate::crc::crc32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArchiveError {
    #[error("archive truncated at offset {offset}")]
    Truncated { offset: usize },

    #[error("bad {record} signature at offset {offset}")]
    BadSignature { record: &'static str, offset: usize },

    #[error("entry '{name}' uses compression method {method}")]
    Compressed { name: String, method: u16 },

    #[error("entry name at offset {offset} is not UTF-8")]
    InvalidName { offset: usize },
}

/// One archive member as recorded in the central directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    /// CRC stored in the central directory.
    pub crc: u32,
    pub data: Vec<u8>,
}

impl ArchiveEntry {
    /// True when the recorded CRC matches the stored bytes.
    pub fn crc_matches(&self) -> bool {
        crc32(&self.data) == self.crc
    }

    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}

/// Parse every entry of a stored archive.
pub fn read_entries(bytes: &[u8]) -> Result<Vec<ArchiveEntry>, ArchiveError> {
    let eocd = find_end_of_central_dir(bytes)?;
    let entries = read_u16(bytes, eocd + 10)? as usize;
    let mut cursor = read_u32(bytes, eocd + 16)? as usize;

    let mut out = Vec::with_capacity(entries);
    for _ in 0..entries {
        expect_sig(bytes, cursor, CENTRAL_HEADER_SIG, "central header")?;
        let method = read_u16(bytes, cursor + 10)?;
        let crc = read_u32(bytes, cursor + 16)?;
        let size = read_u32(bytes, cursor + 20)? as usize;
        let name_len = read_u16(bytes, cursor + 28)? as usize;
        let extra_len = read_u16(bytes, cursor + 30)? as usize;
        let comment_len = read_u16(bytes, cursor + 32)? as usize;
        let local = read_u32(bytes, cursor + 42)? as usize;

        let name_start = cursor + CENTRAL_HEADER_LEN;
        let name = slice(bytes, name_start, name_len)?;
        let name = String::from_utf8(name.to_vec())
            .map_err(|_| ArchiveError::InvalidName { offset: name_start })?;
        if method != 0 {
            return Err(ArchiveError::Compressed { name, method });
        }

        expect_sig(bytes, local, LOCAL_HEADER_SIG, "local header")?;
        let local_name_len = read_u16(bytes, local + 26)? as usize;
        let local_extra_len = read_u16(bytes, local + 28)? as usize;
        let data_start = local + LOCAL_HEADER_LEN + local_name_len + local_extra_len;
        let data = slice(bytes, data_start, size)?.to_vec();

        out.push(ArchiveEntry { name, crc, data });
        cursor = name_start + name_len + extra_len + comment_len;
    }
    Ok(out)
}

fn find_end_of_central_dir(bytes: &[u8]) -> Result<usize, ArchiveError> {
    if bytes.len() < END_OF_CENTRAL_DIR_LEN {
        return Err(ArchiveError::Truncated { offset: bytes.len() });
    }
    let sig = END_OF_CENTRAL_DIR_SIG.to_le_bytes();
    // Scan backwards to tolerate a trailing archive comment.
    (0..=bytes.len() - END_OF_CENTRAL_DIR_LEN)
        .rev()
        .find(|&offset| bytes[offset..offset + 4] == sig)
        .ok_or(ArchiveError::BadSignature {
            record: "end of central directory",
            offset: bytes.len() - END_OF_CENTRAL_DIR_LEN,
        })
}

fn slice(bytes: &[u8], offset: usize, len: usize) -> Result<&[u8], ArchiveError> {
    offset
        .checked_add(len)
        .and_then(|end| bytes.get(offset..end))
        .ok_or(ArchiveError::Truncated { offset })
}

fn read_u16(bytes: &[u8], offset: usize) -> Result<u16, ArchiveError> {
    let raw = slice(bytes, offset, 2)?;
    Ok(u16::from_le_bytes([raw[0], raw[1]]))
}

fn read_u32(bytes: &[u8], offset: usize) -> Result<u32, ArchiveError> {
    let raw = slice(bytes, offset, 4)?;
    Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

fn expect_sig(
    bytes: &[u8],
    offset: usize,
    expected: u32,
    record: &'static str,
) -> Result<(), ArchiveError> {
    if read_u32(bytes, offset)? == expected {
        Ok(())
    } else {
        Err(ArchiveError::BadSignature { record, offset })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ZipWriter;

    #[test]
    fn written_entries_read_back() {
        let mut zip = ZipWriter::new();
        zip.add_entry("first.xml", b"<a/>").unwrap();
        zip.add_entry("dir/second.xml", b"").unwrap();
        let bytes = zip.finish().unwrap();

        let entries = read_entries(&bytes).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "first.xml");
        assert_eq!(entries[0].text(), Some("<a/>"));
        assert_eq!(entries[1].name, "dir/second.xml");
        assert!(entries.iter().all(ArchiveEntry::crc_matches));
    }

    #[test]
    fn corrupted_data_fails_crc() {
        let mut zip = ZipWriter::new();
        zip.add_entry("x", b"abc").unwrap();
        let mut bytes = zip.finish().unwrap();
        bytes[LOCAL_HEADER_LEN + 1] = b'z';
        let entries = read_entries(&bytes).unwrap();
        assert!(!entries[0].crc_matches());
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(
            read_entries(b"PK"),
            Err(ArchiveError::Truncated { offset: 2 })
        );
        assert!(matches!(
            read_entries(&[0u8; 64]),
            Err(ArchiveError::BadSignature { .. })
        ));
    }
}
