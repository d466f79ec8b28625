//! Indirect-object serialization, cross-reference table and trailer.

use std::io::Write;

use chrono::DateTime;

use audex_model::AdapterError;

use crate::content::{ContentStream, FONT_RESOURCE};
use crate::text::escape_literal;

const HEADER: &[u8] = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n";
pub const PRODUCER: &str = "audex";

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const FONT_ID: usize = 3;
const INFO_ID: usize = 4;
const FIRST_PAGE_ID: usize = 5;

/// Document-level properties written to the `/Info` dictionary.
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub title: String,
    /// RFC 3339 timestamp; converted to the `D:` date form.
    pub created: String,
}

/// Serialize pages into a complete document.
///
/// Object numbering: catalog, page tree, font, info, then a page object and
/// its content stream for every page.
pub fn build_document(
    info: &DocumentInfo,
    pages: Vec<ContentStream>,
    media_box: (f32, f32),
) -> Result<Vec<u8>, AdapterError> {
    let mut out = ObjectWriter::new();
    let page_ids: Vec<usize> = (0..pages.len()).map(|i| FIRST_PAGE_ID + 2 * i).collect();

    out.object(
        CATALOG_ID,
        format!("<< /Type /Catalog /Pages {PAGES_ID} 0 R >>").as_bytes(),
    )?;

    let kids = page_ids
        .iter()
        .map(|id| format!("{id} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");
    out.object(
        PAGES_ID,
        format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", page_ids.len()).as_bytes(),
    )?;

    out.object(
        FONT_ID,
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
    )?;

    out.object(
        INFO_ID,
        format!(
            "<< /Title ({}) /Producer ({PRODUCER}) /CreationDate ({}) >>",
            escape_literal(&info.title),
            pdf_date(&info.created)
        )
        .as_bytes(),
    )?;

    let (width, height) = media_box;
    for (page_id, stream) in page_ids.iter().zip(pages) {
        let content_id = page_id + 1;
        out.object(
            *page_id,
            format!(
                "<< /Type /Page /Parent {PAGES_ID} 0 R /MediaBox [0 0 {width:.0} {height:.0}] \
                 /Resources << /Font << /{FONT_RESOURCE} {FONT_ID} 0 R >> >> \
                 /Contents {content_id} 0 R >>"
            )
            .as_bytes(),
        )?;

        let data = stream.into_bytes();
        let mut body = format!("<< /Length {} >>\nstream\n", data.len()).into_bytes();
        body.extend_from_slice(&data);
        body.extend_from_slice(b"\nendstream");
        out.object(content_id, &body)?;
    }

    out.finish(CATALOG_ID, INFO_ID)
}

/// `D:YYYYMMDDHHmmSSZ`, or the bare prefix when the timestamp does not parse.
pub fn pdf_date(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(parsed) => parsed.naive_utc().format("D:%Y%m%d%H%M%SZ").to_string(),
        Err(_) => "D:".to_string(),
    }
}

struct ObjectWriter {
    buf: Vec<u8>,
    /// Byte offset of each object, indexed by object number minus one.
    offsets: Vec<Option<usize>>,
}

impl ObjectWriter {
    fn new() -> Self {
        Self {
            buf: HEADER.to_vec(),
            offsets: Vec::new(),
        }
    }

    fn object(&mut self, id: usize, body: &[u8]) -> Result<(), AdapterError> {
        if self.offsets.len() < id {
            self.offsets.resize(id, None);
        }
        self.offsets[id - 1] = Some(self.buf.len());
        writeln!(self.buf, "{id} 0 obj")?;
        self.buf.extend_from_slice(body);
        self.buf.extend_from_slice(b"\nendobj\n");
        Ok(())
    }

    fn finish(mut self, root: usize, info: usize) -> Result<Vec<u8>, AdapterError> {
        let xref_offset = self.buf.len();
        let size = self.offsets.len() + 1;
        writeln!(self.buf, "xref\n0 {size}")?;
        // Each entry is exactly 20 bytes including the two-character EOL.
        self.buf.extend_from_slice(b"0000000000 65535 f \n");
        for (idx, offset) in self.offsets.iter().enumerate() {
            let offset = offset.ok_or_else(|| {
                AdapterError::encoding(format!("object {} was never written", idx + 1))
            })?;
            writeln!(self.buf, "{offset:010} 00000 n ")?;
        }
        writeln!(
            self.buf,
            "trailer\n<< /Size {size} /Root {root} 0 R /Info {info} 0 R >>\nstartxref\n{xref_offset}\n%%EOF"
        )?;
        Ok(self.buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_date_format() {
        assert_eq!(pdf_date("2024-05-17T09:30:41.123Z"), "D:20240517093041Z");
        assert_eq!(pdf_date("2024-05-17T11:30:41+02:00"), "D:20240517093041Z");
        assert_eq!(pdf_date("nope"), "D:");
    }

    #[test]
    fn xref_entries_are_fixed_width() {
        let info = DocumentInfo {
            title: "t".to_string(),
            created: "2024-05-17T09:30:00Z".to_string(),
        };
        let bytes = build_document(&info, vec![ContentStream::new()], (842.0, 595.0)).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        let xref = text.find("xref\n0 7\n").expect("xref header");
        let entries: Vec<&str> = text[xref..].lines().skip(2).take(7).collect();
        assert!(entries.iter().all(|line| line.len() == 19));
        assert_eq!(entries[0], "0000000000 65535 f ");
        assert!(text.ends_with("%%EOF\n"));
    }
}
