//! Paginated table-report encoder.
//!
//! Produces a minimal PDF 1.4 file from scratch: one content stream per page
//! built from positioned text operators, a single shared Helvetica font
//! resource, and a byte-offset cross-reference table.
//!
//! Text is truncated per cell rather than wrapped, and only characters in
//! the font's WinAnsi encoding are drawn.

mod adapter;
mod content;
mod document;
mod geometry;
mod layout;
mod text;

pub use adapter::{PDF_MIME_TYPE, PdfAdapter};
pub use content::ContentStream;
pub use document::{DocumentInfo, PRODUCER, build_document, pdf_date};
pub use geometry::PageGeometry;
pub use layout::{FOOTER_CHECKSUM_LEN, TRUNCATED_MARKER};
pub use text::{ELLIPSIS, escape_literal, truncate_cell};
