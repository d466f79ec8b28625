//! Table report layout: sections of fixed-height rows chunked into pages.

use audex_model::{AdapterError, CancelFlag, CellValue, ColumnDef, ExportMetadata, ExportRow};

use crate::content::ContentStream;
use crate::geometry::{BODY_SIZE, PageGeometry, TITLE_SIZE};
use crate::text::truncate_cell;

/// Checksum characters shown in each footer.
pub const FOOTER_CHECKSUM_LEN: usize = 12;
pub const TRUNCATED_MARKER: &str = "... (truncated)";

const FULL_MARKER: &str = "FULL EXPORT";
const REDACTED_MARKER: &str = "REDACTED";

/// Per-document strings repeated on every page.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub export_id: String,
    pub timestamp: String,
    pub checksum_prefix: String,
    pub marker: &'static str,
}

impl PageContext {
    pub fn from_metadata(metadata: &ExportMetadata) -> Self {
        Self {
            export_id: metadata.export_id.clone(),
            timestamp: metadata.timestamp.clone(),
            checksum_prefix: metadata.checksum.chars().take(FOOTER_CHECKSUM_LEN).collect(),
            marker: if metadata.full_export {
                FULL_MARKER
            } else {
                REDACTED_MARKER
            },
        }
    }
}

/// A titled table rendered as its own run of pages.
#[derive(Debug, Clone)]
pub struct Section<'a> {
    pub title: String,
    pub columns: &'a [ColumnDef],
    pub rows: &'a [ExportRow],
}

/// Lay out one section. Page numbers restart at 1 for every section; an
/// empty section still gets a page with its header row.
pub fn layout_section(
    section: &Section<'_>,
    page: &PageContext,
    geometry: &PageGeometry,
    cancel: &CancelFlag,
) -> Result<Vec<ContentStream>, AdapterError> {
    let per_page = geometry.rows_per_page();
    let chunks: Vec<&[ExportRow]> = if section.rows.is_empty() {
        vec![section.rows]
    } else {
        section.rows.chunks(per_page).collect()
    };
    let total = chunks.len();
    let col_width = geometry.column_width(section.columns.len());
    let budget = geometry.cell_char_budget(col_width);
    let x_at = |idx: usize| geometry.margin + idx as f32 * col_width;

    let mut pages = Vec::with_capacity(total);
    for (page_idx, chunk) in chunks.into_iter().enumerate() {
        cancel.check()?;
        let mut stream = ContentStream::new();
        write_heading(&mut stream, geometry, &section.title, page, section.rows.len());

        for (idx, column) in section.columns.iter().enumerate() {
            stream.text(
                x_at(idx),
                geometry.header_y(),
                BODY_SIZE,
                &truncate_cell(&column.label, budget),
            );
        }
        stream.rule(
            geometry.margin,
            geometry.width - geometry.margin,
            geometry.separator_y(),
        );

        for (row_idx, row) in chunk.iter().enumerate() {
            let y = geometry.first_row_y() - row_idx as f32 * geometry.row_height;
            for (idx, column) in section.columns.iter().enumerate() {
                let value = row
                    .get(&column.key)
                    .map(CellValue::display_text)
                    .unwrap_or_default();
                if !value.is_empty() {
                    stream.text(x_at(idx), y, BODY_SIZE, &truncate_cell(&value, budget));
                }
            }
        }

        write_footer(&mut stream, geometry, page, page_idx + 1, total);
        pages.push(stream);
    }
    Ok(pages)
}

/// Render metadata as pretty JSON on a single page, cut off at the bottom.
pub fn layout_audit(
    metadata: &ExportMetadata,
    page: &PageContext,
    geometry: &PageGeometry,
) -> Result<ContentStream, AdapterError> {
    let pretty = serde_json::to_string_pretty(metadata)
        .map_err(|err| AdapterError::encoding(format!("audit metadata: {err}")))?;
    let lines: Vec<&str> = pretty.lines().collect();

    let mut stream = ContentStream::new();
    write_heading(
        &mut stream,
        geometry,
        "Audit Metadata",
        page,
        usize::try_from(metadata.record_count).unwrap_or(usize::MAX),
    );
    stream.rule(
        geometry.margin,
        geometry.width - geometry.margin,
        geometry.separator_y(),
    );

    let start = geometry.header_y() - geometry.row_height;
    let span = start - geometry.min_body_y();
    let capacity = if span < 0.0 {
        1
    } else {
        (span / geometry.row_height).floor() as usize + 1
    };
    let (shown, truncated) = if lines.len() > capacity {
        (capacity.saturating_sub(1), true)
    } else {
        (lines.len(), false)
    };

    for (idx, line) in lines.iter().take(shown).enumerate() {
        let y = start - idx as f32 * geometry.row_height;
        stream.text(geometry.margin, y, BODY_SIZE, line);
    }
    if truncated {
        let y = start - shown as f32 * geometry.row_height;
        stream.text(geometry.margin, y, BODY_SIZE, TRUNCATED_MARKER);
    }

    write_footer(&mut stream, geometry, page, 1, 1);
    Ok(stream)
}

fn write_heading(
    stream: &mut ContentStream,
    geometry: &PageGeometry,
    title: &str,
    page: &PageContext,
    records: usize,
) {
    stream.text(geometry.margin, geometry.title_y(), TITLE_SIZE, title);
    let meta = format!(
        "Export ID: {} | Date: {} | Records: {records}",
        page.export_id, page.timestamp
    );
    stream.text(geometry.margin, geometry.meta_y(), BODY_SIZE, &meta);
}

fn write_footer(
    stream: &mut ContentStream,
    geometry: &PageGeometry,
    page: &PageContext,
    number: usize,
    total: usize,
) {
    let footer = format!(
        "Page {number} of {total} | Checksum: {} | {}",
        page.checksum_prefix, page.marker
    );
    stream.text(geometry.margin, geometry.footer_y(), BODY_SIZE, &footer);
}
