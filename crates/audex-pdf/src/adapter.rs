//! Document [`FormatAdapter`].

use std::time::Instant;

use tracing::{debug, info};

use audex_model::{
    AdapterError, CancelFlag, ExportFormat, ExportPayload, FormatAdapter, GeneratedFile,
};
use audex_validate::{ValidationContext, assert_valid_payload};

use crate::document::{DocumentInfo, build_document};
use crate::geometry::PageGeometry;
use crate::layout::{PageContext, Section, layout_audit, layout_section};

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Renders a payload as a fixed-geometry table report: the data section,
/// one section per extra sheet, then a single audit page.
#[derive(Debug, Clone, Default)]
pub struct PdfAdapter {
    context: ValidationContext,
    geometry: PageGeometry,
}

impl PdfAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_context(mut self, context: ValidationContext) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }
}

fn report_title(module: &str) -> String {
    let mut chars = module.chars();
    match chars.next() {
        Some(first) => format!("{}{} Export", first.to_uppercase(), chars.as_str()),
        None => "Export".to_string(),
    }
}

impl FormatAdapter for PdfAdapter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    fn mime_type(&self) -> &'static str {
        PDF_MIME_TYPE
    }

    fn generate(
        &self,
        payload: &ExportPayload,
        cancel: &CancelFlag,
    ) -> Result<GeneratedFile, AdapterError> {
        let start = Instant::now();
        assert_valid_payload(payload, &self.context)
            .map_err(|err| AdapterError::InvalidPayload(err.message))?;

        let metadata = &payload.metadata;
        let page = PageContext::from_metadata(metadata);
        let title = report_title(&metadata.module);

        let mut sections = vec![Section {
            title: title.clone(),
            columns: &payload.columns,
            rows: &payload.rows,
        }];
        sections.extend(payload.additional_sheets.iter().map(|sheet| Section {
            title: format!("{title}: {}", sheet.name),
            columns: &sheet.columns,
            rows: &sheet.rows,
        }));

        let mut pages = Vec::new();
        for section in &sections {
            let rendered = layout_section(section, &page, &self.geometry, cancel)?;
            debug!(section = %section.title, pages = rendered.len(), "section laid out");
            pages.extend(rendered);
        }
        if payload.include_audit() {
            cancel.check()?;
            pages.push(layout_audit(metadata, &page, &self.geometry)?);
        }

        let page_count = pages.len();
        let info = DocumentInfo {
            title,
            created: metadata.timestamp.clone(),
        };
        let bytes = build_document(
            &info,
            pages,
            (self.geometry.width, self.geometry.height),
        )?;
        info!(
            module = %metadata.module,
            pages = page_count,
            bytes = bytes.len(),
            duration_ms = start.elapsed().as_millis(),
            "pdf generated"
        );
        Ok(GeneratedFile {
            filename: metadata.filename(ExportFormat::Pdf.extension()),
            mime_type: PDF_MIME_TYPE,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_capitalize_module() {
        assert_eq!(report_title("plans"), "Plans Export");
        assert_eq!(report_title(""), "Export");
    }
}
