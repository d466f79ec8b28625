use std::collections::BTreeSet;

use audex_model::ExportFormat;

/// Rows inspected for unexpected keys unless overridden.
pub const DEFAULT_ROW_SAMPLE: usize = 100;

/// What the caller considers recognized, plus sampling limits.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    /// Modules with a registered policy. `None` accepts any non-empty module.
    pub known_modules: Option<BTreeSet<String>>,
    /// Formats with a registered adapter. `None` accepts every built-in format.
    pub supported_formats: Option<BTreeSet<ExportFormat>>,
    pub row_sample: usize,
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self {
            known_modules: None,
            supported_formats: None,
            row_sample: DEFAULT_ROW_SAMPLE,
        }
    }
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_known_modules<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_modules = Some(modules.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_supported_formats(mut self, formats: impl IntoIterator<Item = ExportFormat>) -> Self {
        self.supported_formats = Some(formats.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_row_sample(mut self, rows: usize) -> Self {
        self.row_sample = rows;
        self
    }

    pub(crate) fn module_known(&self, module: &str) -> bool {
        self.known_modules
            .as_ref()
            .is_none_or(|modules| modules.contains(module))
    }

    pub(crate) fn format_supported(&self, format: ExportFormat) -> bool {
        self.supported_formats
            .as_ref()
            .is_none_or(|formats| formats.contains(&format))
    }
}
