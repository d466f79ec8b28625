//! Shared data model for the audited export pipeline.
//!
//! Every other `audex-*` crate speaks in these types:
//!
//! - [`RedactionPolicy`] / [`FieldConfig`]: the per-module privacy rulebook
//! - [`ExportConfig`]: what the user asked for
//! - [`ExportMetadata`]: the audit record embedded in every output file
//! - [`ExportPayload`]: the validated unit handed to a [`FormatAdapter`]
//! - [`ExportResult`]: the single outcome returned to callers

pub mod adapter;
pub mod cancel;
pub mod config;
pub mod error;
pub mod metadata;
pub mod payload;
pub mod policy;
pub mod progress;
pub mod result;
pub mod value;

pub use adapter::{AdapterError, FormatAdapter, GeneratedFile};
pub use cancel::{CancelFlag, Cancelled};
pub use config::{DateRange, ExportConfig, ExportFormat};
pub use error::{ModelError, Result};
pub use metadata::ExportMetadata;
pub use payload::{AUDIT_SHEET_NAME, ColumnDef, DATA_SHEET_NAME, ExportPayload, ExportSheet};
pub use policy::{FieldConfig, RedactionAction, RedactionPolicy};
pub use progress::{ExportProgress, ExportStage};
pub use result::ExportResult;
pub use value::{CellValue, ExportRow};
