use std::path::PathBuf;

use thiserror::Error;

use audex_model::{AdapterError, Cancelled, ExportFormat, ModelError};
use audex_validate::ValidationError;

/// Errors raised inside the export pipeline.
///
/// [`Exporter::export`](crate::Exporter::export) never returns these
/// directly; it folds them into an [`ExportResult`](audex_model::ExportResult).
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no redaction policy registered for module '{0}'")]
    UnknownModule(String),

    #[error("no adapter registered for format '{0}'")]
    UnsupportedFormat(ExportFormat),

    #[error("full export of '{module}' requires explicit confirmation")]
    ConfirmationRequired { module: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Cancelled(#[from] Cancelled),

    #[error("failed to generate file: {0}")]
    Adapter(#[source] AdapterError),

    #[error("failed to deliver {filename}: {source}")]
    Delivery {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid policy: {0}")]
    Policy(#[from] ModelError),

    #[error("failed to read policy catalog {path}: {source}")]
    CatalogIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse policy catalog: {source}")]
    CatalogParse {
        #[source]
        source: toml::de::Error,
    },
}

impl From<AdapterError> for ExportError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::Cancelled(cancelled) => Self::Cancelled(cancelled),
            other => Self::Adapter(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
