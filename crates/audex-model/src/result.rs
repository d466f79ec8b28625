use serde::{Deserialize, Serialize};

use crate::metadata::ExportMetadata;

/// Outcome of one export invocation. Exactly one variant is returned per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
#[must_use]
pub enum ExportResult {
    Success {
        filename: String,
        metadata: Box<ExportMetadata>,
    },
    Cancelled {
        reason: String,
    },
    Error {
        message: String,
    },
}

impl ExportResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn filename(&self) -> Option<&str> {
        match self {
            Self::Success { filename, .. } => Some(filename),
            _ => None,
        }
    }

    pub fn metadata(&self) -> Option<&ExportMetadata> {
        match self {
            Self::Success { metadata, .. } => Some(metadata),
            _ => None,
        }
    }

    /// One-line description suitable for a toast or log line.
    pub fn summary(&self) -> String {
        match self {
            Self::Success { filename, metadata } => {
                format!("exported {} records to {filename}", metadata.record_count)
            }
            Self::Cancelled { reason } => format!("export cancelled: {reason}"),
            Self::Error { message } => format!("export failed: {message}"),
        }
    }
}
