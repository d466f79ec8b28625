//! The format-adapter seam.
//!
//! The orchestrator only ever talks to [`FormatAdapter`]; the built-in
//! byte-level encoders can be swapped for other implementations by
//! registering a different adapter under the same format.

use thiserror::Error;

use crate::cancel::{CancelFlag, Cancelled};
use crate::config::ExportFormat;
use crate::payload::ExportPayload;

/// Errors raised while encoding a payload.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The payload failed the entry guard.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// An archive entry or offset does not fit the container's 32-bit fields.
    #[error("entry '{name}' is too large for the container ({size} bytes)")]
    TooLarge { name: String, size: u64 },

    /// Unexpected internal state while assembling bytes.
    #[error("encoding failed: {message}")]
    Encoding { message: String },

    #[error(transparent)]
    Cancelled(#[from] Cancelled),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AdapterError {
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }
}

/// Encoded output ready for a delivery sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl GeneratedFile {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A format-specific encoder.
///
/// Implementations must observe `cancel` during any iterative work and must
/// never return a partially built file.
pub trait FormatAdapter: Send + Sync {
    fn format(&self) -> ExportFormat;

    fn mime_type(&self) -> &'static str;

    /// Encode the payload. The filename follows
    /// [`ExportMetadata::filename`](crate::ExportMetadata::filename).
    fn generate(
        &self,
        payload: &ExportPayload,
        cancel: &CancelFlag,
    ) -> Result<GeneratedFile, AdapterError>;
}
