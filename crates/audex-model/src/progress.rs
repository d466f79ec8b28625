//! Progress reporting at pipeline checkpoints.

use serde::{Deserialize, Serialize};

/// Pipeline checkpoints, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportStage {
    ResolvingPolicy,
    Redacting,
    BuildingMetadata,
    Assembling,
    Validating,
    Generating,
    Delivering,
    Complete,
}

impl ExportStage {
    pub fn percent(&self) -> u8 {
        match self {
            Self::ResolvingPolicy => 5,
            Self::Redacting => 15,
            Self::BuildingMetadata => 50,
            Self::Assembling => 60,
            Self::Validating => 70,
            Self::Generating => 80,
            Self::Delivering => 95,
            Self::Complete => 100,
        }
    }

    /// Returns a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ResolvingPolicy => "Resolving redaction policy...",
            Self::Redacting => "Applying redaction policy...",
            Self::BuildingMetadata => "Building audit metadata...",
            Self::Assembling => "Assembling payload...",
            Self::Validating => "Validating payload...",
            Self::Generating => "Generating file...",
            Self::Delivering => "Delivering file...",
            Self::Complete => "Export complete",
        }
    }

    /// Cancellation is only honoured before bytes are handed to delivery.
    pub fn cancellable(&self) -> bool {
        !matches!(self, Self::Delivering | Self::Complete)
    }

    pub fn progress(&self) -> ExportProgress {
        ExportProgress {
            percent: self.percent(),
            message: self.label().to_string(),
            cancellable: self.cancellable(),
        }
    }
}

/// A single progress event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportProgress {
    /// 0 to 100.
    pub percent: u8,
    pub message: String,
    pub cancellable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER: [ExportStage; 8] = [
        ExportStage::ResolvingPolicy,
        ExportStage::Redacting,
        ExportStage::BuildingMetadata,
        ExportStage::Assembling,
        ExportStage::Validating,
        ExportStage::Generating,
        ExportStage::Delivering,
        ExportStage::Complete,
    ];

    #[test]
    fn percents_increase_monotonically() {
        for pair in ORDER.windows(2) {
            assert!(pair[0].percent() < pair[1].percent());
        }
        assert_eq!(ExportStage::Complete.percent(), 100);
    }

    #[test]
    fn delivery_is_not_cancellable() {
        assert!(ExportStage::Generating.progress().cancellable);
        assert!(!ExportStage::Delivering.progress().cancellable);
    }
}
