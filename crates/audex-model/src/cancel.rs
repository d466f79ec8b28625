//! Cooperative cancellation.
//!
//! The caller keeps one clone of the flag and hands another to the pipeline.
//! Stages check it at their checkpoints and bail out with [`Cancelled`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;

const DEFAULT_REASON: &str = "export cancelled by user";

/// Shared abort signal.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    flag: Arc<AtomicBool>,
    reason: Arc<Mutex<Option<String>>>,
}

/// Raised when a checkpoint observes a cancelled flag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct Cancelled {
    pub reason: String,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// A flag that is already set, mostly useful in tests.
    pub fn cancelled(reason: impl Into<String>) -> Self {
        let flag = Self::new();
        flag.cancel_with_reason(reason);
        flag
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Cancel and record a human-readable reason. The first reason wins.
    pub fn cancel_with_reason(&self, reason: impl Into<String>) {
        if let Ok(mut slot) = self.reason.lock()
            && slot.is_none()
        {
            *slot = Some(reason.into());
        }
        self.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn reason(&self) -> String {
        self.reason
            .lock()
            .ok()
            .and_then(|slot| slot.clone())
            .unwrap_or_else(|| DEFAULT_REASON.to_string())
    }

    /// Checkpoint: `Err` once the flag has been set.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled {
                reason: self.reason(),
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let flag = CancelFlag::new();
        let observer = flag.clone();
        assert!(observer.check().is_ok());
        flag.cancel();
        assert!(observer.is_cancelled());
        assert_eq!(observer.check().unwrap_err().reason, DEFAULT_REASON);
    }

    #[test]
    fn first_reason_wins() {
        let flag = CancelFlag::new();
        flag.cancel_with_reason("navigated away");
        flag.cancel_with_reason("second");
        assert_eq!(flag.reason(), "navigated away");
    }
}
