//! Validation issues and reports.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks the export.
    Error,
    /// Surfaced to the log, never blocks.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// A single finding, located by a dotted path into the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
    pub severity: Severity,
}

impl ValidationIssue {
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Collected findings for one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = ValidationIssue>) {
        self.issues.extend(issues);
    }

    /// True iff no error-severity issue exists.
    pub fn is_valid(&self) -> bool {
        !self.issues.iter().any(ValidationIssue::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|issue| issue.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|issue| !issue.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// All error messages joined into one line.
    pub fn error_message(&self) -> String {
        self.errors()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Convert to `Err` when any error-severity issue exists.
    pub fn into_result(self) -> Result<Self, ValidationError> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(ValidationError {
                message: self.error_message(),
                report: self,
            })
        }
    }
}

/// Aggregated failure raised by the assertion guards.
#[derive(Debug, Clone, Error)]
#[error("validation failed: {message}")]
pub struct ValidationError {
    pub message: String,
    pub report: ValidationReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_do_not_invalidate() {
        let mut report = ValidationReport::new();
        report.add(ValidationIssue::warning("rows[0].extra", "unexpected key"));
        assert!(report.is_valid());
        assert_eq!(report.warning_count(), 1);
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn errors_are_concatenated() {
        let mut report = ValidationReport::new();
        report.add(ValidationIssue::error("config.module", "module is required"));
        report.add(ValidationIssue::warning("rows[0].x", "ignored"));
        report.add(ValidationIssue::error("metadata.checksum", "checksum is required"));
        let err = report.into_result().unwrap_err();
        assert_eq!(
            err.message,
            "config.module: module is required; metadata.checksum: checksum is required"
        );
        assert_eq!(err.report.error_count(), 2);
    }
}
