//! The export pipeline.
//!
//! `resolve policy -> redact -> build metadata -> assemble -> validate ->
//! generate -> deliver`, reporting progress and checking the cancellation
//! flag before each stage.

use std::sync::Arc;
use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tracing::{debug, info, info_span, warn};

use audex_hash::Hasher;
use audex_model::{
    CancelFlag, ColumnDef, ExportConfig, ExportMetadata, ExportPayload, ExportProgress,
    ExportResult, ExportStage, GeneratedFile, RedactionPolicy,
};
use audex_redact::{RedactionOutcome, Redactor};
use audex_validate::{ValidationContext, validate_payload};

use crate::error::{ExportError, Result};
use crate::registry::{AdapterRegistry, PolicyRegistry};
use crate::sink::DeliverySink;

/// Hex characters of the initiator digest kept in audit metadata.
pub const USER_HASH_LEN: usize = 16;

/// Progress callback invoked at every checkpoint.
pub type ProgressFn<'a> = &'a mut dyn FnMut(&ExportProgress);

/// Runs exports against registered policies and adapters.
#[derive(Clone)]
pub struct Exporter {
    policies: PolicyRegistry,
    adapters: AdapterRegistry,
    redactor: Redactor,
    row_sample: Option<usize>,
    sink: Option<Arc<dyn DeliverySink>>,
}

impl std::fmt::Debug for Exporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter")
            .field("policies", &self.policies.modules())
            .field("adapters", &self.adapters)
            .field("redactor", &self.redactor)
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

/// A successful run: the delivered file plus its audit record.
#[derive(Debug, Clone)]
pub struct ExportOutput {
    pub file: GeneratedFile,
    pub metadata: ExportMetadata,
}

impl Exporter {
    /// Exporter with the built-in adapters and the strong hash strategy.
    pub fn new(policies: PolicyRegistry) -> Self {
        Self {
            policies,
            adapters: AdapterRegistry::with_defaults(),
            redactor: Redactor::default(),
            row_sample: None,
            sink: None,
        }
    }

    #[must_use]
    pub fn with_adapters(mut self, adapters: AdapterRegistry) -> Self {
        self.adapters = adapters;
        self
    }

    #[must_use]
    pub fn with_hasher(mut self, hasher: Hasher) -> Self {
        self.redactor = Redactor::new(hasher);
        self
    }

    #[must_use]
    pub fn with_redactor(mut self, redactor: Redactor) -> Self {
        self.redactor = redactor;
        self
    }

    #[must_use]
    pub fn with_row_sample(mut self, rows: usize) -> Self {
        self.row_sample = Some(rows);
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: impl DeliverySink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    pub fn policies(&self) -> &PolicyRegistry {
        &self.policies
    }

    pub fn adapters(&self) -> &AdapterRegistry {
        &self.adapters
    }

    /// Swap the adapter behind a format key.
    pub fn adapters_mut(&mut self) -> &mut AdapterRegistry {
        &mut self.adapters
    }

    fn hasher(&self) -> &Hasher {
        self.redactor.hasher()
    }

    fn validation_context(&self) -> ValidationContext {
        let ctx = ValidationContext::new()
            .with_known_modules(self.policies.modules())
            .with_supported_formats(self.adapters.formats());
        match self.row_sample {
            Some(rows) => ctx.with_row_sample(rows),
            None => ctx,
        }
    }

    /// Run the full pipeline. Every failure is folded into the result; this
    /// never panics and never returns a partial file.
    pub fn export(
        &self,
        records: &[Value],
        config: &ExportConfig,
        user_id: &str,
        on_progress: Option<ProgressFn<'_>>,
        cancel: Option<&CancelFlag>,
    ) -> ExportResult {
        match self.export_file(records, config, user_id, on_progress, cancel) {
            Ok(output) => ExportResult::Success {
                filename: output.file.filename,
                metadata: Box::new(output.metadata),
            },
            Err(ExportError::Cancelled(cancelled)) => {
                info!(module = %config.module, reason = %cancelled.reason, "export cancelled");
                ExportResult::Cancelled {
                    reason: cancelled.reason,
                }
            }
            Err(err) => {
                warn!(module = %config.module, error = %err, "export failed");
                ExportResult::Error {
                    message: err.to_string(),
                }
            }
        }
    }

    /// Same pipeline as [`Exporter::export`], returning the generated file
    /// and typed errors.
    pub fn export_file(
        &self,
        records: &[Value],
        config: &ExportConfig,
        user_id: &str,
        on_progress: Option<ProgressFn<'_>>,
        cancel: Option<&CancelFlag>,
    ) -> Result<ExportOutput> {
        let fallback = CancelFlag::new();
        let cancel = cancel.unwrap_or(&fallback);
        let mut run = Checkpoints::new(on_progress, cancel);
        let start = Instant::now();

        let payload = self.assemble(records, config, user_id, &mut run)?;
        let span = info_span!(
            "export",
            export_id = %payload.metadata.export_id,
            module = %config.module,
            format = %config.format
        );
        let _guard = span.enter();

        run.enter(ExportStage::Generating)?;
        let adapter = self
            .adapters
            .get(config.format)
            .ok_or(ExportError::UnsupportedFormat(config.format))?;
        let generate_start = Instant::now();
        let file = adapter.generate(&payload, cancel)?;
        debug!(
            bytes = file.len(),
            duration_ms = generate_start.elapsed().as_millis(),
            "file generated"
        );

        // Past this point the bytes exist; cancellation is no longer honoured.
        run.enter(ExportStage::Delivering)?;
        if let Some(sink) = &self.sink {
            sink.deliver(&file).map_err(|source| ExportError::Delivery {
                filename: file.filename.clone(),
                source,
            })?;
        }
        run.enter(ExportStage::Complete)?;

        info!(
            filename = %file.filename,
            records = payload.metadata.record_count,
            duration_ms = start.elapsed().as_millis(),
            "export complete"
        );
        Ok(ExportOutput {
            file,
            metadata: payload.metadata,
        })
    }

    /// Run every stage up to and including validation, without generating
    /// or delivering anything.
    pub fn preview(
        &self,
        records: &[Value],
        config: &ExportConfig,
        user_id: &str,
    ) -> Result<ExportPayload> {
        let cancel = CancelFlag::new();
        let mut run = Checkpoints::new(None, &cancel);
        self.assemble(records, config, user_id, &mut run)
    }

    fn assemble(
        &self,
        records: &[Value],
        config: &ExportConfig,
        user_id: &str,
        run: &mut Checkpoints<'_, '_>,
    ) -> Result<ExportPayload> {
        run.enter(ExportStage::ResolvingPolicy)?;
        let policy = self.resolve_policy(config)?;

        run.enter(ExportStage::Redacting)?;
        let outcome = info_span!("redact", module = %config.module).in_scope(|| {
            self.redactor.apply_with_cancel(
                records,
                policy,
                &config.selected_fields,
                config.full_export,
                run.cancel,
            )
        })?;

        run.enter(ExportStage::BuildingMetadata)?;
        let metadata = self.build_metadata(config, user_id, &outcome);

        run.enter(ExportStage::Assembling)?;
        let columns = columns_for(policy, &outcome.included_fields);
        let payload = ExportPayload {
            config: config.clone(),
            metadata,
            columns,
            rows: outcome.rows,
            additional_sheets: config.additional_sheets.clone(),
        };

        run.enter(ExportStage::Validating)?;
        let report = validate_payload(&payload, &self.validation_context());
        for issue in report.warnings() {
            warn!(path = %issue.path, "{}", issue.message);
        }
        report.into_result()?;
        Ok(payload)
    }

    fn resolve_policy(&self, config: &ExportConfig) -> Result<&RedactionPolicy> {
        let policy = self
            .policies
            .get(config.module.trim())
            .ok_or_else(|| ExportError::UnknownModule(config.module.clone()))?;
        if policy.requires_full_export_confirmation
            && config.full_export
            && !config.full_export_confirmed
        {
            return Err(ExportError::ConfirmationRequired {
                module: policy.module.clone(),
            });
        }
        debug!(
            module = %policy.module,
            version = policy.version,
            fields = policy.fields.len(),
            "policy resolved"
        );
        Ok(policy)
    }

    fn build_metadata(
        &self,
        config: &ExportConfig,
        user_id: &str,
        outcome: &RedactionOutcome,
    ) -> ExportMetadata {
        let hasher = self.hasher();
        ExportMetadata {
            export_id: hasher.random_id(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            user_hash: hasher.short_digest(user_id, USER_HASH_LEN),
            module: config.module.trim().to_string(),
            format: config.format,
            filters: config.filters_snapshot(),
            record_count: outcome.rows.len() as u64,
            checksum: hasher.checksum(&outcome.rows),
            full_export: config.full_export,
            included_fields: outcome.included_fields.clone(),
            redacted_fields: outcome.audit_redacted_fields(),
        }
    }
}

/// Output columns: surviving fields in policy order, labelled from the policy.
fn columns_for(policy: &RedactionPolicy, included: &[String]) -> Vec<ColumnDef> {
    included
        .iter()
        .map(|key| {
            let label = policy
                .field(key)
                .map_or_else(|| key.clone(), |field| field.label.clone());
            ColumnDef::new(key.clone(), label)
        })
        .collect()
}

/// Progress reporting plus the cancellation check made at every stage.
struct Checkpoints<'p, 'c> {
    on_progress: Option<ProgressFn<'p>>,
    cancel: &'c CancelFlag,
}

impl<'p, 'c> Checkpoints<'p, 'c> {
    fn new(on_progress: Option<ProgressFn<'p>>, cancel: &'c CancelFlag) -> Self {
        Self {
            on_progress,
            cancel,
        }
    }

    fn enter(&mut self, stage: ExportStage) -> Result<()> {
        if stage.cancellable() {
            self.cancel.check()?;
        }
        let progress = stage.progress();
        debug!(percent = progress.percent, "{}", progress.message);
        if let Some(callback) = self.on_progress.as_mut() {
            callback(&progress);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audex_model::{FieldConfig, RedactionAction};

    #[test]
    fn columns_follow_included_order_with_policy_labels() {
        let policy = RedactionPolicy::new(
            "plans",
            vec![
                FieldConfig::new("name", "Plan Name", RedactionAction::Include),
                FieldConfig::new("_id", "ID", RedactionAction::Hash),
            ],
        )
        .unwrap();
        let columns = columns_for(&policy, &["name".to_string(), "_id".to_string()]);
        assert_eq!(
            columns,
            vec![ColumnDef::new("name", "Plan Name"), ColumnDef::new("_id", "ID")]
        );
    }
}
