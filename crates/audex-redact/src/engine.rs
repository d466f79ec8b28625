//! Policy application over record sets.

use std::time::Instant;

use serde_json::Value;
use tracing::{debug, trace};

use audex_hash::Hasher;
use audex_model::{CancelFlag, Cancelled, ExportRow, RedactionAction, RedactionPolicy};

use crate::transform::{hash_value, include_value, mask_value, resolve_path};

/// Records processed between cancellation checks.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Output of a redaction pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RedactionOutcome {
    /// Sanitized rows in input order.
    pub rows: Vec<ExportRow>,
    /// Active fields whose effective action is not `exclude`, in policy order.
    pub included_fields: Vec<String>,
    /// Active fields that were hashed or masked.
    pub redacted_fields: Vec<String>,
    /// Active fields dropped from every row.
    pub excluded_fields: Vec<String>,
}

impl RedactionOutcome {
    /// Everything the audit trail lists as redacted: hashed, masked and excluded keys.
    pub fn audit_redacted_fields(&self) -> Vec<String> {
        self.redacted_fields
            .iter()
            .chain(self.excluded_fields.iter())
            .cloned()
            .collect()
    }
}

/// A field with its action resolved for this export.
#[derive(Debug, Clone, Copy)]
struct ActiveField<'a> {
    key: &'a str,
    action: RedactionAction,
}

/// Applies a [`RedactionPolicy`] to raw records.
#[derive(Debug, Clone)]
pub struct Redactor {
    hasher: Hasher,
    batch_size: usize,
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new(Hasher::default())
    }
}

impl Redactor {
    pub fn new(hasher: Hasher) -> Self {
        Self {
            hasher,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set the batch size. Zero is treated as one.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn hasher(&self) -> &Hasher {
        &self.hasher
    }

    /// Redact without a cancellation signal. Never fails.
    pub fn apply(
        &self,
        records: &[Value],
        policy: &RedactionPolicy,
        selected: &[String],
        full_export: bool,
    ) -> RedactionOutcome {
        let (fields, mut outcome) = plan(policy, selected, full_export);
        outcome.rows = records
            .iter()
            .map(|record| self.redact_record(record, &fields))
            .collect();
        outcome
    }

    /// Redact in batches, checking `cancel` between batches.
    ///
    /// Output is identical to [`Redactor::apply`]; batches run in input order
    /// and are concatenated in that same order.
    pub fn apply_with_cancel(
        &self,
        records: &[Value],
        policy: &RedactionPolicy,
        selected: &[String],
        full_export: bool,
        cancel: &CancelFlag,
    ) -> Result<RedactionOutcome, Cancelled> {
        let start = Instant::now();
        let (fields, mut outcome) = plan(policy, selected, full_export);
        outcome.rows.reserve(records.len());

        for (batch_idx, batch) in records.chunks(self.batch_size).enumerate() {
            cancel.check()?;
            outcome
                .rows
                .extend(batch.iter().map(|record| self.redact_record(record, &fields)));
            trace!(batch = batch_idx, rows = batch.len(), "redacted batch");
            std::thread::yield_now();
        }
        cancel.check()?;

        debug!(
            module = %policy.module,
            records = records.len(),
            included = outcome.included_fields.len(),
            redacted = outcome.redacted_fields.len(),
            excluded = outcome.excluded_fields.len(),
            duration_ms = start.elapsed().as_millis(),
            "redaction complete"
        );
        Ok(outcome)
    }

    fn redact_record(&self, record: &Value, fields: &[ActiveField<'_>]) -> ExportRow {
        let mut row = ExportRow::new();
        for field in fields {
            let raw = resolve_path(record, field.key);
            let cell = match field.action {
                RedactionAction::Include => include_value(raw),
                RedactionAction::Hash => hash_value(&self.hasher, raw),
                RedactionAction::Mask => mask_value(raw),
                RedactionAction::Exclude => continue,
            };
            row.insert(field.key.to_string(), cell);
        }
        row
    }
}

/// Resolve the active field set and classify it for bookkeeping.
fn plan<'a>(
    policy: &'a RedactionPolicy,
    selected: &[String],
    full_export: bool,
) -> (Vec<ActiveField<'a>>, RedactionOutcome) {
    let mut outcome = RedactionOutcome::default();
    let fields: Vec<ActiveField<'a>> = policy
        .active_fields(selected)
        .into_iter()
        .map(|field| ActiveField {
            key: field.key.as_str(),
            action: field.effective_action(full_export),
        })
        .collect();

    for field in &fields {
        let key = field.key.to_string();
        match field.action {
            RedactionAction::Exclude => outcome.excluded_fields.push(key),
            action => {
                if action.is_redacting() {
                    outcome.redacted_fields.push(key.clone());
                }
                outcome.included_fields.push(key);
            }
        }
    }
    (fields, outcome)
}
