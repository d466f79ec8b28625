use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Value, json};

use audex_core::{DirectorySink, ExportError, Exporter, MemorySink, PolicyRegistry};
use audex_hash::Hasher;
use audex_model::{
    AdapterError, CancelFlag, CellValue, ExportConfig, ExportFormat, ExportPayload,
    ExportProgress, ExportResult, FieldConfig, FormatAdapter, GeneratedFile, RedactionAction,
    RedactionPolicy,
};
use audex_xlsx::read_entries;

fn policies() -> PolicyRegistry {
    let plans = RedactionPolicy::new(
        "plans",
        vec![
            FieldConfig::new("_id", "ID", RedactionAction::Hash),
            FieldConfig::new("name", "Plan", RedactionAction::Include),
            FieldConfig::new("owner.email", "Owner Email", RedactionAction::Mask).overridable(),
            FieldConfig::new("secret", "Secret", RedactionAction::Exclude),
        ],
    )
    .unwrap();
    let members = RedactionPolicy::new(
        "members",
        vec![FieldConfig::new("email", "Email", RedactionAction::Mask).overridable()],
    )
    .unwrap()
    .requiring_confirmation();
    PolicyRegistry::from_policies([plans, members]).unwrap()
}

fn records() -> Vec<Value> {
    vec![
        json!({"_id": "p-1", "name": "Gold", "owner": {"email": "ann@example.com"}, "secret": "x"}),
        json!({"_id": "p-2", "name": "Silver", "owner": {"email": "bo@example.com"}, "secret": "y"}),
    ]
}

fn config(format: ExportFormat) -> ExportConfig {
    ExportConfig::new(
        format,
        "plans",
        ["_id", "name", "owner.email", "secret"].map(String::from).to_vec(),
    )
}

#[derive(Clone, Default)]
struct CountingAdapter {
    calls: Arc<AtomicUsize>,
}

impl FormatAdapter for CountingAdapter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    fn mime_type(&self) -> &'static str {
        "application/octet-stream"
    }

    fn generate(
        &self,
        payload: &ExportPayload,
        cancel: &CancelFlag,
    ) -> Result<GeneratedFile, AdapterError> {
        cancel.check()?;
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(GeneratedFile {
            filename: payload.metadata.filename("bin"),
            mime_type: self.mime_type(),
            bytes: payload.rows.len().to_string().into_bytes(),
        })
    }
}

fn counting_exporter() -> (Exporter, CountingAdapter) {
    let adapter = CountingAdapter::default();
    let mut exporter = Exporter::new(policies());
    exporter.adapters_mut().register(adapter.clone());
    (exporter, adapter)
}

#[test]
fn xlsx_export_is_delivered_and_audited() {
    let sink = MemorySink::new();
    let exporter = Exporter::new(policies()).with_sink(sink.clone());
    let result = exporter.export(&records(), &config(ExportFormat::Xlsx), "user-7", None, None);

    let ExportResult::Success { filename, metadata } = result else {
        panic!("expected success, got {result:?}");
    };
    assert!(filename.starts_with("plans-export-"));
    assert!(filename.ends_with(&format!("-{}.xlsx", metadata.export_id)));
    assert_eq!(metadata.record_count, 2);
    assert_eq!(metadata.user_hash.len(), 16);
    assert_eq!(metadata.user_hash, Hasher::default().short_digest("user-7", 16));
    assert_eq!(metadata.included_fields, vec!["_id", "name", "owner.email"]);
    assert_eq!(metadata.redacted_fields, vec!["_id", "owner.email", "secret"]);
    assert!(!metadata.full_export);
    assert!(metadata.timestamp.ends_with('Z'));

    let files = sink.files();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].filename, filename);
    let entries = read_entries(&files[0].bytes).unwrap();
    assert!(entries.iter().all(|entry| entry.crc_matches()));
    let data = entries
        .iter()
        .find(|entry| entry.name == "xl/worksheets/sheet1.xml")
        .and_then(|entry| entry.text())
        .unwrap();
    assert!(data.contains("Owner Email"));
    assert!(data.contains("a********m"));
    assert!(!data.contains("ann@example.com"));
    assert!(!data.contains("p-1"));
}

#[test]
fn pre_cancelled_flag_never_reaches_the_adapter() {
    let (exporter, adapter) = counting_exporter();
    let mut events: Vec<ExportProgress> = Vec::new();
    let mut on_progress = |p: &ExportProgress| events.push(p.clone());
    let cancel = CancelFlag::cancelled("user navigated away");

    let result = exporter.export(
        &records(),
        &config(ExportFormat::Pdf),
        "u",
        Some(&mut on_progress),
        Some(&cancel),
    );
    assert_eq!(
        result,
        ExportResult::Cancelled {
            reason: "user navigated away".to_string()
        }
    );
    assert_eq!(adapter.calls.load(Ordering::SeqCst), 0);
    assert!(events.is_empty());
}

#[test]
fn cancel_mid_pipeline_stops_before_generate() {
    let (exporter, adapter) = counting_exporter();
    let cancel = CancelFlag::new();
    let trigger = cancel.clone();
    let mut on_progress = |p: &ExportProgress| {
        if p.percent >= 70 {
            trigger.cancel_with_reason("stopped at validation");
        }
    };
    let result = exporter.export(
        &records(),
        &config(ExportFormat::Pdf),
        "u",
        Some(&mut on_progress),
        Some(&cancel),
    );
    assert!(result.is_cancelled());
    assert_eq!(adapter.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn progress_is_monotonic_and_completes() {
    let (exporter, adapter) = counting_exporter();
    let mut percents = Vec::new();
    let mut on_progress = |p: &ExportProgress| percents.push(p.percent);
    let result = exporter.export(
        &records(),
        &config(ExportFormat::Pdf),
        "u",
        Some(&mut on_progress),
        None,
    );
    assert!(result.is_success());
    assert_eq!(adapter.calls.load(Ordering::SeqCst), 1);
    assert_eq!(percents, vec![5, 15, 50, 60, 70, 80, 95, 100]);
}

#[test]
fn unknown_module_is_an_error_result() {
    let exporter = Exporter::new(policies());
    let mut config = config(ExportFormat::Pdf);
    config.module = "invoices".to_string();
    let result = exporter.export(&records(), &config, "u", None, None);
    match result {
        ExportResult::Error { message } => assert!(message.contains("invoices")),
        other => panic!("expected error, got {other:?}"),
    }
}

#[test]
fn validation_errors_are_concatenated() {
    let exporter = Exporter::new(policies());
    let mut config = config(ExportFormat::Xlsx);
    config.selected_fields.clear();
    let result = exporter.export(&records(), &config, "u", None, None);
    match result {
        ExportResult::Error { message } => {
            assert!(message.starts_with("validation failed: "));
            assert!(message.contains("config.selectedFields"));
        }
        other => panic!("expected error, got {other:?}"),
    }
}

#[test]
fn full_export_requires_confirmation_when_policy_demands_it() {
    let exporter = Exporter::new(policies());
    let records = vec![json!({"email": "ann@example.com"})];
    let base = ExportConfig::new(ExportFormat::Pdf, "members", vec!["email".to_string()]);

    let unconfirmed = base.clone().with_full_export(false);
    assert!(matches!(
        exporter.preview(&records, &unconfirmed, "u"),
        Err(ExportError::ConfirmationRequired { .. })
    ));

    let confirmed = base.with_full_export(true);
    let payload = exporter.preview(&records, &confirmed, "u").unwrap();
    assert_eq!(payload.rows[0]["email"], CellValue::text("ann@example.com"));
    assert!(payload.metadata.full_export);
    assert!(payload.metadata.redacted_fields.is_empty());
}

#[test]
fn full_export_without_confirmation_policy_lifts_masks() {
    let exporter = Exporter::new(policies());
    let payload = exporter
        .preview(&records(), &config(ExportFormat::Pdf).with_full_export(false), "u")
        .unwrap();
    assert_eq!(payload.rows[0]["owner.email"], CellValue::text("ann@example.com"));
    assert_ne!(payload.rows[0]["_id"], CellValue::text("p-1"));
    assert!(!payload.rows[0].contains_key("secret"));
}

#[test]
fn preview_is_deterministic_apart_from_identity() {
    let exporter = Exporter::new(policies());
    let config = config(ExportFormat::Xlsx);
    let first = exporter.preview(&records(), &config, "u").unwrap();
    let second = exporter.preview(&records(), &config, "u").unwrap();

    assert_eq!(first.columns, second.columns);
    assert_eq!(first.rows, second.rows);
    assert_eq!(first.metadata.checksum, second.metadata.checksum);
    assert_ne!(first.metadata.export_id, second.metadata.export_id);
    assert_eq!(
        first.metadata.checksum,
        Hasher::default().checksum(&first.rows)
    );
    let keys: Vec<&str> = first.columns.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, vec!["_id", "name", "owner.email"]);
}

#[test]
fn columns_follow_policy_order_not_selection_order() {
    let exporter = Exporter::new(policies());
    let config = ExportConfig::new(
        ExportFormat::Pdf,
        "plans",
        vec!["name".to_string(), "_id".to_string()],
    );
    let payload = exporter.preview(&records(), &config, "u").unwrap();
    let keys: Vec<&str> = payload.columns.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, vec!["_id", "name"]);
}

#[test]
fn empty_record_set_still_exports() {
    let exporter = Exporter::new(policies());
    let result = exporter.export(&[], &config(ExportFormat::Pdf), "u", None, None);
    let metadata = result.metadata().expect("success");
    assert_eq!(metadata.record_count, 0);
    assert_eq!(metadata.checksum, Hasher::default().digest("[]"));
}

#[test]
fn fallback_hasher_keeps_output_shape() {
    let exporter = Exporter::new(policies()).with_hasher(Hasher::fallback());
    let payload = exporter
        .preview(&records(), &config(ExportFormat::Pdf), "u")
        .unwrap();
    assert_eq!(payload.metadata.checksum.len(), 64);
    assert_eq!(payload.metadata.user_hash.len(), 16);
    assert_eq!(payload.metadata.export_id.len(), 36);
}

#[test]
fn directory_sink_receives_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = Exporter::new(policies()).with_sink(DirectorySink::new(dir.path()));
    let output = exporter
        .export_file(&records(), &config(ExportFormat::Pdf), "u", None, None)
        .unwrap();
    let written = std::fs::read(dir.path().join(&output.file.filename)).unwrap();
    assert_eq!(written, output.file.bytes);
    assert!(written.starts_with(b"%PDF-1.4"));
}
