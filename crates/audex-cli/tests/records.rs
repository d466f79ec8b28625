use std::fs;

use audex_cli::records::load_records;
use audex_core::{Exporter, MemorySink, PolicyRegistry};
use audex_model::{CellValue, ExportConfig, ExportFormat};

const CATALOG: &str = r#"
[[policy]]
module = "members"

[[policy.fields]]
key = "id"
label = "ID"
action = "hash"

[[policy.fields]]
key = "contact.email"
label = "Email"
action = "mask"

[[policy.fields]]
key = "age"
label = "Age"
action = "include"
"#;

#[test]
fn csv_and_json_records_redact_the_same_way() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("members.csv");
    let json_path = dir.path().join("members.json");
    fs::write(&csv_path, "id,contact.email,age\nm-1,ann@example.com,42\n").unwrap();
    fs::write(
        &json_path,
        r#"[{"id": "m-1", "contact": {"email": "ann@example.com"}, "age": 42}]"#,
    )
    .unwrap();

    let from_csv = load_records(&csv_path).unwrap();
    let from_json = load_records(&json_path).unwrap();
    assert_eq!(from_csv, from_json);

    let exporter = Exporter::new(PolicyRegistry::from_toml_str(CATALOG).unwrap());
    let config = ExportConfig::new(
        ExportFormat::Pdf,
        "members",
        ["id", "contact.email", "age"].map(String::from).to_vec(),
    );
    let payload = exporter.preview(&from_csv, &config, "cli-user").unwrap();
    assert_eq!(payload.rows[0]["contact.email"], CellValue::text("a********m"));
    assert_eq!(payload.rows[0]["age"], CellValue::Number(42.0));
    assert_ne!(payload.rows[0]["id"], CellValue::text("m-1"));
}

#[test]
fn export_writes_through_sink() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("members.json");
    fs::write(&path, r#"[{"id": "m-1", "age": 30}, {"id": "m-2"}]"#).unwrap();
    let records = load_records(&path).unwrap();

    let sink = MemorySink::new();
    let exporter =
        Exporter::new(PolicyRegistry::from_toml_str(CATALOG).unwrap()).with_sink(sink.clone());
    let config = ExportConfig::new(
        ExportFormat::Xlsx,
        "members",
        ["id", "age"].map(String::from).to_vec(),
    );
    let result = exporter.export(&records, &config, "cli-user", None, None);
    assert!(result.is_success(), "{result:?}");
    assert_eq!(result.metadata().map(|m| m.record_count), Some(2));
    assert_eq!(sink.len(), 1);
}

#[test]
fn large_csv_integers_pass_through_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("members.csv");
    fs::write(&path, "id,age\nm-1,9007199254740993\nm-2,17\n").unwrap();
    let records = load_records(&path).unwrap();

    let exporter = Exporter::new(PolicyRegistry::from_toml_str(CATALOG).unwrap());
    let config = ExportConfig::new(
        ExportFormat::Xlsx,
        "members",
        ["id", "age"].map(String::from).to_vec(),
    );
    let payload = exporter.preview(&records, &config, "cli-user").unwrap();
    assert_eq!(payload.rows[0]["age"], CellValue::text("9007199254740993"));
    assert_eq!(payload.rows[1]["age"], CellValue::Number(17.0));
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_records(&dir.path().join("absent.json")).unwrap_err();
    assert!(format!("{err:#}").contains("absent.json"));
}
