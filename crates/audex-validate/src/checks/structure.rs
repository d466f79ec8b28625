//! Column and row shape checks.

use std::collections::BTreeSet;

use audex_model::{ColumnDef, ExportRow};

use crate::issue::ValidationIssue;

/// Every column needs a non-empty key and label; keys must be unique.
pub fn check_columns(prefix: &str, columns: &[ColumnDef]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut seen = BTreeSet::new();

    for (idx, column) in columns.iter().enumerate() {
        let path = format!("{prefix}[{idx}]");
        if column.key.trim().is_empty() {
            issues.push(ValidationIssue::error(format!("{path}.key"), "column key is required"));
        } else if !seen.insert(column.key.as_str()) {
            issues.push(ValidationIssue::error(
                format!("{path}.key"),
                format!("duplicate column key '{}'", column.key),
            ));
        }
        if column.label.trim().is_empty() {
            issues.push(ValidationIssue::error(
                format!("{path}.label"),
                "column label is required",
            ));
        }
    }

    issues
}

/// Inspect a bounded prefix of `rows` for keys outside the column set.
///
/// Unexpected keys are warnings: upstream record shapes evolve and that
/// should not fail an export.
pub fn check_rows(
    prefix: &str,
    rows: &[ExportRow],
    columns: &[ColumnDef],
    sample: usize,
) -> Vec<ValidationIssue> {
    let known: BTreeSet<&str> = columns.iter().map(|column| column.key.as_str()).collect();
    let mut issues = Vec::new();

    for (idx, row) in rows.iter().take(sample).enumerate() {
        for key in row.keys() {
            if !known.contains(key.as_str()) {
                issues.push(ValidationIssue::warning(
                    format!("{prefix}[{idx}].{key}"),
                    format!("key '{key}' is not a declared column"),
                ));
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use audex_model::CellValue;

    #[test]
    fn unexpected_keys_are_warnings() {
        let columns = vec![ColumnDef::new("a", "A")];
        let mut row = ExportRow::new();
        row.insert("a".to_string(), CellValue::text("1"));
        row.insert("b".to_string(), CellValue::text("2"));
        let issues = check_rows("rows", &[row], &columns, 10);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "rows[0].b");
        assert!(!issues[0].is_error());
    }

    #[test]
    fn sampling_is_bounded() {
        let columns = vec![ColumnDef::new("a", "A")];
        let mut row = ExportRow::new();
        row.insert("zzz".to_string(), CellValue::Null);
        let rows = vec![row; 50];
        assert_eq!(check_rows("rows", &rows, &columns, 5).len(), 5);
    }

    #[test]
    fn malformed_columns_are_errors() {
        let columns = vec![
            ColumnDef::new("", "Blank key"),
            ColumnDef::new("a", ""),
            ColumnDef::new("b", "B"),
            ColumnDef::new("b", "B again"),
        ];
        let issues = check_columns("columns", &columns);
        let paths: Vec<&str> = issues.iter().map(|issue| issue.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["columns[0].key", "columns[1].label", "columns[3].key"]
        );
        assert!(issues.iter().all(ValidationIssue::is_error));
    }
}
