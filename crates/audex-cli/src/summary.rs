use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use audex_core::PolicyRegistry;
use audex_model::{ExportMetadata, ExportPayload, ExportResult, RedactionAction, RedactionPolicy};

pub fn print_export_result(result: &ExportResult, out_dir: &Path) {
    match result {
        ExportResult::Success { filename, metadata } => {
            println!("Written: {}", out_dir.join(filename).display());
            println!("{}", metadata_table(metadata));
        }
        ExportResult::Cancelled { reason } => eprintln!("cancelled: {reason}"),
        ExportResult::Error { message } => eprintln!("error: {message}"),
    }
}

pub fn print_preview(payload: &ExportPayload, limit: usize) {
    let mut table = Table::new();
    table.set_header(
        payload
            .columns
            .iter()
            .map(|column| header_cell(&column.label))
            .collect::<Vec<_>>(),
    );
    apply_table_style(&mut table);
    for row in payload.rows.iter().take(limit) {
        table.add_row(
            payload
                .columns
                .iter()
                .map(|column| match row.get(&column.key) {
                    Some(value) if !value.is_empty() => Cell::new(value.display_text()),
                    _ => dim_cell("-"),
                })
                .collect::<Vec<_>>(),
        );
    }
    println!("{table}");
    let shown = payload.rows.len().min(limit);
    if shown < payload.rows.len() {
        println!("Showing {shown} of {} rows", payload.rows.len());
    }
    println!("{}", metadata_table(&payload.metadata));
}

pub fn print_policies(registry: &PolicyRegistry) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Module"),
        header_cell("Version"),
        header_cell("Fields"),
        header_cell("Redacted"),
        header_cell("Confirmation"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);
    for policy in registry.iter() {
        let redacted = policy
            .fields
            .iter()
            .filter(|field| field.action != RedactionAction::Include)
            .count();
        table.add_row(vec![
            Cell::new(&policy.module)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(policy.version),
            Cell::new(policy.fields.len()),
            count_cell(redacted, Color::Yellow),
            flag_cell(policy.requires_full_export_confirmation),
        ]);
    }
    println!("{table}");
}

pub fn print_policy_fields(policy: &RedactionPolicy) {
    println!("Module: {} (version {})", policy.module, policy.version);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Key"),
        header_cell("Label"),
        header_cell("Action"),
        header_cell("Overridable"),
        header_cell("Default"),
        header_cell("Category"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    align_column(&mut table, 3, CellAlignment::Center);
    align_column(&mut table, 4, CellAlignment::Center);
    for field in &policy.fields {
        table.add_row(vec![
            Cell::new(&field.key),
            Cell::new(&field.label),
            action_cell(field.action),
            flag_cell(field.overridable),
            flag_cell(field.default_selected),
            Cell::new(&field.category),
        ]);
    }
    println!("{table}");
}

fn metadata_table(metadata: &ExportMetadata) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Property"), header_cell("Value")]);
    apply_table_style(&mut table);
    for (property, value) in metadata.audit_entries() {
        let value = if value.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(value)
        };
        table.add_row(vec![Cell::new(property), value]);
    }
    table
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn action_cell(action: RedactionAction) -> Cell {
    let color = match action {
        RedactionAction::Include => Color::Green,
        RedactionAction::Hash => Color::Cyan,
        RedactionAction::Mask => Color::Yellow,
        RedactionAction::Exclude => Color::Red,
    };
    Cell::new(action.as_str()).fg(color)
}

fn flag_cell(value: bool) -> Cell {
    if value {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        dim_cell("-")
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
