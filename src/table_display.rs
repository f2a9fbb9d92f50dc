use crate::api::Resource;
use crate::state::TableState;
use anyhow::{Context, Result};
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use crossterm::style::Stylize;
use serde_json::Value;
use std::io::Write;
use std::path::Path;

/// Serialize rows to JSON objects so columns can be picked by wire name
pub fn to_values<R: Resource>(rows: &[R]) -> Result<Vec<Value>> {
    rows.iter()
        .map(|row| serde_json::to_value(row).context("Failed to serialize row"))
        .collect()
}

fn cell_text(value: Option<&Value>, null: &str) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Null) => null.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| cell_text(Some(item), null))
            .collect::<Vec<_>>()
            .join(", "),
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

/// Build the table for `rows` using the given column names
pub fn build_table(rows: &[Value], columns: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        columns
            .iter()
            .map(|c| Cell::new(c).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );

    for record in rows {
        if let Some(obj) = record.as_object() {
            let row: Vec<String> = columns
                .iter()
                .map(|field| cell_text(obj.get(*field), "NULL"))
                .collect();
            table.add_row(row);
        }
    }
    table
}

/// "Page 2 of 5 (rows 11-20 of 43)"
pub fn pagination_footer<T, F>(state: &TableState<T, F>) -> String {
    let pages = state.total_pages.max(1);
    match state.row_range() {
        Some((first, last)) => format!(
            "Page {} of {} (rows {}-{} of {})",
            state.page, pages, first, last, state.total_items
        ),
        None => format!("Page {} of {} (no rows)", state.page, pages),
    }
}

/// Print the table's current page with a pagination footer
pub fn display_results<R: Resource>(state: &TableState<R, R::Filters>) -> Result<()> {
    if state.error {
        println!("{}", format!("Failed to load {}.", R::LABEL.to_lowercase()).red());
        return Ok(());
    }
    if state.data.is_empty() {
        println!("{}", "No results found.".yellow());
        return Ok(());
    }

    let rows = to_values(&state.data)?;
    println!("{}", build_table(&rows, R::COLUMNS));
    println!("\n{}", pagination_footer(state).green());
    Ok(())
}

/// Write rows as CSV with a header line
pub fn write_csv<W: Write>(writer: W, rows: &[Value], columns: &[&str]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(columns)?;

    for record in rows {
        if let Some(obj) = record.as_object() {
            let row: Vec<String> = columns
                .iter()
                .map(|field| cell_text(obj.get(*field), ""))
                .collect();
            wtr.write_record(&row)?;
        }
    }

    wtr.flush()?;
    Ok(())
}

pub fn export_to_csv<R: Resource>(rows: &[R], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(file, &to_values(rows)?, R::COLUMNS)?;
    println!(
        "{}",
        format!("{} rows exported to {}", rows.len(), path.display()).green()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::NoFilters;
    use serde_json::json;

    fn rows() -> Vec<Value> {
        vec![
            json!({ "id": 1, "name": "admin", "permissions": ["all"], "description": null }),
            json!({ "id": 2, "name": "cashier, senior", "permissions": [] }),
        ]
    }

    #[test]
    fn test_build_table_picks_columns() {
        let rendered = build_table(&rows(), &["id", "name", "description"]).to_string();
        assert!(rendered.contains("admin"));
        assert!(rendered.contains("NULL"));
        assert!(!rendered.contains("permissions"));
    }

    #[test]
    fn test_write_csv_quotes_and_blanks() {
        let mut out = Vec::new();
        write_csv(&mut out, &rows(), &["id", "name", "permissions", "description"]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id,name,permissions,description");
        assert_eq!(lines[1], "1,admin,all,");
        assert_eq!(lines[2], "2,\"cashier, senior\",,");
    }

    #[test]
    fn test_pagination_footer() {
        let mut state: TableState<u32, NoFilters> = TableState::default();
        state.page = 2;
        state.limit = 10;
        state.total_items = 43;
        state.data = vec![0; 10];
        state.recompute_total_pages();
        assert_eq!(pagination_footer(&state), "Page 2 of 5 (rows 11-20 of 43)");

        state.total_items = 0;
        state.data.clear();
        state.page = 1;
        state.recompute_total_pages();
        assert_eq!(pagination_footer(&state), "Page 1 of 1 (no rows)");
    }
}
