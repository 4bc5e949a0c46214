//! Table and JSON output for host commands.
//!
//! Command results go to stdout; notices that are not part of the result
//! (warnings, errors) go to stderr so piped JSON stays parseable.

use serde::Serialize;
use tabled::{Table, Tabled};

use catalog_core::AppResult;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON array
    Json,
}

/// Render rows in the selected format.
pub fn render_list<T: Serialize + Tabled>(rows: &[T], format: OutputFormat) -> AppResult<String> {
    Ok(match format {
        OutputFormat::Table if rows.is_empty() => "No results found.".to_string(),
        OutputFormat::Table => Table::new(rows).to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(rows)?,
    })
}

/// Print rows in the selected format.
pub fn print_list<T: Serialize + Tabled>(rows: &[T], format: OutputFormat) -> AppResult<()> {
    println!("{}", render_list(rows, format)?);
    Ok(())
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    eprintln!("⚠ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Tabled)]
    struct Row {
        uid: String,
        kind: String,
    }

    fn rows() -> Vec<Row> {
        vec![Row {
            uid: "welcome".into(),
            kind: "General".into(),
        }]
    }

    #[test]
    fn test_table_lists_headers_and_values() {
        let table = render_list(&rows(), OutputFormat::Table).unwrap();
        assert!(table.contains("uid"));
        assert!(table.contains("welcome"));
    }

    #[test]
    fn test_empty_table_has_notice() {
        let table = render_list::<Row>(&[], OutputFormat::Table).unwrap();
        assert_eq!(table, "No results found.");
    }

    #[test]
    fn test_json_is_an_array_of_rows() {
        let json = render_list(&rows(), OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["kind"], "General");
        assert_eq!(render_list::<Row>(&[], OutputFormat::Json).unwrap(), "[]");
    }
}
