//! Rendering command results as tables, JSON, YAML or plain records

use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
    /// `Header: value` lines, one record per row
    Plain,
}

impl OutputFormat {
    /// Whether decorations such as status lines and totals should be printed
    pub fn is_human(self) -> bool {
        matches!(self, OutputFormat::Table | OutputFormat::Plain)
    }
}

/// A result row with fixed columns
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

fn table<T: TableDisplay>(items: &[T]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(T::headers());
    for item in items {
        table.add_row(item.row());
    }
    table
}

fn plain_record<T: TableDisplay>(item: &T) -> String {
    T::headers()
        .into_iter()
        .zip(item.row())
        .map(|(header, value)| format!("{}: {}", header, value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render rows in the requested format
pub fn format_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) -> String {
    if items.is_empty() && format.is_human() {
        return "No results.".to_string();
    }
    match format {
        OutputFormat::Table => table(items).to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(items).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(items)
            .unwrap_or_default()
            .trim_end()
            .to_string(),
        OutputFormat::Plain => items
            .iter()
            .map(plain_record)
            .collect::<Vec<_>>()
            .join("\n---\n"),
    }
}

pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) {
    println!("{}", format_list(items, format));
}

/// Print any serializable value as YAML when asked, JSON otherwise
pub fn print_value<T: Serialize>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value).unwrap_or_default()),
        _ => println!("{}", serde_json::to_string_pretty(value).unwrap_or_default()),
    }
}

/// A one-line note; wrapped in an object for JSON consumers
pub fn format_message(message: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::json!({ "message": message }).to_string(),
        _ => message.to_string(),
    }
}

pub fn print_message(message: &str, format: OutputFormat) {
    println!("{}", format_message(message, format));
}

fn status_line(glyph: ColoredString, message: &str) -> String {
    format!("{} {}", glyph.bold(), message)
}

pub fn print_success(message: &str) {
    println!("{}", status_line("✓".green(), message));
}

pub fn print_error(message: &str) {
    eprintln!("{}", status_line("✗".red(), message));
}

pub fn print_warning(message: &str) {
    println!("{}", status_line("!".yellow(), message));
}

/// Format a USD amount for tables
pub fn usd(amount: f64) -> String {
    format!("${:.4}", amount)
}

/// Format a [0, 1] ratio as a percentage
pub fn percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        test: &'static str,
        cost: f64,
    }

    impl TableDisplay for Row {
        fn headers() -> Vec<&'static str> {
            vec!["Test", "Cost"]
        }

        fn row(&self) -> Vec<String> {
            vec![self.test.to_string(), usd(self.cost)]
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { test: "login", cost: 0.0 },
            Row { test: "checkout", cost: 0.0035 },
        ]
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(usd(0.0035), "$0.0035");
        assert_eq!(percent(0.6), "60.0%");
        assert_eq!(percent(1.0), "100.0%");
    }

    #[test]
    fn test_plain_records_are_separated() {
        assert_eq!(
            format_list(&rows(), OutputFormat::Plain),
            "Test: login\nCost: $0.0000\n---\nTest: checkout\nCost: $0.0035"
        );
    }

    #[test]
    fn test_table_has_headers_and_rows() {
        let table = format_list(&rows(), OutputFormat::Table);
        assert!(table.contains("Test"));
        assert!(table.contains("checkout"));
        assert!(table.contains("$0.0035"));
    }

    #[test]
    fn test_empty_lists() {
        let empty: Vec<Row> = Vec::new();
        assert_eq!(format_list(&empty, OutputFormat::Json), "[]");
        assert_eq!(format_list(&empty, OutputFormat::Yaml), "[]");
        assert_eq!(format_list(&empty, OutputFormat::Table), "No results.");
    }

    #[test]
    fn test_machine_formats_keep_raw_values() {
        let json: serde_json::Value =
            serde_json::from_str(&format_list(&rows(), OutputFormat::Json)).unwrap();
        assert_eq!(json[1]["cost"], 0.0035);
        assert_eq!(
            format_message("done", OutputFormat::Json),
            r#"{"message":"done"}"#
        );
        assert_eq!(format_message("done", OutputFormat::Plain), "done");
    }
}
