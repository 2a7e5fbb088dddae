//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                let table = Table::new(items).to_string();
                println!("{}", table);
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string());
            println!("{}", json);
        }
    }
}

/// Print a JSON value, pretty-printed in either format
pub fn print_value(value: &serde_json::Value, format: OutputFormat) {
    match format {
        OutputFormat::Table => match value.as_object() {
            Some(map) => {
                for (key, value) in map {
                    print_kv(key, &value.to_string());
                }
            }
            None => println!("{}", value),
        },
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string());
            println!("{}", json);
        }
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {}", msg);
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{}:", key), value);
}

/// Align whitespace-separated columns of multi-line text.
///
/// Blank lines are dropped; short rows are padded with empty cells.
pub fn pretty_tab(input: &str) -> String {
    let mut builder = Builder::default();
    for line in input.lines().filter(|l| !l.trim().is_empty()) {
        builder.push_record(line.split_whitespace().map(String::from));
    }
    let mut table = builder.build();
    table.with(Style::blank());
    table.to_string()
}
