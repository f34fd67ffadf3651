//! Output formatting for csiweb (table, json, csv)

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format (default)
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Table
    }
}

/// Context for output rendering
pub struct OutputContext {
    pub format: OutputFormat,
    pub quiet: bool,
}

impl OutputContext {
    pub fn new(format: OutputFormat, no_color: bool, quiet: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { format, quiet }
    }

    /// Print a success message (unless in quiet mode)
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg.green());
        }
    }

    /// Print an info message (unless in quiet mode)
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg);
        }
    }

    /// Print a warning message
    pub fn warn(&self, msg: &str) {
        eprintln!("{}", msg.yellow());
    }

    /// Print an error message
    pub fn error(&self, msg: &str) {
        eprintln!("{}", msg.red());
    }

    /// Print data in the configured format
    pub fn print<T: Tabled + Serialize>(&self, data: &[T]) {
        match self.format {
            OutputFormat::Table => {
                if data.is_empty() {
                    if !self.quiet {
                        println!("No data");
                    }
                } else {
                    let table = Table::new(data).to_string();
                    println!("{}", table);
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(data).unwrap_or_else(|_| "[]".to_string())
                );
            }
            OutputFormat::Csv => {
                print_csv(data);
            }
        }
    }
}

/// Print data as CSV
fn print_csv<T: Serialize>(data: &[T]) {
    if data.is_empty() {
        return;
    }

    let first = serde_json::to_value(&data[0]).unwrap_or_default();
    if let serde_json::Value::Object(map) = &first {
        let headers: Vec<&str> = map.keys().map(|s| s.as_str()).collect();
        println!("{}", headers.join(","));

        for item in data {
            if let Ok(serde_json::Value::Object(row)) = serde_json::to_value(item) {
                let values: Vec<String> = headers
                    .iter()
                    .map(|h| {
                        row.get(*h)
                            .map(|v| match v {
                                serde_json::Value::String(s) => escape_csv(s),
                                other => escape_csv(&other.to_string()),
                            })
                            .unwrap_or_default()
                    })
                    .collect();
                println!("{}", values.join(","));
            }
        }
    }
}

/// Escape a value for CSV output
fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

// =============================================================================
// Display types for various commands
// =============================================================================

/// Table name display for the tables command
#[derive(Debug, Tabled, Serialize)]
pub struct TableRow {
    #[tabled(rename = "Table")]
    pub name: String,
}

/// Field name display for the fields command
#[derive(Debug, Tabled, Serialize)]
pub struct FieldRow {
    #[tabled(rename = "Field")]
    pub name: String,
}

/// Normalized reading display for latest/watch commands
#[derive(Debug, Tabled, Serialize)]
pub struct ReadingRow {
    #[tabled(rename = "Table")]
    pub table: String,
    #[tabled(rename = "Time")]
    pub time: String,
    #[tabled(rename = "Field")]
    pub field: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Units")]
    pub units: String,
}

/// Format a JSON value for display without surrounding quotes
pub fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}
