//! Output formatting

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Print a list; tables use one row per item
    pub fn print_rows<T: Serialize + Tabled>(&self, rows: &[T]) {
        match self {
            OutputFormat::Table => {
                if rows.is_empty() {
                    println!("{}", "(none)".dimmed());
                } else {
                    println!("{}", Table::new(rows).with(Style::rounded()));
                }
            }
            _ => self.print(&rows),
        }
    }

    pub fn print<T: Serialize + ?Sized>(&self, data: &T) {
        match self {
            OutputFormat::Yaml => {
                println!("{}", serde_yaml::to_string(data).unwrap_or_default());
            }
            // Structured detail views have no tabular form
            OutputFormat::Json | OutputFormat::Table => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
            }
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(self, OutputFormat::Table)
    }
}

/// Status line for table output; structured formats stay machine-readable
pub fn success(format: OutputFormat, message: impl AsRef<str>) {
    if format.is_table() {
        println!("{} {}", "✓".green(), message.as_ref());
    }
}

pub fn notice(message: impl AsRef<str>) {
    eprintln!("{} {}", "!".yellow(), message.as_ref());
}
