pub mod cells;
pub mod formatter;

pub use formatter::Formatter;

use crate::cli::OutputFormat;
use crate::controller::TableView;
use crate::error::Result;

/// Format a table snapshot in the specified format
pub fn format_table_view(view: &TableView, format: OutputFormat) -> Result<String> {
    let formatter = Formatter::new(format);
    formatter.format_view(view)
}

/// One city per line, numbered
pub fn format_cities(cities: &[&str]) -> String {
    cities
        .iter()
        .enumerate()
        .map(|(i, city)| format!("{:>3}. {}", i + 1, city))
        .collect::<Vec<_>>()
        .join("\n")
}
