use chrono::{Local, NaiveDate};
use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table};

use super::cells;
use crate::cli::OutputFormat;
use crate::controller::{ResultPage, TableView};
use crate::error::{CitizensError, Result};

const HEADERS: [&str; 9] = [
    "Name",
    "National ID",
    "Gender",
    "Birth Date",
    "Birth City",
    "Parents",
    "Address",
    "Registration",
    "Door Number",
];

pub struct Formatter {
    format: OutputFormat,
    today: NaiveDate,
}

impl Formatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            today: Local::now().date_naive(),
        }
    }

    /// Compute ages relative to a fixed day instead of the clock
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Format the table view
    pub fn format_view(&self, view: &TableView) -> Result<String> {
        match self.format {
            OutputFormat::Table => Ok(self.format_view_table(view)),
            OutputFormat::Json => self.format_view_json(&view.result),
            OutputFormat::Markdown => Ok(self.format_view_markdown(&view.result)),
            OutputFormat::Csv => self.format_view_csv(&view.result),
        }
    }

    fn row_cells(&self, page: &ResultPage) -> Vec<[String; 9]> {
        page.rows
            .iter()
            .map(|row| {
                let record = &row.record;
                [
                    cells::full_name(record),
                    cells::national_id(record),
                    cells::gender(record),
                    cells::birth_date(record, self.today),
                    cells::birth_city(record),
                    cells::parents(record),
                    cells::address(record),
                    cells::registration(record),
                    cells::door_number(record),
                ]
            })
            .collect()
    }

    // Table formatting
    fn format_view_table(&self, view: &TableView) -> String {
        let mut result = String::new();

        // Status line: in-progress search, active chips, failures
        let mut status = Vec::new();
        if view.searching {
            status.push("🔍 Searching...".yellow().to_string());
        }
        for chip in &view.chips {
            let text = chip.to_string();
            status.push(if chip.closable {
                text.blue().to_string()
            } else {
                text.green().to_string()
            });
        }
        if !status.is_empty() {
            result.push_str(&format!("\n{}\n", status.join("  ")));
        }
        if let Some(error) = &view.error {
            result.push_str(&format!("\n{} {}\n", "⚠️".red(), error.red()));
        }

        let page = &view.result;
        result.push_str(&format!(
            "\n{} {} | Page: {}/{}{}\n\n",
            "📊".cyan(),
            page.summary().yellow(),
            page.page.to_string().yellow(),
            page.total_pages().max(1).to_string().yellow(),
            if view.loading { " | loading..." } else { "" }
        ));

        if page.rows.is_empty() {
            return result;
        }

        let mut table = Table::new();
        table.set_header(HEADERS.iter().map(|h| Cell::new(h).fg(Color::Cyan)).collect::<Vec<_>>());
        for cells in self.row_cells(page) {
            table.add_row(
                cells
                    .iter()
                    .enumerate()
                    .map(|(idx, text)| {
                        // Name column
                        if idx == 0 {
                            Cell::new(truncate_string(text, 30))
                        } else {
                            Cell::new(text)
                        }
                    })
                    .collect::<Vec<_>>(),
            );
        }
        table.set_content_arrangement(ContentArrangement::Dynamic);

        result.push_str(&table.to_string());
        result
    }

    // JSON formatting
    fn format_view_json(&self, page: &ResultPage) -> Result<String> {
        serde_json::to_string_pretty(page).map_err(CitizensError::Serialization)
    }

    // Markdown formatting
    fn format_view_markdown(&self, page: &ResultPage) -> String {
        let mut result = String::new();

        result.push_str("# Citizens\n\n");
        result.push_str(&format!("- **Total**: {}\n", page.total));
        result.push_str(&format!(
            "- **Page**: {}/{}\n\n",
            page.page,
            page.total_pages().max(1)
        ));

        result.push_str(&format!("| {} |\n", HEADERS.join(" | ")));
        result.push_str(&format!("|{}\n", "------|".repeat(HEADERS.len())));

        for cells in self.row_cells(page) {
            let escaped: Vec<String> = cells
                .iter()
                .map(|c| escape_markdown(&c.replace('\n', "<br>")))
                .collect();
            result.push_str(&format!("| {} |\n", escaped.join(" | ")));
        }

        result
    }

    // CSV formatting
    fn format_view_csv(&self, page: &ResultPage) -> Result<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);

        let mut header = vec!["Key"];
        header.extend(HEADERS);
        wtr.write_record(&header)?;

        for (row, cells) in page.rows.iter().zip(self.row_cells(page)) {
            let mut record = vec![row.key.clone()];
            record.extend(cells.into_iter().map(|c| c.replace('\n', "; ")));
            wtr.write_record(&record)?;
        }

        let data = wtr
            .into_inner()
            .map_err(|e| CitizensError::Other(e.to_string()))?;

        // Add BOM for Excel compatibility
        let mut result = vec![0xEF, 0xBB, 0xBF];
        result.extend_from_slice(&data);

        String::from_utf8(result).map_err(|e| CitizensError::Other(e.to_string()))
    }
}

// Helper functions
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

fn escape_markdown(s: &str) -> String {
    s.replace('|', "\\|")
        .replace('*', "\\*")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{CitizenPayload, CitizenRecord};
    use crate::controller::{FilterController, PageRequest};
    use crate::filter::ImmediateField;

    fn view_with_rows() -> TableView {
        let mut controller = FilterController::new(10);
        let request = controller.set_immediate_filter(ImmediateField::BirthCity, "Ankara");
        let records = vec![
            CitizenRecord {
                uid: Some("c-1".to_string()),
                first: Some("Ali".to_string()),
                last: Some("Yilmaz".to_string()),
                birth_city: Some("Ankara".to_string()),
                date_of_birth: Some("1980-01-15".to_string()),
                ..Default::default()
            },
            CitizenRecord {
                uid: Some("c-2".to_string()),
                first: Some("Ayse | Fatma".to_string()),
                ..Default::default()
            },
        ];
        controller.complete(request.seq, Ok(CitizenPayload::List(records)));
        controller.snapshot()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_format_table() {
        let output = Formatter::new(OutputFormat::Table)
            .with_today(today())
            .format_view(&view_with_rows())
            .unwrap();

        assert!(output.contains("1-2 of 2 citizens"));
        assert!(output.contains("Birth City: Ankara"));
        assert!(output.contains("Ali Yilmaz"));
        assert!(output.contains("15/01/1980 (age 43)"));
    }

    #[test]
    fn test_format_empty_table() {
        let controller = FilterController::new(10);
        let output = Formatter::new(OutputFormat::Table)
            .format_view(&controller.snapshot())
            .unwrap();
        assert!(output.contains("No data found"));
        assert!(!output.contains("National ID"));
    }

    #[test]
    fn test_format_json() {
        let output = Formatter::new(OutputFormat::Json)
            .format_view(&view_with_rows())
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["total"], 2);
        assert_eq!(value["page"], 1);
        assert_eq!(value["rows"][0]["key"], "c-1");
        assert_eq!(value["rows"][0]["first"], "Ali");
    }

    #[test]
    fn test_format_markdown_escapes_pipes() {
        let output = Formatter::new(OutputFormat::Markdown)
            .format_view(&view_with_rows())
            .unwrap();
        assert!(output.starts_with("# Citizens"));
        assert!(output.contains("Ayse \\| Fatma"));
    }

    #[test]
    fn test_format_csv() {
        let output = Formatter::new(OutputFormat::Csv)
            .with_today(today())
            .format_view(&view_with_rows())
            .unwrap();
        assert!(output.starts_with('\u{feff}'));
        assert!(output.contains("Key,Name,National ID"));
        assert!(output.contains("c-1,Ali Yilmaz"));
    }

    #[test]
    fn test_failed_fetch_banner() {
        let mut controller = FilterController::new(10);
        let request = controller.set_page(2, 10).unwrap();
        controller.complete(
            request.seq,
            Err(CitizensError::api_error("502 Bad Gateway", "Request failed with status 502 Bad Gateway", None)),
        );
        assert_eq!(controller.page(), PageRequest { page: 2, page_size: 10 });

        let output = Formatter::new(OutputFormat::Table)
            .format_view(&controller.snapshot())
            .unwrap();
        assert!(output.contains("502 Bad Gateway"));
        assert!(output.contains("No data found"));
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("abcdefghijkl", 8), "abcde...");
    }
}
