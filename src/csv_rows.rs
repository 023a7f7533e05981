// src/csv_rows.rs

use std::collections::HashMap;

/// One data row of the source sheet, keyed by header name.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based line in the source document (the header is line 1).
    pub line_number: usize,
    cells: HashMap<String, String>,
}

impl RawRow {
    pub fn new(line_number: usize, cells: HashMap<String, String>) -> Self {
        Self { line_number, cells }
    }

    /// The trimmed cell for `column`, or `""` when the column is missing.
    pub fn get(&self, column: &str) -> &str {
        self.cells.get(column).map(|s| s.trim()).unwrap_or("")
    }
}

/// Parses the whole document. The first non-empty line is the header row.
///
/// Quoted fields may hold the delimiter and `""` escapes a quote. Short rows
/// are padded with empty cells and rows where every cell is empty are dropped.
/// A header with no data rows yields no rows.
pub fn parse_document(text: &str, delimiter: u8) -> Vec<RawRow> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = match reader.headers() {
        Ok(h) => h.clone(),
        Err(e) => {
            log::warn!("Unreadable header row: {e}");
            return Vec::new();
        }
    };

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Skipping unreadable row: {e}");
                continue;
            }
        };
        if record.iter().all(str::is_empty) {
            continue;
        }

        let line_number = record.position().map_or(0, |p| p.line() as usize);
        let mut values: Vec<String> = record.iter().map(str::to_string).collect();
        if values.len() < headers.len() {
            values.resize(headers.len(), String::new());
        }

        let cells = headers
            .iter()
            .map(str::to_string)
            .zip(values)
            .filter(|(h, _)| !h.is_empty())
            .collect();
        rows.push(RawRow::new(line_number, cells));
    }
    rows
}
