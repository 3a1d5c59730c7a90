//! In-memory tabular dataset loaded from a CSV file.

use crate::error::{Error, Result};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Header row plus data rows, every cell kept as a string.
///
/// All rows have exactly `headers.len()` cells: short records are padded
/// with empty strings and long records are truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|row| normalize_row(row, width))
            .collect();
        Self { headers, rows }
    }

    /// Read a CSV file whose first record is the header row.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        debug!("Reading CSV from {}", path.display());
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect();

        if headers.is_empty() {
            return Err(Error::EmptyInput("CSV has no header row".to_string()));
        }

        let width = headers.len();
        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let row = record.iter().map(|v| v.to_string()).collect();
            rows.push(normalize_row(row, width));
        }

        Ok(Self { headers, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}

fn normalize_row(mut row: Vec<String>, width: usize) -> Vec<String> {
    row.resize(width, String::new());
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_headers_and_rows() {
        let data = "sku,price,stock\nA1,10.5,3\nB2,7,0\n";
        let table = Table::from_reader(data.as_bytes()).unwrap();

        assert_eq!(table.headers, vec!["sku", "price", "stock"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.rows[1], vec!["B2", "7", "0"]);
    }

    #[test]
    fn test_missing_cells_become_empty_strings() {
        let data = "a,b,c\n1,,3\n4\n";
        let table = Table::from_reader(data.as_bytes()).unwrap();

        assert_eq!(table.rows[0], vec!["1", "", "3"]);
        assert_eq!(table.rows[1], vec!["4", "", ""]);
    }

    #[test]
    fn test_long_records_are_truncated() {
        let data = "a,b\n1,2,3,4\n";
        let table = Table::from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.rows[0], vec!["1", "2"]);
    }

    #[test]
    fn test_header_only_file_has_zero_rows() {
        let table = Table::from_reader("a,b\n".as_bytes()).unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn test_empty_file_is_rejected() {
        let err = Table::from_reader("".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::EmptyInput(_)));
    }

    #[test]
    fn test_quoted_fields_keep_commas() {
        let data = "name,note\n\"Smith, J\",\"said \"\"hi\"\"\"\n";
        let table = Table::from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.rows[0], vec!["Smith, J", "said \"hi\""]);
    }

    #[test]
    fn test_new_normalizes_row_width() {
        let table = Table::new(
            vec!["a".into(), "b".into()],
            vec![vec!["1".into()], vec!["1".into(), "2".into(), "3".into()]],
        );
        assert_eq!(table.rows, vec![vec!["1", ""], vec!["1", "2"]]);
    }
}
