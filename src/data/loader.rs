use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::model::{Cell, Dataset, PriceRow};
use crate::error::{DataError, Result};

/// Name of the column holding the row date (matched case-insensitively).
pub const DATE_COLUMN: &str = "date";

// ---------------------------------------------------------------------------
// Source trait
// ---------------------------------------------------------------------------

/// Something that can produce the full price table.
///
/// The cache sits above this trait; sources know nothing about caching and
/// are expected to re-read their backing resource on every call.
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Human-readable description used in log lines.
    fn describe(&self) -> String;

    /// Read and parse the whole table.
    async fn load(&self) -> Result<Dataset>;
}

// ---------------------------------------------------------------------------
// CSV file source
// ---------------------------------------------------------------------------

/// Delimited text file on disk.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
    delimiter: u8,
}

impl CsvFileSource {
    /// Comma-delimited file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TableSource for CsvFileSource {
    fn describe(&self) -> String {
        self.path().display().to_string()
    }

    async fn load(&self) -> Result<Dataset> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(DataError::SourceUnavailable {
                    path: self.path.clone(),
                });
            }
            Err(e) => {
                return Err(DataError::Io(format!("{}: {e}", self.path.display())));
            }
        };

        let dataset = parse_table(&text, self.delimiter)?;
        log::info!(
            "Loaded {} rows for {} symbols from {}",
            dataset.len(),
            dataset.symbols().len(),
            self.path.display()
        );
        Ok(dataset)
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse delimited text into a [`Dataset`].
///
/// Layout: a mandatory header row with a `date` column and one column per
/// symbol, then one record per trading date.
///
/// ```text
/// date,AAPL,MSFT
/// 2024-01-02,185.64,370.87
/// 2024-01-03,184.25,
/// ```
///
/// Blank records are skipped. Symbol names are uppercased. Empty cells are
/// left out of the row; non-numeric tokens are kept as [`Cell::Unparsed`].
pub fn parse_table(text: &str, delimiter: u8) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| DataError::ParseFailure(format!("reading header: {e}")))?
        .clone();

    if headers.iter().all(str::is_empty) {
        return Err(DataError::ParseFailure("missing header row".into()));
    }

    let date_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(DATE_COLUMN))
        .ok_or_else(|| DataError::ParseFailure("header has no 'date' column".into()))?;

    // (column index, symbol) for every non-date column.
    let mut columns: Vec<(usize, String)> = Vec::with_capacity(headers.len());
    let mut seen = HashSet::new();
    for (idx, name) in headers.iter().enumerate() {
        if idx == date_idx {
            continue;
        }
        if name.is_empty() {
            return Err(DataError::ParseFailure(format!(
                "empty column name at position {}",
                idx + 1
            )));
        }
        let symbol = name.to_ascii_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(DataError::ParseFailure(format!(
                "duplicate symbol column '{symbol}'"
            )));
        }
        columns.push((idx, symbol));
    }

    let mut rows: Vec<PriceRow> = Vec::new();
    let mut out_of_order = 0usize;

    for result in reader.records() {
        let record = result.map_err(|e| DataError::ParseFailure(e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        if record.iter().all(str::is_empty) {
            continue;
        }
        if record.len() != headers.len() {
            return Err(DataError::ParseFailure(format!(
                "line {line}: expected {} fields, found {}",
                headers.len(),
                record.len()
            )));
        }

        let date = record.get(date_idx).unwrap_or_default();
        if date.is_empty() {
            return Err(DataError::ParseFailure(format!("line {line}: empty date")));
        }

        let mut prices = BTreeMap::new();
        for (idx, symbol) in &columns {
            if let Some(cell) = record.get(*idx).and_then(Cell::parse) {
                prices.insert(symbol.clone(), cell);
            }
        }

        if rows.last().is_some_and(|prev| prev.date.as_str() >= date) {
            out_of_order += 1;
        }

        rows.push(PriceRow {
            date: date.to_string(),
            prices,
        });
    }

    if out_of_order > 0 {
        log::warn!("{out_of_order} rows are not in ascending date order; keeping file order");
    }

    let symbols = columns.into_iter().map(|(_, s)| s).collect();
    Ok(Dataset::new(symbols, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_rows() {
        let text = "Date,abc,Def\n2024-01-01,10,20.5\n2024-01-02,11,21\n";
        let ds = parse_table(text, b',').unwrap();

        assert_eq!(ds.symbols(), ["ABC", "DEF"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows()[0].date, "2024-01-01");
        assert_eq!(ds.rows()[0].price("DEF"), Some(&Cell::Numeric(20.5)));
        assert_eq!(ds.rows()[1].price("ABC"), Some(&Cell::Numeric(11.0)));
    }

    #[test]
    fn date_column_need_not_be_first() {
        let text = "XYZ,date\n5,2024-03-01\n";
        let ds = parse_table(text, b',').unwrap();
        assert_eq!(ds.symbols(), ["XYZ"]);
        assert_eq!(ds.rows()[0].date, "2024-03-01");
        assert_eq!(ds.rows()[0].price("XYZ"), Some(&Cell::Numeric(5.0)));
    }

    #[test]
    fn sparse_and_bad_cells_pass_through() {
        let text = "date,A,B\n2024-01-01,,halted\n";
        let ds = parse_table(text, b',').unwrap();
        let row = &ds.rows()[0];
        assert_eq!(row.price("A"), None);
        assert_eq!(row.price("B"), Some(&Cell::Unparsed("halted".into())));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let text = "date,A\n\n2024-01-01,1\n\n   \n,\n2024-01-02,2\n\n";
        let ds = parse_table(text, b',').unwrap();
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn custom_delimiter() {
        let text = "date;A;B\n2024-01-01;1;2\n";
        let ds = parse_table(text, b';').unwrap();
        assert_eq!(ds.symbols(), ["A", "B"]);
    }

    #[test]
    fn empty_input_is_missing_header() {
        let err = parse_table("", b',').unwrap_err();
        assert_eq!(err, DataError::ParseFailure("missing header row".into()));
    }

    #[test]
    fn missing_date_column_fails() {
        let err = parse_table("day,A\n2024-01-01,1\n", b',').unwrap_err();
        assert!(matches!(err, DataError::ParseFailure(msg) if msg.contains("date")));
    }

    #[test]
    fn ragged_row_fails_with_line_number() {
        let err = parse_table("date,A,B\n2024-01-01,1\n", b',').unwrap_err();
        match err {
            DataError::ParseFailure(msg) => {
                assert!(msg.contains("line 2"), "{msg}");
                assert!(msg.contains("expected 3 fields"), "{msg}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn wrong_delimiter_is_a_parse_failure() {
        // Semicolon file read as comma-delimited: one column named "date;a".
        let err = parse_table("date;A\n2024-01-01;1\n", b',').unwrap_err();
        assert!(matches!(err, DataError::ParseFailure(_)));
    }

    #[test]
    fn duplicate_symbols_fail() {
        let err = parse_table("date,abc,ABC\n2024-01-01,1,2\n", b',').unwrap_err();
        assert!(matches!(err, DataError::ParseFailure(msg) if msg.contains("duplicate")));
    }

    #[test]
    fn header_only_table_is_empty() {
        let ds = parse_table("date,A,B\n", b',').unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.symbols(), ["A", "B"]);
    }

    #[test]
    fn out_of_order_rows_keep_file_order() {
        let ds = parse_table("date,A\n2024-01-02,1\n2024-01-01,2\n", b',').unwrap();
        assert_eq!(ds.rows()[0].date, "2024-01-02");
        assert_eq!(ds.rows()[1].date, "2024-01-01");
    }

    #[tokio::test]
    async fn missing_file_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.csv");
        let err = CsvFileSource::new(&path).load().await.unwrap_err();
        assert_eq!(err, DataError::SourceUnavailable { path });
    }

    #[tokio::test]
    async fn directory_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvFileSource::new(dir.path());
        assert_eq!(source.describe(), dir.path().display().to_string());

        let err = source.load().await.unwrap_err();
        assert!(matches!(err, DataError::Io(msg) if msg.contains(&source.describe())));
    }

    #[tokio::test]
    async fn loads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        std::fs::write(&path, "date|A\n2024-01-01|3\n").unwrap();

        let ds = CsvFileSource::new(&path)
            .with_delimiter(b'|')
            .load()
            .await
            .unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.rows()[0].price("A"), Some(&Cell::Numeric(3.0)));
    }
}
