use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Cell – a single price cell
// ---------------------------------------------------------------------------

/// One cell of a symbol column.
///
/// Cells that parse as a finite number become `Numeric`; anything else is
/// kept verbatim as `Unparsed` so callers decide what a bad token means.
/// Empty cells never become a `Cell`, they are simply absent from the row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Numeric(f64),
    Unparsed(String),
}

impl Cell {
    /// Parse a raw (already trimmed) token. Returns `None` for an empty token.
    pub fn parse(token: &str) -> Option<Cell> {
        if token.is_empty() {
            return None;
        }
        match token.parse::<f64>() {
            Ok(v) if v.is_finite() => Some(Cell::Numeric(v)),
            _ => Some(Cell::Unparsed(token.to_string())),
        }
    }

    /// The numeric value, if this cell holds one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Numeric(v) => Some(*v),
            Cell::Unparsed(_) => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Numeric(v) => write!(f, "{v}"),
            Cell::Unparsed(s) => write!(f, "{s:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// PriceRow – one trading date
// ---------------------------------------------------------------------------

/// Cross-sectional price snapshot for a single date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRow {
    /// ISO-8601 date (`YYYY-MM-DD`) kept as text; sorts chronologically.
    pub date: String,
    /// Uppercase symbol → cell. Symbols with an empty cell are absent.
    pub prices: BTreeMap<String, Cell>,
}

impl PriceRow {
    pub fn price(&self, symbol: &str) -> Option<&Cell> {
        self.prices.get(symbol)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The parsed price table.
///
/// Rows stay in file order (ascending date for a well-formed file). The
/// symbol universe is the header's symbol columns, in header order. There is
/// no mutating API; the cache hands it out behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    rows: Vec<PriceRow>,
    symbols: Vec<String>,
}

impl Dataset {
    pub fn new(symbols: Vec<String>, rows: Vec<PriceRow>) -> Self {
        Dataset { rows, symbols }
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    /// Symbol universe in header order.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn contains_symbol(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last_row(&self) -> Option<&PriceRow> {
        self.rows.last()
    }
}

// ---------------------------------------------------------------------------
// Query results
// ---------------------------------------------------------------------------

/// One entry of a symbol's price history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: String,
    pub price: Option<Cell>,
}

/// Highest or lowest price of a symbol and the date it was first seen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceExtreme {
    pub date: String,
    pub price: f64,
}

/// Labels and values ready to hand to a line chart.
///
/// Labels are display strings (`month/day`), not parseable dates.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    /// `NaN` where the history had no numeric price.
    pub values: Vec<f64>,
}

/// Latest price of a symbol with its change against the previous row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub symbol: String,
    pub date: String,
    pub price: Option<f64>,
    pub previous_close: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
}
