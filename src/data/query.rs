use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::model::{Cell, Dataset, PriceExtreme, PricePoint, PriceRow, Quote};
use crate::error::{DataError, Result};

// ---------------------------------------------------------------------------
// Extrema seeding
// ---------------------------------------------------------------------------

/// How `highest` / `lowest` seed their running extreme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtremaPolicy {
    /// Running max starts at `0`, running min at `f64::MAX`, with an empty
    /// date. A symbol whose prices are all `<= 0` reports `{"", 0}` as its
    /// high (and a symbol with no numeric price reports the seed as-is).
    #[default]
    ZeroSeeded,
    /// Seed from the first numeric price. A symbol with no numeric price
    /// fails with [`DataError::NoNumericPrices`].
    FirstObserved,
}

/// Trim and uppercase a caller-supplied symbol to match the universe.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}

fn resolve_symbol(ds: &Dataset, symbol: &str) -> Result<String> {
    let symbol = normalize_symbol(symbol);
    if ds.contains_symbol(&symbol) {
        Ok(symbol)
    } else {
        Err(DataError::UnknownSymbol(symbol))
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// The most recent row.
pub fn latest(ds: &Dataset) -> Result<PriceRow> {
    ds.last_row().cloned().ok_or(DataError::EmptyDataset)
}

pub fn symbols(ds: &Dataset) -> Vec<String> {
    ds.symbols().to_vec()
}

/// Every row date in table order.
pub fn dates(ds: &Dataset) -> Vec<String> {
    ds.rows().iter().map(|r| r.date.clone()).collect()
}

/// One point per row for `symbol`, in table order.
pub fn history(ds: &Dataset, symbol: &str) -> Result<Vec<PricePoint>> {
    let symbol = resolve_symbol(ds, symbol)?;
    Ok(ds
        .rows()
        .iter()
        .map(|row| PricePoint {
            date: row.date.clone(),
            price: row.price(&symbol).cloned(),
        })
        .collect())
}

/// Rows with `start <= date <= end`, compared as strings.
///
/// ISO-8601 dates order the same lexicographically and chronologically, so
/// no date parsing happens here. An inverted range is simply empty.
pub fn range(ds: &Dataset, start: &str, end: &str) -> Vec<PriceRow> {
    ds.rows()
        .iter()
        .filter(|row| row.date.as_str() >= start && row.date.as_str() <= end)
        .cloned()
        .collect()
}

/// Exact date match, no nearest-date fallback.
pub fn on_date(ds: &Dataset, date: &str) -> Option<PriceRow> {
    ds.rows().iter().find(|row| row.date == date).cloned()
}

/// The last `min(n, len)` rows, oldest first.
pub fn recent(ds: &Dataset, n: usize) -> Vec<PriceRow> {
    let start = ds.len().saturating_sub(n);
    ds.rows()[start..].to_vec()
}

/// Latest cell for each requested symbol.
///
/// `None` or an empty slice means the whole universe. Symbols without a cell
/// in the latest row (unknown, or empty on that date) are left out rather
/// than reported as errors.
pub fn latest_prices<S: AsRef<str>>(
    ds: &Dataset,
    symbols: Option<&[S]>,
) -> Result<BTreeMap<String, Cell>> {
    let row = ds.last_row().ok_or(DataError::EmptyDataset)?;

    let requested: Vec<String> = match symbols {
        Some(list) if !list.is_empty() => {
            list.iter().map(|s| normalize_symbol(s.as_ref())).collect()
        }
        _ => ds.symbols().to_vec(),
    };

    Ok(requested
        .into_iter()
        .filter_map(|symbol| {
            let cell = row.price(&symbol)?.clone();
            Some((symbol, cell))
        })
        .collect())
}

/// Highest numeric price; ties keep the earliest date.
pub fn highest(ds: &Dataset, symbol: &str, policy: ExtremaPolicy) -> Result<PriceExtreme> {
    scan_extreme(ds, symbol, policy, 0.0, |price, best| price > best)
}

/// Lowest numeric price; ties keep the earliest date.
pub fn lowest(ds: &Dataset, symbol: &str, policy: ExtremaPolicy) -> Result<PriceExtreme> {
    scan_extreme(ds, symbol, policy, f64::MAX, |price, best| price < best)
}

fn scan_extreme(
    ds: &Dataset,
    symbol: &str,
    policy: ExtremaPolicy,
    seed: f64,
    beats: fn(f64, f64) -> bool,
) -> Result<PriceExtreme> {
    let symbol = resolve_symbol(ds, symbol)?;

    let mut best: Option<(f64, &str)> = match policy {
        ExtremaPolicy::ZeroSeeded => Some((seed, "")),
        ExtremaPolicy::FirstObserved => None,
    };

    for row in ds.rows() {
        let Some(price) = row.price(&symbol).and_then(Cell::as_f64) else {
            continue;
        };
        match best {
            Some((current, _)) if !beats(price, current) => {}
            _ => best = Some((price, row.date.as_str())),
        }
    }

    best.map(|(price, date)| PriceExtreme {
        date: date.to_string(),
        price,
    })
    .ok_or(DataError::NoNumericPrices(symbol))
}

/// Symbols containing `query`, case-insensitively, in universe order.
pub fn search(ds: &Dataset, query: &str) -> Vec<String> {
    if query.is_empty() {
        return symbols(ds);
    }
    let needle = query.to_ascii_uppercase();
    ds.symbols()
        .iter()
        .filter(|s| s.contains(&needle))
        .cloned()
        .collect()
}

/// Latest price with change against the previous row.
pub fn quote(ds: &Dataset, symbol: &str) -> Result<Quote> {
    let symbol = resolve_symbol(ds, symbol)?;
    let rows = ds.rows();
    let last = rows.last().ok_or(DataError::EmptyDataset)?;

    let price = last.price(&symbol).and_then(Cell::as_f64);
    let previous_close = rows
        .len()
        .checked_sub(2)
        .and_then(|i| rows[i].price(&symbol))
        .and_then(Cell::as_f64);

    let change = price.zip(previous_close).map(|(p, prev)| p - prev);
    let change_percent = change
        .zip(previous_close)
        .filter(|(_, prev)| *prev != 0.0)
        .map(|(c, prev)| c / prev * 100.0);

    Ok(Quote {
        symbol,
        date: last.date.clone(),
        price,
        previous_close,
        change,
        change_percent,
    })
}
