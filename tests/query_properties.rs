//! Property tests over generated price tables.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rusty_ticker::data::{chart, query};
use rusty_ticker::{parse_table, Dataset};

/// Render a rectangular table: `rows[i][j]` is the price of symbol j on day i.
fn render(symbols: &[String], rows: &[Vec<Option<f64>>]) -> String {
    let start = NaiveDate::from_ymd_opt(2023, 12, 28).unwrap();
    let mut text = format!("date,{}\n", symbols.join(","));
    for (i, row) in rows.iter().enumerate() {
        let date = start + Duration::days(i as i64);
        let cells: Vec<String> = row
            .iter()
            .map(|p| p.map(|v| v.to_string()).unwrap_or_default())
            .collect();
        text.push_str(&format!("{},{}\n", date.format("%Y-%m-%d"), cells.join(",")));
    }
    text
}

fn table() -> impl Strategy<Value = Dataset> {
    (1usize..4, 0usize..40).prop_flat_map(|(n_symbols, n_rows)| {
        let symbols: Vec<String> = (0..n_symbols).map(|i| format!("S{i}")).collect();
        let cell = prop::option::weighted(0.9, -50.0f64..500.0);
        let rows = prop::collection::vec(prop::collection::vec(cell, n_symbols), n_rows);
        rows.prop_map(move |rows| parse_table(&render(&symbols, &rows), b',').unwrap())
    })
}

proptest! {
    #[test]
    fn recent_length_and_tail(ds in table(), n in 0usize..60) {
        let rows = query::recent(&ds, n);
        prop_assert_eq!(rows.len(), n.min(ds.len()));
        if let Some(last) = rows.last() {
            prop_assert_eq!(last, &query::latest(&ds).unwrap());
        }
    }

    #[test]
    fn single_day_range_matches_on_date(ds in table(), day in 0usize..45) {
        let date = (NaiveDate::from_ymd_opt(2023, 12, 28).unwrap() + Duration::days(day as i64))
            .format("%Y-%m-%d")
            .to_string();
        let expected: Vec<_> = query::on_date(&ds, &date).into_iter().collect();
        prop_assert_eq!(query::range(&ds, &date, &date), expected);
    }

    #[test]
    fn history_has_one_point_per_row(ds in table()) {
        for symbol in query::symbols(&ds) {
            prop_assert_eq!(query::history(&ds, &symbol).unwrap().len(), ds.len());
        }
    }

    #[test]
    fn empty_search_returns_universe(ds in table()) {
        prop_assert_eq!(query::search(&ds, ""), query::symbols(&ds));
    }

    #[test]
    fn chart_values_follow_history(ds in table(), days in 0usize..50) {
        for symbol in query::symbols(&ds) {
            let history = query::history(&ds, &symbol).unwrap();
            let series = chart::chart_series(&history, days);
            let tail = &history[history.len().saturating_sub(days)..];

            prop_assert_eq!(series.values.len(), tail.len());
            prop_assert_eq!(series.labels.len(), tail.len());
            for (value, point) in series.values.iter().zip(tail) {
                match point.price.as_ref().and_then(|c| c.as_f64()) {
                    Some(p) => {
                        prop_assert_eq!(*value, p);
                    }
                    None => {
                        prop_assert!(value.is_nan());
                    }
                }
            }
        }
    }

    #[test]
    fn extrema_bound_every_price(ds in table()) {
        for symbol in query::symbols(&ds) {
            let hi = query::highest(&ds, &symbol, query::ExtremaPolicy::ZeroSeeded).unwrap();
            let lo = query::lowest(&ds, &symbol, query::ExtremaPolicy::ZeroSeeded).unwrap();
            for point in query::history(&ds, &symbol).unwrap() {
                if let Some(p) = point.price.and_then(|c| c.as_f64()) {
                    prop_assert!(p <= hi.price);
                    prop_assert!(p >= lo.price);
                }
            }
        }
    }
}
