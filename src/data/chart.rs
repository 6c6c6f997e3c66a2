use chrono::{Datelike, NaiveDate};

use super::model::{ChartSeries, PricePoint};

/// Default number of trailing points in a chart series.
pub const DEFAULT_CHART_DAYS: usize = 30;

/// Build a chart series from the last `days` points of a history.
///
/// Values are positionally paired with labels; a point without a numeric
/// price contributes `NaN` so gaps stay visible instead of shifting the line.
pub fn chart_series(history: &[PricePoint], days: usize) -> ChartSeries {
    let start = history.len().saturating_sub(days);
    let window = &history[start..];

    ChartSeries {
        labels: window.iter().map(|p| short_label(&p.date)).collect(),
        values: window
            .iter()
            .map(|p| p.price.as_ref().and_then(|c| c.as_f64()).unwrap_or(f64::NAN))
            .collect(),
    }
}

/// `2024-01-03` → `1/3`. Dates that don't parse are returned unchanged.
pub fn short_label(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => format!("{}/{}", d.month(), d.day()),
        Err(_) => date.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Cell;

    fn point(date: &str, price: Option<Cell>) -> PricePoint {
        PricePoint {
            date: date.into(),
            price,
        }
    }

    #[test]
    fn labels_drop_padding_and_year() {
        assert_eq!(short_label("2024-01-03"), "1/3");
        assert_eq!(short_label("2023-12-25"), "12/25");
        assert_eq!(short_label("2024-10-01"), "10/1");
    }

    #[test]
    fn unparseable_date_is_used_verbatim() {
        assert_eq!(short_label("Q1-2024"), "Q1-2024");
    }

    #[test]
    fn keeps_last_n_points() {
        let history = vec![
            point("2024-01-01", Some(Cell::Numeric(1.0))),
            point("2024-01-02", Some(Cell::Numeric(2.0))),
            point("2024-01-03", Some(Cell::Numeric(3.0))),
        ];
        let series = chart_series(&history, 2);
        assert_eq!(series.labels, ["1/2", "1/3"]);
        assert_eq!(series.values, [2.0, 3.0]);
    }

    #[test]
    fn window_larger_than_history_takes_everything() {
        let history = vec![point("2024-02-29", Some(Cell::Numeric(7.0)))];
        let series = chart_series(&history, DEFAULT_CHART_DAYS);
        assert_eq!(series.labels, ["2/29"]);
    }

    #[test]
    fn zero_days_is_empty() {
        let history = vec![point("2024-01-01", Some(Cell::Numeric(1.0)))];
        assert_eq!(chart_series(&history, 0), ChartSeries::default());
    }

    #[test]
    fn gaps_become_nan() {
        let history = vec![
            point("2024-01-01", None),
            point("2024-01-02", Some(Cell::Unparsed("x".into()))),
        ];
        let series = chart_series(&history, 5);
        assert!(series.values.iter().all(|v| v.is_nan()));
    }
}
