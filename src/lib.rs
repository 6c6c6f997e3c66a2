//! Cached stock price table with analytical queries.
//!
//! The table is a delimited file with one row per trading date and one
//! column per symbol. It is read once into a [`DatasetCache`] and queried
//! through [`PriceStore`]: latest snapshot, date lookups and ranges, symbol
//! history, extrema, search and chart-ready series.

pub mod cache;
pub mod config;
pub mod data;
pub mod error;
pub mod store;

pub use cache::DatasetCache;
pub use config::Config;
pub use data::chart::DEFAULT_CHART_DAYS;
pub use data::loader::{parse_table, CsvFileSource, TableSource};
pub use data::model::{Cell, ChartSeries, Dataset, PriceExtreme, PricePoint, PriceRow, Quote};
pub use data::query::ExtremaPolicy;
pub use error::{ConfigError, DataError};
pub use store::PriceStore;
