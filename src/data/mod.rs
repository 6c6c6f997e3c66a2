/// Data layer: core types, loading, queries and chart shaping.
///
/// Architecture:
/// ```text
///  stock_prices.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<PriceRow>, symbol universe
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐     ┌──────────┐
///   │  query    │ ──▶ │  chart    │  history → (labels, values)
///   └──────────┘     └──────────┘
/// ```

pub mod chart;
pub mod loader;
pub mod model;
pub mod query;
