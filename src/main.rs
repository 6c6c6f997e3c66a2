//! rusty-ticker CLI: query a stock price table from the terminal.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use rusty_ticker::{Cell, Config, PriceRow, PriceStore};

#[derive(Parser)]
#[command(name = "rusty-ticker", about = "Query a cached stock price table")]
struct Cli {
    /// TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Price table path (overrides config and RUSTY_TICKER_DATA).
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Most recent row.
    Latest,
    /// All symbols in the table.
    Symbols,
    /// All dates in the table.
    Dates,
    /// Full price history of a symbol.
    History { symbol: String },
    /// Rows between two dates, inclusive (YYYY-MM-DD).
    Range { start: String, end: String },
    /// Row for an exact date.
    OnDate { date: String },
    /// Last N rows.
    Recent { n: usize },
    /// Latest prices; all symbols when none are given.
    Prices { symbols: Vec<String> },
    /// Highest recorded price of a symbol.
    High { symbol: String },
    /// Lowest recorded price of a symbol.
    Low { symbol: String },
    /// Symbols containing the query text.
    Search {
        #[arg(default_value = "")]
        query: String,
    },
    /// Chart labels and values for the last N days.
    Chart {
        symbol: String,
        /// Defaults to `chart_days` from the config.
        #[arg(long)]
        days: Option<usize>,
    },
    /// Latest price with change against the previous row.
    Quote { symbol: String },
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()).await {
        log::error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    }
    .with_env_overrides();
    if let Some(path) = cli.data {
        config.data_path = path;
    }

    let store = PriceStore::from_config(&config)?;
    let json = cli.json;
    let ctx = || format!("querying {}", config.data_path.display());

    match cli.command {
        Command::Latest => {
            let row = store.latest().await.with_context(ctx)?;
            emit(json, &row, || print_rows(std::slice::from_ref(&row)))
        }
        Command::Symbols => {
            let symbols = store.symbols().await.with_context(ctx)?;
            emit(json, &symbols, || print_lines(&symbols))
        }
        Command::Dates => {
            let dates = store.dates().await.with_context(ctx)?;
            emit(json, &dates, || print_lines(&dates))
        }
        Command::History { symbol } => {
            let history = store.history(&symbol).await.with_context(ctx)?;
            emit(json, &history, || {
                for point in &history {
                    println!("{}\t{}", point.date, fmt_cell(point.price.as_ref()));
                }
            })
        }
        Command::Range { start, end } => {
            let rows = store.range(&start, &end).await.with_context(ctx)?;
            emit(json, &rows, || print_rows(&rows))
        }
        Command::OnDate { date } => {
            let row = store.on_date(&date).await.with_context(ctx)?;
            emit(json, &row, || match &row {
                Some(row) => print_rows(std::slice::from_ref(row)),
                None => println!("no row for {date}"),
            })
        }
        Command::Recent { n } => {
            let rows = store.recent(n).await.with_context(ctx)?;
            emit(json, &rows, || print_rows(&rows))
        }
        Command::Prices { symbols } => {
            let prices = store
                .latest_prices(Some(symbols.as_slice()))
                .await
                .with_context(ctx)?;
            emit(json, &prices, || {
                for (symbol, cell) in &prices {
                    println!("{symbol}\t{cell}");
                }
            })
        }
        Command::High { symbol } => {
            let high = store.highest(&symbol).await.with_context(ctx)?;
            emit(json, &high, || println!("{}\t{}", high.date, high.price))
        }
        Command::Low { symbol } => {
            let low = store.lowest(&symbol).await.with_context(ctx)?;
            emit(json, &low, || println!("{}\t{}", low.date, low.price))
        }
        Command::Search { query } => {
            let symbols = store.search(&query).await.with_context(ctx)?;
            emit(json, &symbols, || print_lines(&symbols))
        }
        Command::Chart { symbol, days } => {
            let series = match days {
                Some(days) => store.chart_series(&symbol, days).await,
                None => store.chart(&symbol).await,
            }
            .with_context(ctx)?;
            emit(json, &series, || {
                for (label, value) in series.labels.iter().zip(&series.values) {
                    println!("{label}\t{value}");
                }
            })
        }
        Command::Quote { symbol } => {
            let quote = store.quote(&symbol).await.with_context(ctx)?;
            emit(json, &quote, || {
                println!(
                    "{} {}  {}  prev {}  chg {}  ({}%)",
                    quote.symbol,
                    quote.date,
                    fmt_opt(quote.price),
                    fmt_opt(quote.previous_close),
                    fmt_opt(quote.change),
                    fmt_opt(quote.change_percent),
                );
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce()) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text();
    }
    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

fn print_rows(rows: &[PriceRow]) {
    for row in rows {
        let cells: Vec<String> = row
            .prices
            .iter()
            .map(|(symbol, cell)| format!("{symbol}={cell}"))
            .collect();
        println!("{}\t{}", row.date, cells.join(" "));
    }
}

fn fmt_cell(cell: Option<&Cell>) -> String {
    cell.map(Cell::to_string).unwrap_or_else(|| "-".into())
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".into())
}
