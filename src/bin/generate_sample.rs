use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Write a deterministic sample price table for trying out the CLI.
#[derive(Parser)]
#[command(name = "generate_sample")]
struct Args {
    /// Output CSV path.
    #[arg(long, default_value = "stock_prices.csv")]
    output: PathBuf,

    /// Number of trading days (weekends are skipped).
    #[arg(long, default_value_t = 250)]
    days: usize,

    /// RNG seed.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// (symbol, starting price, daily volatility, first listed trading day)
const SYMBOLS: [(&str, f64, f64, usize); 6] = [
    ("AAPL", 185.0, 0.015, 0),
    ("MSFT", 370.0, 0.013, 0),
    ("GOOGL", 140.0, 0.017, 0),
    ("AMZN", 150.0, 0.019, 0),
    ("NVDA", 480.0, 0.030, 0),
    // Listed partway through, so early rows carry empty cells.
    ("ARM", 65.0, 0.035, 40),
];

/// One standard-normal draw (Box-Muller).
fn standard_normal(rng: &mut impl Rng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

fn trading_days(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(count);
    let mut date = start;
    while days.len() < count {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(date);
        }
        date += Duration::days(1);
    }
    days
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);

    let start = NaiveDate::from_ymd_opt(2024, 1, 2).context("invalid start date")?;
    let dates = trading_days(start, args.days);
    let mut prices: Vec<f64> = SYMBOLS.iter().map(|&(_, p, _, _)| p).collect();

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;

    let mut header = vec!["Date".to_string()];
    header.extend(SYMBOLS.iter().map(|&(s, ..)| s.to_string()));
    writer.write_record(&header)?;

    for (day, date) in dates.iter().enumerate() {
        let mut record = vec![date.format("%Y-%m-%d").to_string()];
        for (i, &(_, _, vol, listed)) in SYMBOLS.iter().enumerate() {
            if day < listed {
                record.push(String::new());
                continue;
            }
            // Geometric random walk.
            prices[i] *= (vol * standard_normal(&mut rng)).exp();
            record.push(format!("{:.2}", prices[i]));
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;

    log::info!("wrote {} rows to {}", dates.len(), args.output.display());
    println!(
        "Wrote {} trading days for {} symbols to {}",
        dates.len(),
        SYMBOLS.len(),
        args.output.display()
    );
    Ok(())
}
