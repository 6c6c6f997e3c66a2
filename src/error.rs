use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or querying the price table.
///
/// `Clone` because a single in-flight load hands the same outcome to every
/// caller waiting on it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("price table not found at {}", path.display())]
    SourceUnavailable { path: PathBuf },

    #[error("I/O error reading price table: {0}")]
    Io(String),

    #[error("failed to parse price table: {0}")]
    ParseFailure(String),

    #[error("price table has no rows")]
    EmptyDataset,

    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("no numeric prices recorded for {0}")]
    NoNumericPrices(String),
}

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("delimiter must be a single ASCII character, got {0:?}")]
    InvalidDelimiter(char),
}

pub type Result<T> = std::result::Result<T, DataError>;
