//! Runtime configuration: where the price table lives and how to read it.
//!
//! Sources, lowest to highest precedence: built-in defaults, a TOML file,
//! the `RUSTY_TICKER_DATA` environment variable, then CLI flags (applied by
//! the binary).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::chart::DEFAULT_CHART_DAYS;
use crate::data::query::ExtremaPolicy;
use crate::error::ConfigError;

/// Environment variable overriding [`Config::data_path`].
pub const DATA_PATH_ENV: &str = "RUSTY_TICKER_DATA";

/// File name looked up in the documents directory by default.
pub const DEFAULT_FILE_NAME: &str = "stock_prices.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path of the delimited price table.
    pub data_path: PathBuf,
    /// Field delimiter; must be a single ASCII character.
    pub delimiter: char,
    /// Trailing points in a chart series when the caller gives none.
    pub chart_days: usize,
    /// Seeding used by `highest` / `lowest`.
    pub extrema: ExtremaPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            delimiter: ',',
            chart_days: DEFAULT_CHART_DAYS,
            extrema: ExtremaPolicy::default(),
        }
    }
}

impl Config {
    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.delimiter_byte()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Apply `RUSTY_TICKER_DATA` if it is set and non-empty.
    pub fn with_env_overrides(self) -> Self {
        self.with_data_path_override(std::env::var_os(DATA_PATH_ENV).map(PathBuf::from))
    }

    fn with_data_path_override(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) {
            log::debug!("data path overridden to {}", path.display());
            self.data_path = path;
        }
        self
    }

    /// The delimiter as the byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(ConfigError::InvalidDelimiter(self.delimiter))
        }
    }
}

/// `<documents>/stock_prices.csv`, or the working directory when the
/// platform has no documents folder.
pub fn default_data_path() -> PathBuf {
    dirs::document_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_FILE_NAME)
}
