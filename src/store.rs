use std::collections::BTreeMap;
use std::sync::Arc;

use crate::cache::DatasetCache;
use crate::config::Config;
use crate::data::chart;
use crate::data::loader::{CsvFileSource, TableSource};
use crate::data::model::{Cell, ChartSeries, Dataset, PriceExtreme, PricePoint, PriceRow, Quote};
use crate::data::query::{self, ExtremaPolicy};
use crate::error::{ConfigError, Result};

// ---------------------------------------------------------------------------
// Price store
// ---------------------------------------------------------------------------

/// Query façade over a [`DatasetCache`].
///
/// Every query fetches the cached table first (loading it on first use)
/// and then runs synchronously over that snapshot. Results are owned
/// copies; nothing handed out aliases the cache.
pub struct PriceStore {
    cache: DatasetCache,
    extrema: ExtremaPolicy,
    chart_days: usize,
}

impl PriceStore {
    pub fn new(source: impl TableSource + 'static) -> Self {
        Self::with_cache(DatasetCache::new(source))
    }

    pub fn with_cache(cache: DatasetCache) -> Self {
        Self {
            cache,
            extrema: ExtremaPolicy::default(),
            chart_days: chart::DEFAULT_CHART_DAYS,
        }
    }

    /// Store reading the CSV file named by `config`.
    pub fn from_config(config: &Config) -> std::result::Result<Self, ConfigError> {
        let source =
            CsvFileSource::new(&config.data_path).with_delimiter(config.delimiter_byte()?);
        Ok(Self::new(source)
            .with_extrema_policy(config.extrema)
            .with_chart_days(config.chart_days))
    }

    pub fn with_extrema_policy(mut self, policy: ExtremaPolicy) -> Self {
        self.extrema = policy;
        self
    }

    pub fn with_chart_days(mut self, days: usize) -> Self {
        self.chart_days = days;
        self
    }

    pub fn cache(&self) -> &DatasetCache {
        &self.cache
    }

    /// The cached table itself.
    pub async fn dataset(&self) -> Result<Arc<Dataset>> {
        self.cache.get().await
    }

    /// Force the next query to re-read the backing file.
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    pub async fn latest(&self) -> Result<PriceRow> {
        query::latest(&*self.cache.get().await?)
    }

    pub async fn symbols(&self) -> Result<Vec<String>> {
        Ok(query::symbols(&*self.cache.get().await?))
    }

    pub async fn dates(&self) -> Result<Vec<String>> {
        Ok(query::dates(&*self.cache.get().await?))
    }

    pub async fn history(&self, symbol: &str) -> Result<Vec<PricePoint>> {
        query::history(&*self.cache.get().await?, symbol)
    }

    pub async fn range(&self, start: &str, end: &str) -> Result<Vec<PriceRow>> {
        Ok(query::range(&*self.cache.get().await?, start, end))
    }

    pub async fn on_date(&self, date: &str) -> Result<Option<PriceRow>> {
        Ok(query::on_date(&*self.cache.get().await?, date))
    }

    pub async fn recent(&self, n: usize) -> Result<Vec<PriceRow>> {
        Ok(query::recent(&*self.cache.get().await?, n))
    }

    /// Latest cell per symbol; `None` means every symbol.
    pub async fn latest_prices<S: AsRef<str>>(
        &self,
        symbols: Option<&[S]>,
    ) -> Result<BTreeMap<String, Cell>> {
        query::latest_prices(&*self.cache.get().await?, symbols)
    }

    pub async fn highest(&self, symbol: &str) -> Result<PriceExtreme> {
        query::highest(&*self.cache.get().await?, symbol, self.extrema)
    }

    pub async fn lowest(&self, symbol: &str) -> Result<PriceExtreme> {
        query::lowest(&*self.cache.get().await?, symbol, self.extrema)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<String>> {
        Ok(query::search(&*self.cache.get().await?, query))
    }

    pub async fn quote(&self, symbol: &str) -> Result<Quote> {
        query::quote(&*self.cache.get().await?, symbol)
    }

    /// Chart series over the configured default window.
    pub async fn chart(&self, symbol: &str) -> Result<ChartSeries> {
        self.chart_series(symbol, self.chart_days).await
    }

    /// Chart series over the last `days` points of `symbol`'s history.
    pub async fn chart_series(&self, symbol: &str, days: usize) -> Result<ChartSeries> {
        let history = self.history(symbol).await?;
        Ok(chart::chart_series(&history, days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn store_is_shareable_across_tasks() {
        assert_send_sync::<PriceStore>();
        assert_send_sync::<DatasetCache>();
    }

    #[test]
    fn from_config_rejects_bad_delimiter() {
        let config = Config {
            delimiter: 'é',
            ..Config::default()
        };
        assert!(matches!(
            PriceStore::from_config(&config),
            Err(ConfigError::InvalidDelimiter('é'))
        ));
    }

    #[tokio::test]
    async fn chart_uses_configured_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        std::fs::write(&path, "date,A\n2024-01-01,1\n2024-01-02,2\n2024-01-03,3\n").unwrap();

        let store = PriceStore::new(CsvFileSource::new(&path)).with_chart_days(2);
        let series = store.chart("a").await.unwrap();
        assert_eq!(series.labels, ["1/2", "1/3"]);
    }
}
