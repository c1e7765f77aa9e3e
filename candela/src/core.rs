use std::collections::HashMap;
use std::sync::Arc;

use candela_cache::RangeCache;
use candela_core::{
    CacheConfig, CacheStats, CandelaConfig, CandelaError, ChartDataSource, ColumnarTable,
    DataRange, PaddingConfig, RetryConfig, SeriesKey, ViewportConfig,
};
use tokio::sync::Mutex;

use crate::fetch::{InFlight, SeriesBook};
use crate::viewport::ViewportController;

/// Orchestrator that serves chart data from the range cache and fetches
/// what is missing from a [`ChartDataSource`].
pub struct Candela {
    pub(crate) source: Arc<dyn ChartDataSource>,
    pub(crate) cfg: CandelaConfig,
    pub(crate) cache: Mutex<RangeCache>,
    pub(crate) inflight: Arc<std::sync::Mutex<HashMap<String, InFlight>>>,
    pub(crate) series: SeriesBook,
}

/// Builder for constructing a `Candela` orchestrator with custom configuration.
pub struct CandelaBuilder {
    source: Option<Arc<dyn ChartDataSource>>,
    cfg: CandelaConfig,
}

impl Default for CandelaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CandelaBuilder {
    /// Create a new builder with default configuration.
    ///
    /// Behavior and trade-offs:
    /// - Starts without a source; one must be set via [`CandelaBuilder::source`].
    /// - Defaults: 50 MiB / 10 series cache budget, `STANDARD` padding, two
    ///   retries with jittered exponential backoff, half-span prefetch margin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: None,
            cfg: CandelaConfig::default(),
        }
    }

    /// Set the backend chart data source.
    #[must_use]
    pub fn source(mut self, source: Arc<dyn ChartDataSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub const fn config(mut self, cfg: CandelaConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Set the range cache budgets.
    ///
    /// Behavior and trade-offs:
    /// - A larger byte budget keeps more history per series at the cost of memory.
    /// - `max_entries` bounds how many series hold data; inserting a new series
    ///   at the limit evicts the least recently used one first. Series bounds
    ///   from campaign metadata are kept regardless.
    #[must_use]
    pub const fn cache(mut self, cfg: CacheConfig) -> Self {
        self.cfg.cache = cfg;
        self
    }

    /// Set the bar padding applied around selected trades.
    ///
    /// Behavior and trade-offs:
    /// - More padding shows more context per selection but enlarges payloads.
    #[must_use]
    pub const fn padding(mut self, padding: PaddingConfig) -> Self {
        self.cfg.padding = padding;
        self
    }

    /// Set the retry policy for chart-data fetches.
    ///
    /// Behavior and trade-offs:
    /// - Only transport failures, 5xx and 429 responses are retried.
    /// - Higher jitter spreads out retries from many viewers at the cost of
    ///   less predictable latency.
    #[must_use]
    pub const fn retry(mut self, retry: RetryConfig) -> Self {
        self.cfg.retry = retry;
        self
    }

    /// Set the viewport prefetch tunables.
    ///
    /// Behavior and trade-offs:
    /// - A larger `prefetch_ratio` starts expanding earlier; a larger
    ///   `expansion_factor` fetches wider windows per expansion.
    #[must_use]
    pub const fn viewport(mut self, viewport: ViewportConfig) -> Self {
        self.cfg.viewport = viewport;
        self
    }

    /// Build the `Candela` orchestrator.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no source was set or the configuration is
    /// inconsistent (empty entry budget, floor above ceiling, negative or
    /// non-finite viewport tunables).
    pub fn build(self) -> Result<Candela, CandelaError> {
        let Some(source) = self.source else {
            return Err(CandelaError::InvalidArg(
                "no source registered; set one via source(...)".to_string(),
            ));
        };

        let cache = &self.cfg.cache;
        if cache.max_entries == 0 {
            return Err(CandelaError::InvalidArg(
                "cache.max_entries must be at least 1".to_string(),
            ));
        }
        if cache.min_entries > cache.max_entries {
            return Err(CandelaError::InvalidArg(format!(
                "cache.min_entries ({}) exceeds cache.max_entries ({})",
                cache.min_entries, cache.max_entries
            )));
        }
        let vp = &self.cfg.viewport;
        for (name, v) in [
            ("prefetch_ratio", vp.prefetch_ratio),
            ("expansion_factor", vp.expansion_factor),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(CandelaError::InvalidArg(format!(
                    "viewport.{name} must be a finite, non-negative number"
                )));
            }
        }

        Ok(Candela {
            source,
            cache: Mutex::new(RangeCache::new(self.cfg.cache)),
            cfg: self.cfg,
            inflight: Arc::new(std::sync::Mutex::new(HashMap::new())),
            series: SeriesBook::default(),
        })
    }
}

impl Candela {
    /// Start building a new `Candela` instance.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    ///
    /// let candela = candela::Candela::builder()
    ///     .source(Arc::new(HttpSource::builder("http://localhost:9000").build()?))
    ///     .padding(candela::PaddingConfig::CONSERVATIVE)
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn builder() -> CandelaBuilder {
        CandelaBuilder::new()
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &CandelaConfig {
        &self.cfg
    }

    /// Name of the configured source.
    #[must_use]
    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// A fresh viewport controller using this instance's tunables.
    #[must_use]
    pub const fn viewport_controller(&self) -> ViewportController {
        ViewportController::new(self.cfg.viewport)
    }

    /// Merged table currently cached for `series`, without refreshing recency.
    pub async fn current(&self, series: &SeriesKey) -> Option<Arc<ColumnarTable>> {
        let cache = self.cache.lock().await;
        cache
            .entry(series)
            .filter(|e| !e.loaded_ranges().is_empty())
            .map(|e| Arc::clone(e.data()))
    }

    /// Loaded spans for `series` (empty when nothing is cached).
    pub async fn loaded_ranges(&self, series: &SeriesKey) -> Vec<DataRange> {
        let cache = self.cache.lock().await;
        cache
            .entry(series)
            .map(|e| e.loaded_ranges().to_vec())
            .unwrap_or_default()
    }

    /// Summary counters of the range cache.
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.lock().await.stats()
    }

    /// Drop every cached series.
    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear_cache();
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "candela::cache", "cache cleared");
    }

    /// Drop every cached series of one campaign.
    pub async fn clear_strategy_cache(&self, campaign_id: &str) {
        self.cache.lock().await.clear_strategy_cache(campaign_id);
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "candela::cache", campaign = campaign_id, "campaign cache cleared");
    }
}
