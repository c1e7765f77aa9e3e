//! Chart-data fetch orchestration.
//!
//! A load plans a [`FetchRequest`] from the query, serves the cache when it
//! can, and otherwise fetches through the source. Identical requests share one
//! in-flight future, failed fetches are retried with jittered backoff, and a
//! response that arrives after the series' selection changed is discarded.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use candela_cache::CacheOutcome;
use candela_core::{
    CandelaError, ChartDataSource, ColumnarTable, DataRange, FetchRequest, PaddingConfig,
    RetryConfig, SeriesKey, TradeWindow, decode_table,
};
use futures::future::{BoxFuture, FutureExt, Shared, join_all};

use crate::backoff::retry_delay;
use crate::core::Candela;
use crate::planner;

type FetchResult = Result<Arc<ColumnarTable>, CandelaError>;
pub(crate) type InFlight = Shared<BoxFuture<'static, FetchResult>>;

/// What the chart wants to show for one series.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChartQuery {
    /// Series to load.
    pub series: SeriesKey,
    /// Selected trades; empty means no trade focus.
    pub trades: Vec<TradeWindow>,
    /// Ignore the trade selection and load the whole series.
    pub entire_series: bool,
    /// Explicit window requested by the viewport controller.
    pub expansion: Option<DataRange>,
}

impl ChartQuery {
    /// A query for `series` with no trade focus.
    #[must_use]
    pub const fn new(series: SeriesKey) -> Self {
        Self {
            series,
            trades: Vec::new(),
            entire_series: false,
            expansion: None,
        }
    }

    /// Focus on the given trades.
    #[must_use]
    pub fn with_trades(mut self, trades: impl IntoIterator<Item = TradeWindow>) -> Self {
        self.trades = trades.into_iter().collect();
        self
    }

    /// Load the whole series regardless of the trade selection.
    #[must_use]
    pub const fn entire_series(mut self, yes: bool) -> Self {
        self.entire_series = yes;
        self
    }

    /// Request an explicit window, bypassing trade planning.
    #[must_use]
    pub const fn with_expansion(mut self, range: DataRange) -> Self {
        self.expansion = Some(range);
        self
    }

    /// Backend request for this query.
    ///
    /// Priority: expansion window, then entire series (or no trades), then
    /// the padded multi-trade window.
    #[must_use]
    pub fn plan(&self, padding: &PaddingConfig) -> FetchRequest {
        if let Some(range) = self.expansion {
            return planner::range_params(&self.series, range);
        }
        if self.entire_series || self.trades.is_empty() {
            return planner::baseline_params(&self.series);
        }
        planner::multi_trade_params(&self.series, &self.trades, padding)
    }

    /// Identity of the selection this query represents (the expansion window
    /// is not part of it).
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut trades: Vec<_> = self.trades.iter().map(|t| (t.open, t.close)).collect();
        trades.sort_unstable();
        let trades: Vec<String> = trades
            .into_iter()
            .map(|(open, close)| match close {
                Some(c) => format!("{open}-{c}"),
                None => format!("{open}-open"),
            })
            .collect();
        format!(
            "{}|{}|{}",
            self.series,
            if self.entire_series { "all" } else { "focus" },
            trades.join(",")
        )
    }
}

/// Table returned by [`Candela::load`].
#[derive(Debug, Clone)]
pub struct ChartData {
    /// Merged table for the series.
    pub table: Arc<ColumnarTable>,
    /// True when a network request was made to produce it.
    pub from_network: bool,
}

/// Lifecycle stage of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SeriesPhase {
    /// Nothing running.
    #[default]
    Idle,
    /// Deciding whether the cache can answer.
    Planning,
    /// At least one network request is outstanding.
    Fetching,
}

/// Observable state of one series.
#[derive(Debug, Clone, Default)]
pub struct SeriesSnapshot {
    /// Current phase.
    pub phase: SeriesPhase,
    /// Cached table, if any.
    pub data: Option<Arc<ColumnarTable>>,
    /// Error from the most recent failed load; cleared by a successful one.
    pub last_error: Option<CandelaError>,
    /// True only while a real network request is outstanding.
    pub actually_fetching: bool,
}

#[derive(Debug, Default)]
struct SeriesState {
    planning: usize,
    fetching: usize,
    desired: Option<String>,
    last_error: Option<CandelaError>,
}

impl SeriesState {
    const fn phase(&self) -> SeriesPhase {
        if self.fetching > 0 {
            SeriesPhase::Fetching
        } else if self.planning > 0 {
            SeriesPhase::Planning
        } else {
            SeriesPhase::Idle
        }
    }
}

/// Per-series phase counters, desired selection and last error.
#[derive(Debug, Default)]
pub(crate) struct SeriesBook {
    states: Mutex<HashMap<SeriesKey, SeriesState>>,
}

impl SeriesBook {
    fn with<R>(&self, key: &SeriesKey, f: impl FnOnce(&mut SeriesState) -> R) -> R {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        f(states.entry(key.clone()).or_default())
    }

    pub(crate) fn is_fetching(&self, key: &SeriesKey) -> bool {
        self.with(key, |s| s.fetching > 0)
    }
}

/// Keeps a series' phase counters balanced even when a load is cancelled.
struct PhaseGuard<'a> {
    book: &'a SeriesBook,
    key: &'a SeriesKey,
    fetching: bool,
}

impl<'a> PhaseGuard<'a> {
    fn enter(book: &'a SeriesBook, key: &'a SeriesKey) -> Self {
        book.with(key, |s| s.planning += 1);
        Self {
            book,
            key,
            fetching: false,
        }
    }

    fn fetching(&mut self) {
        if !self.fetching {
            self.book.with(self.key, |s| {
                s.planning = s.planning.saturating_sub(1);
                s.fetching += 1;
            });
            self.fetching = true;
        }
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        let fetching = self.fetching;
        self.book.with(self.key, |s| {
            if fetching {
                s.fetching = s.fetching.saturating_sub(1);
            } else {
                s.planning = s.planning.saturating_sub(1);
            }
        });
    }
}

impl Candela {
    /// Load chart data for `query`.
    ///
    /// Behavior and trade-offs:
    /// - Without an expansion window, an existing cache entry answers
    ///   immediately (`from_network == false`) even if it was loaded for a
    ///   different selection.
    /// - With an expansion window, only the sub-ranges the cache lacks are
    ///   requested, one request each.
    /// - Identical requests in flight are shared; retryable failures are
    ///   retried per the retry policy.
    ///
    /// # Errors
    /// Returns the source or decode error after retries are exhausted (the
    /// cache is left untouched), or `Superseded` when the series' selection
    /// changed while the request was in flight.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            target = "candela::fetch",
            skip(self, query),
            fields(series = %query.series, trades = query.trades.len(), expansion = query.expansion.is_some()),
        )
    )]
    pub async fn load(&self, query: &ChartQuery) -> Result<ChartData, CandelaError> {
        let key = &query.series;
        let token = self.series.with(key, |s| {
            if query.expansion.is_none() {
                s.desired = Some(query.fingerprint());
            }
            s.desired.clone()
        });
        let mut phase = PhaseGuard::enter(&self.series, key);

        let result = match query.expansion {
            Some(target) => self.load_expansion(query, target, token.as_deref(), &mut phase).await,
            None => self.load_selection(query, token.as_deref(), &mut phase).await,
        };

        self.series.with(key, |s| match &result {
            Ok(_) => s.last_error = None,
            Err(CandelaError::Superseded { .. }) => {}
            Err(e) => s.last_error = Some(e.clone()),
        });
        result
    }

    /// Observable state of `series`.
    pub async fn snapshot(&self, series: &SeriesKey) -> SeriesSnapshot {
        let (phase, last_error, actually_fetching) =
            self.series
                .with(series, |s| (s.phase(), s.last_error.clone(), s.fetching > 0));
        SeriesSnapshot {
            phase,
            data: self.current(series).await,
            last_error,
            actually_fetching,
        }
    }

    async fn load_selection(
        &self,
        query: &ChartQuery,
        token: Option<&str>,
        phase: &mut PhaseGuard<'_>,
    ) -> Result<ChartData, CandelaError> {
        let request = query.plan(&self.cfg.padding);
        {
            let mut cache = self.cache.lock().await;
            if !cache.needs_fetch(&request) {
                if let Some(table) = cache.get_cached_data(&request) {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(target: "candela::fetch", rows = table.len(), "served from cache");
                    return Ok(ChartData {
                        table,
                        from_network: false,
                    });
                }
            }
        }

        phase.fetching();
        let fetched = self.fetch_shared(request.clone()).await?;
        self.ensure_desired(&query.series, token)?;
        Ok(ChartData {
            table: self.store(&request, fetched).await,
            from_network: true,
        })
    }

    async fn load_expansion(
        &self,
        query: &ChartQuery,
        target: DataRange,
        token: Option<&str>,
        phase: &mut PhaseGuard<'_>,
    ) -> Result<ChartData, CandelaError> {
        let probe = planner::range_params(&query.series, target);
        let missing = {
            let mut cache = self.cache.lock().await;
            let missing = cache.needs_range_expansion(&probe, target);
            if missing.is_empty() {
                let table = cache.get_cached_data(&probe).unwrap_or_default();
                return Ok(ChartData {
                    table,
                    from_network: false,
                });
            }
            missing
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(target: "candela::fetch", gaps = missing.len(), "fetching missing sub-ranges");
        phase.fetching();
        let requests: Vec<FetchRequest> = missing
            .into_iter()
            .map(|gap| planner::range_params(&query.series, gap))
            .collect();
        let results = join_all(requests.iter().cloned().map(|r| self.fetch_shared(r))).await;
        self.ensure_desired(&query.series, token)?;

        let mut first_err = None;
        let mut merged = None;
        for (request, result) in requests.iter().zip(results) {
            match result {
                Ok(table) => merged = Some(self.store(request, table).await),
                Err(e) => {
                    first_err.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_err {
            return Err(e);
        }
        Ok(ChartData {
            table: merged.unwrap_or_default(),
            from_network: true,
        })
    }

    fn ensure_desired(&self, key: &SeriesKey, token: Option<&str>) -> Result<(), CandelaError> {
        let current = self.series.with(key, |s| s.desired.clone());
        if current.as_deref() == token {
            Ok(())
        } else {
            #[cfg(feature = "tracing")]
            tracing::debug!(target: "candela::fetch", series = %key, "discarding stale response");
            Err(CandelaError::superseded(key.to_string()))
        }
    }

    /// Join the in-flight fetch for `request`, or start one.
    fn fetch_shared(&self, request: FetchRequest) -> InFlight {
        let dedup = request.dedup_key();
        let mut inflight = self.inflight.lock().expect("mutex poisoned");
        if let Some(existing) = inflight.get(&dedup) {
            #[cfg(feature = "tracing")]
            tracing::debug!(target: "candela::fetch", key = %dedup, "joining in-flight request");
            return existing.clone();
        }

        let source = Arc::clone(&self.source);
        let registry = Arc::clone(&self.inflight);
        let retry = self.cfg.retry;
        let key = dedup.clone();
        let fut = async move {
            let out = fetch_with_retry(source.as_ref(), &request, &retry).await;
            registry.lock().expect("mutex poisoned").remove(&key);
            out
        }
        .boxed()
        .shared();
        inflight.insert(dedup, fut.clone());
        fut
    }

    /// Merge a fetched table into the cache and return the series' view.
    async fn store(&self, request: &FetchRequest, fetched: Arc<ColumnarTable>) -> Arc<ColumnarTable> {
        let mut cache = self.cache.lock().await;
        match cache.cache_data(request, &fetched) {
            CacheOutcome::Stored { .. } => cache
                .entry(&request.series_key())
                .map_or(fetched, |e| Arc::clone(e.data())),
            CacheOutcome::Ignored => cache.get_cached_data(request).unwrap_or(fetched),
            CacheOutcome::Rejected { .. } => fetched,
        }
    }
}

async fn fetch_with_retry(
    source: &dyn ChartDataSource,
    request: &FetchRequest,
    retry: &RetryConfig,
) -> FetchResult {
    let mut attempt = 0;
    loop {
        let outcome = match source.chart_data(request).await {
            Ok(bytes) => decode_table(&bytes).map(Arc::new),
            Err(e) => Err(e),
        };
        match outcome {
            Err(e) if e.is_retryable() && attempt < retry.max_retries => {
                let wait = retry_delay(retry, attempt);
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    target: "candela::fetch",
                    source = source.name(),
                    attempt = attempt + 1,
                    wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                    error = %e,
                    "chart data fetch failed; retrying"
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}
