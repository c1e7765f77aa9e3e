//! Candela serves chart data for trade analytics views from a range-aware cache.
//!
//! Overview
//! - Plans backend requests from a trade selection, padding trades by bar counts.
//! - Keeps one merged table per series together with the exact spans it covers,
//!   so only genuinely missing sub-ranges are fetched.
//! - Deduplicates identical in-flight requests, retries transient failures with
//!   jittered backoff and discards responses for superseded selections.
//! - Drives prefetching from chart viewport changes.
//!
//! Key behaviors and trade-offs
//! - Cache: LRU by last access under byte and entry budgets, no TTL. Caching is
//!   best-effort; an entry that does not fit is simply not stored.
//! - Selection loads: an existing entry answers immediately, even if it was
//!   loaded for a different selection; viewport expansion fills the gaps.
//! - Viewport: zooming in never fetches. Zoom-out and pan fetch well before the
//!   edge (half the cached span by default) to avoid showing empty regions.
//!
//! Examples
//! ```rust,ignore
//! use std::sync::Arc;
//! use candela::{Candela, ChartQuery, SeriesKey, Trigger, ViewportEvent};
//!
//! let candela = Candela::builder()
//!     .source(Arc::new(HttpSource::builder("http://localhost:9000").build()?))
//!     .build()?;
//!
//! candela.load_metadata("campaign-1").await?;
//! let series = SeriesKey::new("campaign-1", "AAPL-Stocks", "1h");
//! let trades: Vec<_> = candela
//!     .round_trips("campaign-1")
//!     .await?
//!     .iter()
//!     .filter(|t| t.asset_id == "AAPL-Stocks")
//!     .filter_map(|t| t.window().ok())
//!     .collect();
//!
//! let data = candela
//!     .load(&ChartQuery::new(series.clone()).with_trades(trades))
//!     .await?;
//!
//! let mut viewport = candela.viewport_controller();
//! let event = ViewportEvent::new(from, to, Trigger::from_chart_trigger("zoom"));
//! candela.on_viewport_change(&series, &mut viewport, &event).await?;
//! ```
//!
//! See `demos/` for runnable end-to-end demonstrations.
#![warn(missing_docs)]

/// Retry delay helpers.
pub mod backoff;
mod campaign;
pub(crate) mod core;
mod fetch;
/// Backend request planning from trade selections.
pub mod planner;
mod viewport;

pub use crate::core::{Candela, CandelaBuilder};
pub use fetch::{ChartData, ChartQuery, SeriesPhase, SeriesSnapshot};
pub use planner::{
    baseline_params, format_for_transport, multi_trade_params, range_params, single_trade_params,
};
pub use viewport::{
    Motion, Trigger, ViewportController, ViewportDecision, ViewportEvent, ViewportOutcome,
    WIDTH_TOLERANCE_MS,
};

pub use candela_cache::{CacheEntry, CacheOutcome, RangeCache};

// Re-export core types for convenience
pub use candela_core::{
    Asset, AssetInfo, CacheConfig, CacheStats, CampaignMetadata, CandelaConfig, CandelaError,
    ChartDataSource, ColumnarTable, DataRange, Endpoint, FetchRequest, PaddingConfig, RetryConfig,
    RoundTrip, RoundTripPage, SeriesKey, TimeframeInfo, Timeframe, TradeResult, TradeSide,
    TradeWindow, ViewportConfig, bars_between, envelope, ms_per_bar,
};
