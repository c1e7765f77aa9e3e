#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use candela::{Candela, ChartDataSource, ColumnarTable, RetryConfig, SeriesKey};
use candela_mock::{DEMO_CAMPAIGN, SERIES_START_MS};

/// One hour in milliseconds.
pub const H: i64 = 3_600_000;

/// Retry policy with millisecond backoff so failing tests stay fast.
pub const FAST_RETRY: RetryConfig = RetryConfig {
    max_retries: 2,
    min_backoff_ms: 1,
    max_backoff_ms: 4,
    factor: 2,
    jitter_percent: 0,
};

/// Timestamp of hourly fixture bar `n`.
pub const fn bar(n: i64) -> i64 {
    SERIES_START_MS + n * H
}

/// Hourly series of the demo campaign.
pub fn hourly_series(asset: &str) -> SeriesKey {
    SeriesKey::new(DEMO_CAMPAIGN, asset, "1h")
}

pub fn aapl_1h() -> SeriesKey {
    hourly_series("AAPL-Stocks")
}

/// Orchestrator over `source` with fast retries and otherwise default settings.
pub fn build_candela(source: Arc<dyn ChartDataSource>) -> Candela {
    Candela::builder()
        .source(source)
        .retry(FAST_RETRY)
        .build()
        .unwrap()
}

/// Close-only hourly table of `n` bars starting at fixture bar `first`.
pub fn hourly_table(first: i64, n: i64) -> ColumnarTable {
    let index: Vec<i64> = (first..first + n).map(bar).collect();
    let close = index.iter().map(|&ts| Some(ts as f64)).collect();
    let mut columns = BTreeMap::new();
    columns.insert("close".to_string(), close);
    ColumnarTable::new(index, columns).unwrap()
}
