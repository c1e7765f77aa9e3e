//! Translate a chart selection into backend request parameters.
//!
//! Trade padding is expressed in bars rather than milliseconds: the backend
//! owns resampling, so bar counts stay exact across weekends and session gaps.

use std::collections::BTreeMap;

use candela_core::{DataRange, FetchRequest, PaddingConfig, SeriesKey, TradeWindow, bars_between};

/// Request for the entire series, used when no trade is in focus.
#[must_use]
pub fn baseline_params(base: &SeriesKey) -> FetchRequest {
    FetchRequest::for_series(base)
}

/// Request centered on one trade.
///
/// The pivot is always the open time, even for a trade that is still open.
/// `pad_back` covers the trade's duration in bars (rounded up) plus the
/// configured back padding.
#[must_use]
pub fn single_trade_params(
    base: &SeriesKey,
    trade: &TradeWindow,
    padding: &PaddingConfig,
) -> FetchRequest {
    pivoted(base, trade.open, trade.end(), padding)
}

/// Request spanning every trade in `trades`.
///
/// Pivots on the earliest open and pads back to the latest close (an open
/// trade contributes its open time). An empty slice degenerates to
/// [`baseline_params`].
#[must_use]
pub fn multi_trade_params(
    base: &SeriesKey,
    trades: &[TradeWindow],
    padding: &PaddingConfig,
) -> FetchRequest {
    let Some(pivot) = trades.iter().map(|t| t.open).min() else {
        return baseline_params(base);
    };
    let last = trades.iter().map(TradeWindow::end).max().unwrap_or(pivot);
    pivoted(base, pivot, last, padding)
}

/// Request for an explicit window.
#[must_use]
pub fn range_params(base: &SeriesKey, range: DataRange) -> FetchRequest {
    FetchRequest::for_range(base, range)
}

/// Query-string map sent to the backend.
///
/// The asset id travels as `asset`; absent numeric fields are omitted.
#[must_use]
pub fn format_for_transport(params: &FetchRequest) -> BTreeMap<String, String> {
    params.to_query_pairs()
}

fn pivoted(base: &SeriesKey, pivot: i64, last: i64, padding: &PaddingConfig) -> FetchRequest {
    let duration_bars = bars_between(pivot, last, &base.timeframe);
    FetchRequest {
        pivot: Some(pivot),
        pad_front: Some(padding.front_pad_units),
        pad_back: Some(duration_bars.saturating_add(padding.back_pad_units)),
        ..FetchRequest::for_series(base)
    }
}
