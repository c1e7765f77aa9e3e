use std::collections::BTreeMap;

use candela_core::{CandelaError, ColumnarTable, DataRange, FetchRequest, ms_per_bar};

/// Timestamp of the first bar of every fixture series (2024-01-01T00:00:00Z).
pub const SERIES_START_MS: i64 = 1_704_067_200_000;
/// Bars in every fixture series.
pub const SERIES_BARS: i64 = 2_000;

/// Absolute extent of the fixture series at `timeframe`.
pub fn bounds(timeframe: &str) -> DataRange {
    let step = ms_per_bar(timeframe);
    DataRange {
        from: SERIES_START_MS,
        to: SERIES_START_MS + (SERIES_BARS - 1) * step,
    }
}

/// Bar indices `[first, last]` selected by `req`, or `None` when empty.
fn selection(req: &FetchRequest) -> Option<(i64, i64)> {
    let step = ms_per_bar(&req.timeframe);
    let last_bar = SERIES_BARS - 1;
    let bar_at = |ts: i64| (ts - SERIES_START_MS).div_euclid(step);
    let to_i64 = |n: u64| i64::try_from(n).unwrap_or(i64::MAX);

    let (first, last) = if let (Some(from), Some(to)) = (req.from_ms, req.to_ms) {
        // first bar at or after `from`, last bar at or before `to`
        let first = (from - SERIES_START_MS + step - 1).div_euclid(step);
        (first, bar_at(to))
    } else if let Some(pivot) = req.pivot {
        let anchor = bar_at(pivot);
        (
            anchor.saturating_sub(to_i64(req.pad_front.unwrap_or(0))),
            anchor.saturating_add(to_i64(req.pad_back.unwrap_or(0))),
        )
    } else {
        (0, last_bar)
    };
    let first = first.max(0);
    let last = last.min(last_bar);
    (first <= last).then_some((first, last))
}

/// Deterministic OHLCV bars for `req`.
///
/// Prices follow a slow wave offset by the asset name, so overlapping windows
/// always agree on the value at a timestamp.
pub fn table_for(req: &FetchRequest) -> Result<ColumnarTable, CandelaError> {
    let step = ms_per_bar(&req.timeframe);
    let Some((first, last)) = selection(req) else {
        return Ok(ColumnarTable::default());
    };
    let seed = req
        .asset_id
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)));
    let base = 50.0 + f64::from(seed % 200);

    let mut index = Vec::new();
    let mut open = Vec::new();
    let mut high = Vec::new();
    let mut low = Vec::new();
    let mut close = Vec::new();
    let mut volume = Vec::new();
    for k in first..=last {
        let x = k as f64;
        let o = base + (x / 17.0).sin() * 5.0;
        let c = base + ((x + 1.0) / 17.0).sin() * 5.0;
        index.push(SERIES_START_MS + k * step);
        open.push(Some(o));
        close.push(Some(c));
        high.push(Some(o.max(c) + 0.5));
        low.push(Some(o.min(c) - 0.5));
        volume.push(Some(1_000.0 + (k % 97) as f64 * 10.0));
    }

    let mut columns = BTreeMap::new();
    columns.insert("open".to_string(), open);
    columns.insert("high".to_string(), high);
    columns.insert("low".to_string(), low);
    columns.insert("close".to_string(), close);
    columns.insert("volume".to_string(), volume);
    ColumnarTable::new(index, columns)
}
