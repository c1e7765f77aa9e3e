use candela_core::{RoundTrip, RoundTripPage, TradeResult, TradeSide};

use super::metadata::DEMO_CAMPAIGN;

/// Trades per fixture page.
pub const PAGE_SIZE: usize = 2;

fn trip(
    index: u64,
    open: &str,
    close: Option<&str>,
    side: TradeSide,
    status: TradeResult,
) -> RoundTrip {
    RoundTrip {
        asset: "AAPL".to_string(),
        asset_id: "AAPL-Stocks".to_string(),
        index,
        open_datetime: open.to_string(),
        close_datetime: close.map(str::to_string),
        side,
        status,
        size: 10.0,
        avg_entry_price: 100.0,
        avg_exit_price: 101.0,
        return_percent: 1.0,
        return_nominal: 10.0,
        stop_loss: None,
        take_profit: None,
    }
}

fn all() -> Vec<RoundTrip> {
    vec![
        trip(
            0,
            "2024-01-03 00:00:00.000000000Z",
            Some("2024-01-04 12:00:00.000000000Z"),
            TradeSide::Long,
            TradeResult::Win,
        ),
        trip(
            1,
            "2024-01-10 09:00:00.000000000Z",
            Some("2024-01-10 15:00:00.000000000Z"),
            TradeSide::Short,
            TradeResult::Loss,
        ),
        trip(
            2,
            "2024-01-20 00:00:00.000000000Z",
            Some("2024-01-22 00:00:00.000000000Z"),
            TradeSide::Long,
            TradeResult::BreakEven,
        ),
        trip(
            3,
            "2024-02-01 00:00:00.000000000Z",
            None,
            TradeSide::Long,
            TradeResult::Open,
        ),
    ]
}

/// One 1-based page of fixture trades.
pub fn page(campaign_id: &str, page: u32) -> Option<RoundTripPage> {
    if campaign_id != DEMO_CAMPAIGN {
        return None;
    }
    let trips = all();
    let total = u32::try_from(trips.len().div_ceil(PAGE_SIZE)).unwrap_or(u32::MAX);
    let skip = usize::try_from(page.saturating_sub(1))
        .unwrap_or(usize::MAX)
        .saturating_mul(PAGE_SIZE);
    let items = trips.into_iter().skip(skip).take(PAGE_SIZE).collect();
    Some(RoundTripPage { items, page, total })
}
