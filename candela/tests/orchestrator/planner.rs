use candela::{
    ChartQuery, DataRange, FetchRequest, PaddingConfig, SeriesKey, TradeWindow, baseline_params,
    format_for_transport, multi_trade_params, range_params, single_trade_params,
};

use crate::helpers::{H, aapl_1h, bar};

#[test]
fn single_trade_pivots_on_open_and_pads_duration() {
    let base = SeriesKey::new("c1", "BTC", "1h");
    let trade = TradeWindow::new(1_000, Some(5_000));
    let req = single_trade_params(&base, &trade, &PaddingConfig::STANDARD);

    assert_eq!(req.pivot, Some(1_000));
    assert_eq!(req.pad_front, Some(100));
    // 4s of a 1h bar rounds up to one bar
    assert_eq!(req.pad_back, Some(101));
    assert_eq!((req.from_ms, req.to_ms), (None, None));
    assert_eq!(req.strategy_id, "c1");
    assert_eq!(req.asset_id, "BTC");
}

#[test]
fn open_trade_pads_from_open_only() {
    let trade = TradeWindow::new(bar(10), None);
    let req = single_trade_params(&aapl_1h(), &trade, &PaddingConfig::MINIMAL);
    assert_eq!(req.pivot, Some(bar(10)));
    assert_eq!(req.pad_front, Some(25));
    assert_eq!(req.pad_back, Some(25));
}

#[test]
fn multi_trade_spans_earliest_open_to_latest_end() {
    let trades = [
        TradeWindow::new(bar(10), Some(bar(12))),
        TradeWindow::new(bar(5), Some(bar(6))),
        TradeWindow::new(bar(20), None),
    ];
    let req = multi_trade_params(&aapl_1h(), &trades, &PaddingConfig::CONSERVATIVE);
    assert_eq!(req.pivot, Some(bar(5)));
    assert_eq!(req.pad_front, Some(50));
    assert_eq!(req.pad_back, Some(15 + 50));
}

#[test]
fn multi_trade_partial_bar_rounds_up() {
    let trades = [TradeWindow::new(bar(0), Some(bar(2) + H / 2))];
    let req = multi_trade_params(&aapl_1h(), &trades, &PaddingConfig::STANDARD);
    assert_eq!(req.pad_back, Some(3 + 100));
}

#[test]
fn empty_selection_degenerates_to_baseline() {
    let base = aapl_1h();
    let req = multi_trade_params(&base, &[], &PaddingConfig::STANDARD);
    assert_eq!(req, baseline_params(&base));
    assert!(req.is_entire_series());
    assert_eq!(req, FetchRequest::for_series(&base));
}

#[test]
fn range_request_carries_window_only() {
    let req = range_params(&aapl_1h(), DataRange::ordered(bar(9), bar(3)));
    assert_eq!(req.from_ms, Some(bar(3)));
    assert_eq!(req.to_ms, Some(bar(9)));
    assert_eq!((req.pivot, req.pad_front, req.pad_back), (None, None, None));
    assert!(!req.is_entire_series());
}

#[test]
fn transport_map_omits_absent_fields() {
    let trade = TradeWindow::new(1_000, Some(5_000));
    let req = single_trade_params(&aapl_1h(), &trade, &PaddingConfig::STANDARD);
    let pairs = format_for_transport(&req);

    let keys: Vec<&str> = pairs.keys().map(String::as_str).collect();
    assert_eq!(keys, ["asset", "pad_back", "pad_front", "pivot", "timeframe"]);
    assert_eq!(pairs["asset"], "AAPL-Stocks");
    assert_eq!(pairs["timeframe"], "1h");
    assert_eq!(pairs["pivot"], "1000");
    assert_eq!(pairs["pad_back"], "101");

    let baseline = format_for_transport(&baseline_params(&aapl_1h()));
    assert_eq!(baseline.len(), 2);
}

#[test]
fn query_plan_priority() {
    let trades = [TradeWindow::new(bar(100), Some(bar(110)))];
    let focused = ChartQuery::new(aapl_1h()).with_trades(trades);
    assert_eq!(focused.plan(&PaddingConfig::STANDARD).pivot, Some(bar(100)));

    let whole = focused.clone().entire_series(true);
    assert!(whole.plan(&PaddingConfig::STANDARD).is_entire_series());

    let window = DataRange::ordered(bar(1), bar(2));
    let expanded = whole.with_expansion(window);
    let req = expanded.plan(&PaddingConfig::STANDARD);
    assert_eq!((req.from_ms, req.to_ms), (Some(bar(1)), Some(bar(2))));

    assert!(ChartQuery::new(aapl_1h()).plan(&PaddingConfig::STANDARD).is_entire_series());
}

#[test]
fn fingerprint_ignores_trade_order_and_expansion() {
    let a = TradeWindow::new(bar(1), Some(bar(2)));
    let b = TradeWindow::new(bar(5), None);
    let q1 = ChartQuery::new(aapl_1h()).with_trades([a, b]);
    let q2 = ChartQuery::new(aapl_1h()).with_trades([b, a]);
    assert_eq!(q1.fingerprint(), q2.fingerprint());

    let q3 = q1.clone().with_expansion(DataRange::ordered(0, 10));
    assert_eq!(q1.fingerprint(), q3.fingerprint());

    assert_ne!(q1.fingerprint(), q1.clone().entire_series(true).fingerprint());
    assert_ne!(
        q1.fingerprint(),
        ChartQuery::new(aapl_1h()).with_trades([a]).fingerprint()
    );
}
