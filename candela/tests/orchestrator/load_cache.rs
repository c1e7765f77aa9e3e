use std::sync::Arc;

use candela::{CandelaError, ChartQuery, DataRange, SeriesKey, TradeWindow};
use candela_mock::{MockSource, SERIES_BARS};

use crate::helpers::{aapl_1h, bar, build_candela, hourly_series};

fn focused() -> ChartQuery {
    ChartQuery::new(aapl_1h()).with_trades([TradeWindow::new(bar(100), Some(bar(110)))])
}

#[tokio::test]
async fn second_load_is_served_from_cache() {
    let mock = Arc::new(MockSource::new());
    let candela = build_candela(mock.clone());

    let first = candela.load(&focused()).await.unwrap();
    assert!(first.from_network);
    // 100 bars before the open, the trade itself, 100 bars after the close
    assert_eq!(first.table.len(), 211);
    assert_eq!(first.table.index().first(), Some(&bar(0)));
    assert_eq!(first.table.index().last(), Some(&bar(210)));

    let second = candela.load(&focused()).await.unwrap();
    assert!(!second.from_network);
    assert_eq!(second.table.len(), 211);
    assert_eq!(mock.chart_calls(), 1);

    assert_eq!(
        candela.loaded_ranges(&aapl_1h()).await,
        vec![DataRange::ordered(bar(0), bar(210))]
    );
}

#[tokio::test]
async fn existing_entry_answers_a_different_selection() {
    let mock = Arc::new(MockSource::new());
    let candela = build_candela(mock.clone());
    candela.load(&focused()).await.unwrap();

    let other = ChartQuery::new(aapl_1h()).with_trades([TradeWindow::new(bar(900), None)]);
    let out = candela.load(&other).await.unwrap();
    assert!(!out.from_network);
    assert_eq!(mock.chart_calls(), 1);
}

#[tokio::test]
async fn baseline_load_fetches_whole_series() {
    let mock = Arc::new(MockSource::new());
    let candela = build_candela(mock.clone());

    let out = candela.load(&ChartQuery::new(aapl_1h())).await.unwrap();
    assert_eq!(out.table.len() as i64, SERIES_BARS);
    let reqs = mock.requests().await;
    assert_eq!(reqs.len(), 1);
    assert!(reqs[0].is_entire_series());
    assert_eq!(
        candela.loaded_ranges(&aapl_1h()).await,
        vec![DataRange::ordered(bar(0), bar(SERIES_BARS - 1))]
    );
}

#[tokio::test]
async fn series_are_cached_independently() {
    let mock = Arc::new(MockSource::new());
    let candela = build_candela(mock.clone());

    candela.load(&ChartQuery::new(aapl_1h())).await.unwrap();
    candela
        .load(&ChartQuery::new(hourly_series("BTC-Crypto")))
        .await
        .unwrap();
    candela
        .load(&ChartQuery::new(SeriesKey::new("demo", "AAPL-Stocks", "1D")))
        .await
        .unwrap();

    assert_eq!(mock.chart_calls(), 3);
    assert_eq!(candela.cache_stats().await.total_entries, 3);
}

#[tokio::test]
async fn clear_strategy_cache_keeps_other_campaigns() {
    let mock = Arc::new(MockSource::new());
    let candela = build_candela(mock.clone());
    let other = SeriesKey::new("other", "AAPL-Stocks", "1h");

    candela.load(&ChartQuery::new(aapl_1h())).await.unwrap();
    candela.load(&ChartQuery::new(other.clone())).await.unwrap();

    candela.clear_strategy_cache("demo").await;
    assert!(candela.current(&aapl_1h()).await.is_none());
    assert!(candela.current(&other).await.is_some());

    // the cleared series is fetched again
    let again = candela.load(&ChartQuery::new(aapl_1h())).await.unwrap();
    assert!(again.from_network);
    assert_eq!(mock.chart_calls(), 3);

    candela.clear_cache().await;
    assert_eq!(candela.cache_stats().await.total_entries, 0);
    assert!(candela.loaded_ranges(&other).await.is_empty());
}

#[tokio::test]
async fn failed_load_records_error_and_caches_nothing() {
    let mock = Arc::new(MockSource::new());
    let candela = build_candela(mock.clone());
    let series = hourly_series("FAIL");

    let err = candela.load(&ChartQuery::new(series.clone())).await.unwrap_err();
    assert!(matches!(err, CandelaError::Transport(_)));
    // first attempt plus two retries
    assert_eq!(mock.chart_calls(), 3);

    let snap = candela.snapshot(&series).await;
    assert_eq!(snap.last_error, Some(err));
    assert!(snap.data.is_none());
    assert!(candela.current(&series).await.is_none());
}
