use candela::{Candela, CandelaError, ChartQuery, DataRange, RetryConfig};
use candela_mock::{DynamicMockSource, MockBehavior};

use crate::helpers::{aapl_1h, bar, build_candela, hourly_table};

const ASSET: &str = "AAPL-Stocks";

#[tokio::test]
async fn transient_failures_are_retried() {
    let (source, ctrl) = DynamicMockSource::new_with_controller("dyn");
    ctrl.set_chart_script(
        ASSET,
        vec![
            MockBehavior::Fail(CandelaError::Transport("reset by peer".into())),
            MockBehavior::Fail(CandelaError::http(503, "unavailable")),
            MockBehavior::Return(hourly_table(0, 10)),
        ],
    )
    .await;
    let candela = build_candela(source);

    let out = candela.load(&ChartQuery::new(aapl_1h())).await.unwrap();
    assert!(out.from_network);
    assert_eq!(out.table.len(), 10);
    assert_eq!(ctrl.chart_requests().await.len(), 3);
    assert!(candela.snapshot(&aapl_1h()).await.last_error.is_none());
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let (source, ctrl) = DynamicMockSource::new_with_controller("dyn");
    ctrl.set_chart_behavior(ASSET, MockBehavior::Fail(CandelaError::http(404, "no such asset")))
        .await;
    let candela = build_candela(source);

    let err = candela.load(&ChartQuery::new(aapl_1h())).await.unwrap_err();
    assert!(matches!(err, CandelaError::Http { status: 404, .. }));
    assert_eq!(ctrl.chart_requests().await.len(), 1);
}

#[tokio::test]
async fn exhausted_retries_surface_the_error_and_recover_later() {
    let (source, ctrl) = DynamicMockSource::new_with_controller("dyn");
    ctrl.set_chart_behavior(ASSET, MockBehavior::Fail(CandelaError::http(502, "bad gateway")))
        .await;
    let candela = build_candela(source);

    let err = candela.load(&ChartQuery::new(aapl_1h())).await.unwrap_err();
    assert!(matches!(err, CandelaError::Http { status: 502, .. }));
    assert_eq!(ctrl.chart_requests().await.len(), 3);
    let snap = candela.snapshot(&aapl_1h()).await;
    assert_eq!(snap.last_error, Some(err));
    assert!(snap.data.is_none());

    ctrl.set_chart_behavior(ASSET, MockBehavior::Return(hourly_table(0, 5)))
        .await;
    candela.load(&ChartQuery::new(aapl_1h())).await.unwrap();
    let snap = candela.snapshot(&aapl_1h()).await;
    assert!(snap.last_error.is_none());
    assert_eq!(snap.data.map(|t| t.len()), Some(5));
}

#[tokio::test]
async fn no_retry_policy_makes_a_single_attempt() {
    let (source, ctrl) = DynamicMockSource::new_with_controller("dyn");
    ctrl.set_chart_behavior(ASSET, MockBehavior::Fail(CandelaError::Transport("down".into())))
        .await;
    let candela = Candela::builder()
        .source(source)
        .retry(RetryConfig::NONE)
        .build()
        .unwrap();

    assert!(candela.load(&ChartQuery::new(aapl_1h())).await.is_err());
    assert_eq!(ctrl.chart_requests().await.len(), 1);
}

#[tokio::test]
async fn failed_expansion_leaves_cached_data_intact() {
    let (source, ctrl) = DynamicMockSource::new_with_controller("dyn");
    ctrl.set_chart_script(
        ASSET,
        vec![
            MockBehavior::Return(hourly_table(100, 11)),
            MockBehavior::Fail(CandelaError::Transport("down".into())),
        ],
    )
    .await;
    let candela = build_candela(source);

    let window = DataRange::ordered(bar(100), bar(110));
    candela
        .load(&ChartQuery::new(aapl_1h()).with_expansion(window))
        .await
        .unwrap();

    let wider = DataRange::ordered(bar(50), bar(110));
    let err = candela
        .load(&ChartQuery::new(aapl_1h()).with_expansion(wider))
        .await
        .unwrap_err();
    assert!(matches!(err, CandelaError::Transport(_)));

    assert_eq!(candela.loaded_ranges(&aapl_1h()).await, vec![window]);
    assert_eq!(candela.current(&aapl_1h()).await.map(|t| t.len()), Some(11));
}
