use std::sync::Arc;

use candela::{CandelaError, ChartDataSource, RoundTripPage, TradeResult};
use candela_mock::{DEMO_CAMPAIGN, DynamicMockSource, MockSource, PAGE_SIZE};

use crate::helpers::{aapl_1h, bar, build_candela};

#[tokio::test]
async fn metadata_seeds_bounds_without_data() {
    let mock = Arc::new(MockSource::new());
    let candela = build_candela(mock.clone());

    let meta = candela.load_metadata(DEMO_CAMPAIGN).await.unwrap();
    assert_eq!(meta.asset_info.len(), 2);
    // two assets with three bounded timeframes each
    assert_eq!(candela.cache_stats().await.total_entries, 6);
    assert!(candela.loaded_ranges(&aapl_1h()).await.is_empty());
    assert!(candela.current(&aapl_1h()).await.is_none());
    assert_eq!(mock.chart_calls(), 0);
}

#[tokio::test]
async fn unknown_campaign_metadata_is_not_found() {
    let candela = build_candela(Arc::new(MockSource::new()));
    let err = candela.load_metadata("nope").await.unwrap_err();
    assert!(matches!(err, CandelaError::NotFound { .. }));
    assert_eq!(candela.cache_stats().await.total_entries, 0);
}

#[tokio::test]
async fn round_trips_walk_every_page() {
    let candela = build_candela(Arc::new(MockSource::new()));
    let trips = candela.round_trips(DEMO_CAMPAIGN).await.unwrap();
    assert_eq!(trips.len(), 4);
    assert!(trips.len() > PAGE_SIZE);
    assert_eq!(
        trips.iter().map(|t| t.index).collect::<Vec<_>>(),
        vec![0, 1, 2, 3]
    );

    let first = trips[0].window().unwrap();
    assert_eq!(first.open, bar(48));
    assert_eq!(first.close, Some(bar(84)));

    let open = trips.iter().find(|t| t.status == TradeResult::Open).unwrap();
    assert_eq!(open.window().unwrap().close, None);
}

#[tokio::test]
async fn round_trips_stop_at_an_empty_page() {
    let fixtures = MockSource::new();
    let page1 = fixtures.round_trips(DEMO_CAMPAIGN, 1).await.unwrap();

    let (source, ctrl) = DynamicMockSource::new_with_controller("dyn");
    ctrl.set_round_trip_pages(
        "c9",
        vec![
            RoundTripPage {
                items: page1.items.clone(),
                page: 1,
                total: 5,
            },
            RoundTripPage {
                items: Vec::new(),
                page: 2,
                total: 5,
            },
        ],
    )
    .await;
    let candela = build_candela(source);

    let trips = candela.round_trips("c9").await.unwrap();
    assert_eq!(trips.len(), page1.items.len());
}

#[tokio::test]
async fn round_trip_page_error_propagates() {
    let (source, ctrl) = DynamicMockSource::new_with_controller("dyn");
    let fixtures = MockSource::new();
    let page1 = fixtures.round_trips(DEMO_CAMPAIGN, 1).await.unwrap();
    ctrl.set_round_trip_pages(
        "c9",
        vec![RoundTripPage {
            total: 3,
            ..page1
        }],
    )
    .await;
    let candela = build_candela(source);

    let err = candela.round_trips("c9").await.unwrap_err();
    assert!(matches!(err, CandelaError::NotFound { .. }));
}
