use std::time::Duration;

use candela::{CandelaError, ChartQuery, DataRange, SeriesPhase, TradeWindow};
use candela_mock::{DynamicMockSource, MockBehavior};

use crate::helpers::{aapl_1h, bar, build_candela, hourly_table};

const ASSET: &str = "AAPL-Stocks";

fn selection(open_bar: i64) -> ChartQuery {
    ChartQuery::new(aapl_1h())
        .with_trades([TradeWindow::new(bar(open_bar), Some(bar(open_bar + 5)))])
}

#[tokio::test(start_paused = true)]
async fn response_for_a_replaced_selection_is_discarded() {
    let (source, ctrl) = DynamicMockSource::new_with_controller("dyn");
    ctrl.set_chart_script(
        ASSET,
        vec![
            MockBehavior::Delayed(Duration::from_millis(200), hourly_table(0, 50)),
            MockBehavior::Return(hourly_table(300, 50)),
        ],
    )
    .await;
    let candela = build_candela(source);

    let old = selection(120);
    let new = selection(400);
    let (old_res, new_res) = tokio::join!(candela.load(&old), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        candela.load(&new).await
    });

    assert!(matches!(old_res, Err(CandelaError::Superseded { .. })));
    let fresh = new_res.unwrap();
    assert_eq!(fresh.table.index().first(), Some(&bar(300)));

    // the stale table never reached the cache
    let current = candela.current(&aapl_1h()).await.unwrap();
    assert_eq!(current.len(), 50);
    assert_eq!(current.index().first(), Some(&bar(300)));

    let snap = candela.snapshot(&aapl_1h()).await;
    assert!(snap.last_error.is_none());
    assert_eq!(snap.phase, SeriesPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn expansion_is_discarded_when_selection_changes() {
    let (source, ctrl) = DynamicMockSource::new_with_controller("dyn");
    ctrl.set_chart_script(
        ASSET,
        vec![
            MockBehavior::Delayed(Duration::from_millis(200), hourly_table(600, 11)),
            MockBehavior::Return(hourly_table(0, 20)),
        ],
    )
    .await;
    let candela = build_candela(source);

    let window = DataRange::ordered(bar(600), bar(610));
    let expansion = ChartQuery::new(aapl_1h()).with_expansion(window);
    let (exp_res, sel_res) = tokio::join!(candela.load(&expansion), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        candela.load(&selection(10)).await
    });

    assert!(matches!(exp_res, Err(CandelaError::Superseded { .. })));
    sel_res.unwrap();
    assert_eq!(
        candela.loaded_ranges(&aapl_1h()).await,
        vec![DataRange::ordered(bar(0), bar(19))]
    );
}

#[tokio::test(start_paused = true)]
async fn phase_reports_fetching_while_request_is_outstanding() {
    let (source, ctrl) = DynamicMockSource::new_with_controller("dyn");
    ctrl.set_chart_behavior(
        ASSET,
        MockBehavior::Delayed(Duration::from_millis(100), hourly_table(0, 10)),
    )
    .await;
    let candela = build_candela(source);

    let idle = candela.snapshot(&aapl_1h()).await;
    assert_eq!(idle.phase, SeriesPhase::Idle);
    assert!(!idle.actually_fetching);

    let query = ChartQuery::new(aapl_1h());
    let (loaded, during) = tokio::join!(candela.load(&query), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        candela.snapshot(&aapl_1h()).await
    });
    loaded.unwrap();
    assert_eq!(during.phase, SeriesPhase::Fetching);
    assert!(during.actually_fetching);
    assert!(during.data.is_none());

    let after = candela.snapshot(&aapl_1h()).await;
    assert_eq!(after.phase, SeriesPhase::Idle);
    assert!(!after.actually_fetching);
    assert_eq!(after.data.map(|t| t.len()), Some(10));
}
