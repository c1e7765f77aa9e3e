use std::sync::Arc;

use candela::{
    DataRange, Motion, Trigger, ViewportConfig, ViewportController, ViewportDecision,
    ViewportEvent, envelope,
};
use candela_mock::{DEMO_CAMPAIGN, MockSource};
use proptest::prelude::*;

use crate::helpers::{aapl_1h, bar, build_candela};

fn zoom(min: i64, max: i64) -> ViewportEvent {
    ViewportEvent::new(min, max, Trigger::UserZoom)
}

fn pan(min: i64, max: i64) -> ViewportEvent {
    ViewportEvent::new(min, max, Trigger::UserPan)
}

const LOADED: [DataRange; 1] = [DataRange { from: 0, to: 1_000 }];

#[test]
fn first_user_event_only_records_width() {
    let mut vp = ViewportController::default();
    assert_eq!(vp.observe(&zoom(0, 100), &[], false), ViewportDecision::Recorded);
    assert_eq!(vp.previous_width(), Some(100));
}

#[test]
fn programmatic_and_in_flight_events_are_ignored() {
    let mut vp = ViewportController::default();
    let set = ViewportEvent::new(0, 100, Trigger::Programmatic);
    assert_eq!(vp.observe(&set, &LOADED, false), ViewportDecision::Ignored);
    assert_eq!(vp.previous_width(), None);

    assert_eq!(vp.observe(&zoom(0, 100), &LOADED, true), ViewportDecision::Ignored);
    assert_eq!(vp.previous_width(), None);
}

#[test]
fn zoom_in_holds_even_without_data() {
    let mut vp = ViewportController::default();
    vp.observe(&zoom(0, 500), &[], false);
    assert_eq!(
        vp.observe(&zoom(100, 400), &[], false),
        ViewportDecision::Hold(Motion::ZoomIn)
    );
    assert_eq!(vp.previous_width(), Some(300));
}

#[test]
fn zoom_out_without_loaded_data_expands() {
    let mut vp = ViewportController::default();
    vp.observe(&zoom(1_000, 1_100), &[], false);
    // margin is twice the new width on each side
    assert_eq!(
        vp.observe(&zoom(1_000, 1_200), &[], false),
        ViewportDecision::Expand(DataRange::ordered(600, 1_600))
    );
}

#[test]
fn pan_inside_a_narrow_buffer_holds() {
    let cfg = ViewportConfig {
        prefetch_ratio: 0.1,
        expansion_factor: 1.0,
    };
    let mut vp = ViewportController::new(cfg);
    vp.observe(&pan(450, 550), &LOADED, false);
    assert_eq!(
        vp.observe(&pan(451, 551), &LOADED, false),
        ViewportDecision::Hold(Motion::Pan)
    );
    // within 100 of the right edge
    assert_eq!(
        vp.observe(&pan(850, 950), &LOADED, false),
        ViewportDecision::Expand(DataRange::ordered(750, 1_050))
    );
}

#[test]
fn default_buffer_is_half_the_cached_span() {
    let mut vp = ViewportController::default();
    vp.observe(&pan(450, 550), &LOADED, false);
    assert!(matches!(
        vp.observe(&pan(460, 560), &LOADED, false),
        ViewportDecision::Expand(_)
    ));
}

#[test]
fn one_millisecond_width_change_is_a_pan() {
    let cfg = ViewportConfig {
        prefetch_ratio: 0.0,
        expansion_factor: 1.0,
    };
    let mut vp = ViewportController::new(cfg);
    vp.observe(&zoom(400, 500), &LOADED, false);
    assert_eq!(
        vp.observe(&zoom(400, 501), &LOADED, false),
        ViewportDecision::Hold(Motion::Pan)
    );
    assert_eq!(
        vp.observe(&zoom(400, 500), &LOADED, false),
        ViewportDecision::Hold(Motion::Pan)
    );
    assert_eq!(
        vp.observe(&zoom(400, 510), &LOADED, false),
        ViewportDecision::Hold(Motion::ZoomOut)
    );
}

#[test]
fn reset_forgets_the_recorded_width() {
    let mut vp = ViewportController::default();
    vp.observe(&zoom(0, 100), &LOADED, false);
    vp.reset();
    assert_eq!(vp.observe(&zoom(0, 50), &LOADED, false), ViewportDecision::Recorded);
}

proptest! {
    #[test]
    fn narrowing_windows_never_expand(
        start in -1_000_000i64..1_000_000,
        widths in proptest::collection::vec(1i64..1_000, 1..20),
        left in -50i64..50,
        right in -50i64..50,
        with_data in any::<bool>(),
    ) {
        let mut vp = ViewportController::default();
        let mut width = 1_000_000i64;
        // cached span hugging the initial window, well inside the prefetch buffer
        let loaded = if with_data {
            vec![DataRange::ordered(start + left, start + width + right)]
        } else {
            Vec::new()
        };
        vp.observe(&zoom(start, start + width), &loaded, false);
        for shrink in widths {
            width -= shrink + 1;
            let d = vp.observe(&zoom(start, start + width), &loaded, false);
            prop_assert_eq!(d, ViewportDecision::Hold(Motion::ZoomIn));
        }
    }
}

#[tokio::test]
async fn pan_near_the_edge_fetches_ahead() {
    let mock = Arc::new(MockSource::new());
    let candela = build_candela(mock.clone());
    candela.load_metadata(DEMO_CAMPAIGN).await.unwrap();
    let series = aapl_1h();
    let mut vp = candela.viewport_controller();

    let first = candela
        .on_viewport_change(&series, &mut vp, &zoom(bar(1040), bar(1060)))
        .await
        .unwrap();
    assert_eq!(first.decision, ViewportDecision::Recorded);
    assert!(first.data.is_none());

    // empty cache: any zoom-out expands
    let out = candela
        .on_viewport_change(&series, &mut vp, &zoom(bar(1040), bar(1080)))
        .await
        .unwrap();
    let ViewportDecision::Expand(target) = out.decision else {
        panic!("expected expansion, got {:?}", out.decision);
    };
    assert_eq!(target, DataRange::ordered(bar(960), bar(1160)));
    let data = out.data.unwrap();
    assert!(data.from_network);
    assert_eq!(data.table.len(), 201);

    // panning toward the cached edge fetches only the uncovered tail
    let out = candela
        .on_viewport_change(&series, &mut vp, &pan(bar(1120), bar(1160)))
        .await
        .unwrap();
    assert_eq!(
        out.decision,
        ViewportDecision::Expand(DataRange::ordered(bar(1040), bar(1240)))
    );
    let reqs = mock.requests().await;
    assert_eq!(reqs.len(), 2);
    assert_eq!(reqs[1].from_ms, Some(bar(1160) + 1));
    assert_eq!(reqs[1].to_ms, Some(bar(1240)));
    assert_eq!(out.data.unwrap().table.len(), 281);

    let before = mock.chart_calls();
    let zoomed_in = candela
        .on_viewport_change(&series, &mut vp, &zoom(bar(1130), bar(1140)))
        .await
        .unwrap();
    assert_eq!(zoomed_in.decision, ViewportDecision::Hold(Motion::ZoomIn));
    assert_eq!(mock.chart_calls(), before);
    assert_eq!(
        envelope(&candela.loaded_ranges(&series).await),
        Some(DataRange::ordered(bar(960), bar(1240)))
    );
}
