use std::sync::Arc;

use candela::{
    CacheConfig, Candela, CandelaConfig, CandelaError, PaddingConfig, ViewportConfig,
};
use candela_mock::MockSource;

fn with_mock() -> candela::CandelaBuilder {
    Candela::builder().source(Arc::new(MockSource::new()))
}

fn invalid(res: Result<Candela, CandelaError>) -> String {
    match res {
        Err(CandelaError::InvalidArg(msg)) => msg,
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected InvalidArg"),
    }
}

#[test]
fn defaults_apply() {
    let candela = with_mock().build().unwrap();
    assert_eq!(candela.config(), &CandelaConfig::default());
    assert_eq!(candela.config().padding, PaddingConfig::STANDARD);
    assert_eq!(candela.source_name(), "candela-mock");
    assert_eq!(candela.viewport_controller().previous_width(), None);
}

#[test]
fn source_is_required() {
    let msg = invalid(Candela::builder().build());
    assert!(msg.contains("source"));
}

#[test]
fn cache_budgets_are_validated() {
    let zero = CacheConfig {
        max_entries: 0,
        ..CacheConfig::default()
    };
    assert!(invalid(with_mock().cache(zero).build()).contains("max_entries"));

    let inverted = CacheConfig {
        min_entries: 5,
        max_entries: 2,
        ..CacheConfig::default()
    };
    assert!(invalid(with_mock().cache(inverted).build()).contains("min_entries"));
}

#[test]
fn viewport_tunables_are_validated() {
    let negative = ViewportConfig {
        prefetch_ratio: -0.1,
        ..ViewportConfig::default()
    };
    assert!(invalid(with_mock().viewport(negative).build()).contains("prefetch_ratio"));

    let nan = ViewportConfig {
        expansion_factor: f64::NAN,
        ..ViewportConfig::default()
    };
    assert!(invalid(with_mock().viewport(nan).build()).contains("expansion_factor"));
}

#[test]
fn later_setters_override_config() {
    let candela = with_mock()
        .config(CandelaConfig::default())
        .padding(PaddingConfig::AGGRESSIVE)
        .build()
        .unwrap();
    assert_eq!(candela.config().padding.front_pad_units, 200);
}
