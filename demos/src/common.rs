use std::sync::Arc;

use candela::{ChartDataSource, TradeWindow};
use candela_http::{HttpSource, Route};

/// Campaign used by the demos (`CANDELA_CAMPAIGN`, default `demo`).
#[must_use]
pub fn campaign() -> String {
    std::env::var("CANDELA_CAMPAIGN").unwrap_or_else(|_| candela_mock::DEMO_CAMPAIGN.to_string())
}

/// Return a chart data source for the demos.
///
/// `CANDELA_USE_MOCK` selects the deterministic mock. Otherwise the HTTP
/// source talks to `CANDELA_API_URL` (default `http://localhost:9000`) as
/// `CANDELA_USER_ID`, through the dashboard proxy when `CANDELA_PROXY_BACKEND`
/// is set.
///
/// # Panics
/// Panics if the HTTP source rejects the configured base URL.
#[must_use]
pub fn get_source() -> Arc<dyn ChartDataSource> {
    if std::env::var("CANDELA_USE_MOCK").is_ok() {
        println!("--- (Using Mock Source for CI) ---");
        return Arc::new(candela_mock::MockSource::new());
    }

    let base = std::env::var("CANDELA_API_URL").unwrap_or_else(|_| "http://localhost:9000".into());
    let mut builder = HttpSource::builder(base);
    if let Ok(user) = std::env::var("CANDELA_USER_ID") {
        builder = builder.user_id(user);
    }
    if let Ok(backend_url) = std::env::var("CANDELA_PROXY_BACKEND") {
        builder = builder.route(Route::Proxy { backend_url });
    }
    Arc::new(builder.build().expect("invalid CANDELA_API_URL"))
}

/// Render an epoch-millisecond timestamp as UTC.
#[must_use]
pub fn fmt_ms(ts: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ts)
        .map_or_else(|| ts.to_string(), |d| d.format("%Y-%m-%d %H:%M").to_string())
}

/// Render a trade window for display.
#[must_use]
pub fn fmt_window(w: &TradeWindow) -> String {
    match w.close {
        Some(close) => format!("{} -> {}", fmt_ms(w.open), fmt_ms(close)),
        None => format!("{} -> open", fmt_ms(w.open)),
    }
}
