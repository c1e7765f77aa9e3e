//! Mock chart data sources for CI-safe tests and demos.
//!
//! [`MockSource`] serves deterministic synthetic bars for any asset, honoring
//! explicit windows, pivot paddings and whole-series requests. The dynamic
//! variant in [`DynamicMockSource`] defers every answer to a controller.
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use candela_core::{
    CampaignMetadata, CandelaError, ChartDataSource, FetchRequest, RoundTripPage, encode_table,
};
use tokio::sync::Mutex;

mod dynamic;
mod fixtures;

pub use dynamic::{DynamicMockController, DynamicMockSource, MockBehavior};
pub use fixtures::bars::{SERIES_BARS, SERIES_START_MS, bounds as fixture_bounds};
pub use fixtures::metadata::DEMO_CAMPAIGN;
pub use fixtures::round_trips::PAGE_SIZE;

/// Mock source with deterministic fixture data.
///
/// Assets named `FAIL` fail with a transport error and assets named `SLOW`
/// answer after a short delay. Every chart request is recorded.
#[derive(Default)]
pub struct MockSource {
    chart_calls: AtomicUsize,
    requests: Arc<Mutex<Vec<FetchRequest>>>,
}

impl MockSource {
    /// Create a fresh mock with zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `chart_data` calls served so far (including failures).
    #[must_use]
    pub fn chart_calls(&self) -> usize {
        self.chart_calls.load(Ordering::SeqCst)
    }

    /// Every chart request received, in arrival order.
    pub async fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().await.clone()
    }

    async fn maybe_fail_or_delay(asset_id: &str) -> Result<(), CandelaError> {
        match asset_id {
            "FAIL" => Err(CandelaError::Transport(
                "forced failure: chart_data".to_string(),
            )),
            "SLOW" => {
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ChartDataSource for MockSource {
    fn name(&self) -> &'static str {
        "candela-mock"
    }

    fn vendor(&self) -> &'static str {
        "Mock"
    }

    async fn metadata(&self, campaign_id: &str) -> Result<CampaignMetadata, CandelaError> {
        fixtures::metadata::by_campaign(campaign_id)
            .ok_or_else(|| CandelaError::not_found(format!("metadata for {campaign_id}")))
    }

    async fn round_trips(
        &self,
        campaign_id: &str,
        page: u32,
    ) -> Result<RoundTripPage, CandelaError> {
        fixtures::round_trips::page(campaign_id, page)
            .ok_or_else(|| CandelaError::not_found(format!("round trips for {campaign_id}")))
    }

    async fn chart_data(&self, request: &FetchRequest) -> Result<Vec<u8>, CandelaError> {
        self.chart_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(request.clone());
        Self::maybe_fail_or_delay(&request.asset_id).await?;
        let table = fixtures::bars::table_for(request)?;
        encode_table(&table)
    }
}
