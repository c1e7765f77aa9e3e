use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use candela_core::{
    CampaignMetadata, CandelaError, ChartDataSource, ColumnarTable, FetchRequest, RoundTripPage,
    encode_table,
};

/// Instruction for how a method should behave for a given input.
#[derive(Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Return the provided value after a delay.
    Delayed(Duration, T),
    /// Fail immediately with the provided error.
    Fail(CandelaError),
    /// Hang indefinitely (simulate a stalled backend).
    Hang,
}

impl<T> MockBehavior<T> {
    async fn resolve(self, what: &'static str) -> Result<T, CandelaError> {
        match self {
            Self::Return(v) => Ok(v),
            Self::Delayed(d, v) => {
                tokio::time::sleep(d).await;
                Ok(v)
            }
            Self::Fail(e) => Err(e),
            Self::Hang => {
                std::future::pending::<()>().await;
                Err(CandelaError::Other(format!("{what} hang released")))
            }
        }
    }
}

#[derive(Default)]
struct InternalState {
    metadata_rules: HashMap<String, MockBehavior<CampaignMetadata>>,
    round_trip_pages: HashMap<String, Vec<RoundTripPage>>,
    chart_scripts: HashMap<String, VecDeque<MockBehavior<ColumnarTable>>>,
    chart_requests: Vec<FetchRequest>,
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockController {
    /// Set the behavior for `metadata` calls for a campaign.
    pub async fn set_metadata_behavior(
        &self,
        campaign_id: &str,
        behavior: MockBehavior<CampaignMetadata>,
    ) {
        let mut guard = self.state.lock().await;
        guard
            .metadata_rules
            .insert(campaign_id.to_string(), behavior);
    }

    /// Serve `pages` (1-based, in order) for a campaign's round trips.
    pub async fn set_round_trip_pages(&self, campaign_id: &str, pages: Vec<RoundTripPage>) {
        let mut guard = self.state.lock().await;
        guard
            .round_trip_pages
            .insert(campaign_id.to_string(), pages);
    }

    /// Set a single, repeating behavior for `chart_data` calls for an asset.
    pub async fn set_chart_behavior(&self, asset_id: &str, behavior: MockBehavior<ColumnarTable>) {
        self.set_chart_script(asset_id, vec![behavior]).await;
    }

    /// Script successive `chart_data` answers for an asset.
    ///
    /// Each call consumes the next behavior; the last one repeats forever.
    pub async fn set_chart_script(&self, asset_id: &str, script: Vec<MockBehavior<ColumnarTable>>) {
        let mut guard = self.state.lock().await;
        guard
            .chart_scripts
            .insert(asset_id.to_string(), script.into_iter().collect());
    }

    /// Every chart request received, in arrival order.
    pub async fn chart_requests(&self) -> Vec<FetchRequest> {
        let guard = self.state.lock().await;
        guard.chart_requests.clone()
    }

    /// Clear all configured behaviors and request logs.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        guard.metadata_rules.clear();
        guard.round_trip_pages.clear();
        guard.chart_scripts.clear();
        guard.chart_requests.clear();
    }
}

/// A source that defers all behavior to an external controller.
pub struct DynamicMockSource {
    name: &'static str,
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockSource {
    /// Create a new dynamic mock source and its controller.
    #[must_use]
    pub fn new_with_controller(
        name: &'static str,
    ) -> (Arc<dyn ChartDataSource>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = DynamicMockController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self { name, state });
        (me as Arc<dyn ChartDataSource>, controller)
    }
}

#[async_trait]
impl ChartDataSource for DynamicMockSource {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        "DynamicMock"
    }

    async fn metadata(&self, campaign_id: &str) -> Result<CampaignMetadata, CandelaError> {
        // Acquire behavior snapshot without holding the lock across await points
        let behavior = {
            let guard = self.state.lock().await;
            guard.metadata_rules.get(campaign_id).cloned()
        };
        match behavior {
            Some(b) => b.resolve("metadata").await,
            None => Err(CandelaError::not_found(format!(
                "metadata for {campaign_id}"
            ))),
        }
    }

    async fn round_trips(
        &self,
        campaign_id: &str,
        page: u32,
    ) -> Result<RoundTripPage, CandelaError> {
        let guard = self.state.lock().await;
        let idx = usize::try_from(page.saturating_sub(1)).unwrap_or(usize::MAX);
        guard
            .round_trip_pages
            .get(campaign_id)
            .and_then(|pages| pages.get(idx))
            .cloned()
            .ok_or_else(|| {
                CandelaError::not_found(format!("round trips page {page} for {campaign_id}"))
            })
    }

    async fn chart_data(&self, request: &FetchRequest) -> Result<Vec<u8>, CandelaError> {
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.chart_requests.push(request.clone());
            guard
                .chart_scripts
                .get_mut(&request.asset_id)
                .and_then(|script| {
                    if script.len() > 1 {
                        script.pop_front()
                    } else {
                        script.front().cloned()
                    }
                })
        };
        match behavior {
            Some(b) => {
                let table = b.resolve("chart_data").await?;
                encode_table(&table)
            }
            None => Err(CandelaError::not_found(format!(
                "chart data for {}",
                request.series_key()
            ))),
        }
    }
}
