use std::sync::Arc;

use async_trait::async_trait;

use crate::{CampaignMetadata, CandelaError, FetchRequest, RoundTripPage};

/// A backend that serves campaign metadata, round trips and chart payloads.
///
/// Implementations translate transport failures into [`CandelaError`] and
/// never cache chart payloads themselves; range caching is the orchestrator's
/// job.
#[async_trait]
pub trait ChartDataSource: Send + Sync {
    /// A stable identifier used in logs (e.g. "candela-http", "candela-mock").
    fn name(&self) -> &'static str;

    /// Human-friendly vendor string.
    fn vendor(&self) -> &'static str {
        "unknown"
    }

    /// Fetch per-asset metadata, including absolute series bounds where known.
    async fn metadata(&self, campaign_id: &str) -> Result<CampaignMetadata, CandelaError>;

    /// Fetch one page (1-based) of the campaign's round trips.
    async fn round_trips(
        &self,
        campaign_id: &str,
        page: u32,
    ) -> Result<RoundTripPage, CandelaError>;

    /// Fetch the raw columnar payload for `request`.
    async fn chart_data(&self, request: &FetchRequest) -> Result<Vec<u8>, CandelaError>;
}

#[async_trait]
impl<T> ChartDataSource for Arc<T>
where
    T: ChartDataSource + ?Sized,
{
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn vendor(&self) -> &'static str {
        (**self).vendor()
    }

    async fn metadata(&self, campaign_id: &str) -> Result<CampaignMetadata, CandelaError> {
        (**self).metadata(campaign_id).await
    }

    async fn round_trips(
        &self,
        campaign_id: &str,
        page: u32,
    ) -> Result<RoundTripPage, CandelaError> {
        (**self).round_trips(campaign_id, page).await
    }

    async fn chart_data(&self, request: &FetchRequest) -> Result<Vec<u8>, CandelaError> {
        (**self).chart_data(request).await
    }
}
