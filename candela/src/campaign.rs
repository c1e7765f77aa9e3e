use candela_core::{CampaignMetadata, CandelaError, FetchRequest, RoundTrip, SeriesKey};

use crate::core::Candela;

/// Upper bound on pages walked by [`Candela::round_trips`].
const MAX_ROUND_TRIP_PAGES: u32 = 10_000;

impl Candela {
    /// Fetch campaign metadata and record the absolute extent of every
    /// asset/timeframe that reports one.
    ///
    /// Recorded bounds clamp later expansion requests so the viewport never
    /// asks for data outside the stored series.
    ///
    /// # Errors
    /// Propagates the source error.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(target = "candela::campaign", skip(self), fields(campaign = campaign_id))
    )]
    pub async fn load_metadata(&self, campaign_id: &str) -> Result<CampaignMetadata, CandelaError> {
        let meta = self.source.metadata(campaign_id).await?;
        let mut cache = self.cache.lock().await;
        for (asset_id, timeframe, bounds) in meta.bounded_series() {
            let series = SeriesKey::new(campaign_id, asset_id, timeframe);
            cache.set_absolute_bounds(&FetchRequest::for_series(&series), bounds);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "candela::campaign",
            assets = meta.asset_info.len(),
            bounded = meta.bounded_series().count(),
            "metadata loaded"
        );
        Ok(meta)
    }

    /// Fetch every round trip of a campaign, walking pages from 1 until the
    /// last one.
    ///
    /// # Errors
    /// Propagates the first source error.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(target = "candela::campaign", skip(self), fields(campaign = campaign_id))
    )]
    pub async fn round_trips(&self, campaign_id: &str) -> Result<Vec<RoundTrip>, CandelaError> {
        let mut out = Vec::new();
        let mut page = 1;
        loop {
            let resp = self.source.round_trips(campaign_id, page).await?;
            let empty = resp.items.is_empty();
            let last = resp.is_last();
            out.extend(resp.items);
            if last || empty || page >= MAX_ROUND_TRIP_PAGES {
                break;
            }
            page += 1;
        }
        Ok(out)
    }
}
