//! Identity of a cached chart series.

use serde::{Deserialize, Serialize};

/// Identity of one chart series: a campaign's asset at a given timeframe.
///
/// Every cache entry, in-flight fetch and viewport session is keyed by this
/// triple. The `Display` form (`campaign_asset_timeframe`) is used in logs and
/// errors, and its campaign prefix drives per-campaign eviction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesKey {
    /// Campaign (strategy run) identifier.
    pub campaign_id: String,
    /// Asset identifier as understood by the backend.
    pub asset_id: String,
    /// Timeframe label such as `"1h"` or `"1D"`.
    pub timeframe: String,
}

impl SeriesKey {
    /// Construct a series key from its parts.
    pub fn new(
        campaign_id: impl Into<String>,
        asset_id: impl Into<String>,
        timeframe: impl Into<String>,
    ) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            asset_id: asset_id.into(),
            timeframe: timeframe.into(),
        }
    }

    /// True if this series belongs to `campaign_id`.
    #[must_use]
    pub fn belongs_to(&self, campaign_id: &str) -> bool {
        self.campaign_id == campaign_id
    }
}

impl core::fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}_{}_{}", self.campaign_id, self.asset_id, self.timeframe)
    }
}
