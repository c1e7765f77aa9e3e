//! Campaign metadata returned by the analytics backend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::range::DataRange;

/// Instrument description attached to each asset in the metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Asset {
    /// Backend asset identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Exchange ticker.
    pub ticker: String,
    /// Asset class label (`Stocks`, `Futures`, `Crypto`, `FX`).
    pub asset_class: String,
    /// Listing exchange.
    pub exchange: String,
    /// Quote currency.
    pub currency: String,
}

/// One timeframe an asset was backtested on, with optional data extent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeframeInfo {
    /// Bare label such as `"1h"`.
    Label(String),
    /// Label with the absolute extent of the stored series.
    Bounded {
        /// Timeframe label.
        timeframe: String,
        /// First bar timestamp in ms.
        absolute_start_ms: i64,
        /// Last bar timestamp in ms.
        absolute_end_ms: i64,
    },
}

impl TimeframeInfo {
    /// Timeframe label.
    #[must_use]
    pub fn timeframe(&self) -> &str {
        match self {
            Self::Label(tf) | Self::Bounded { timeframe: tf, .. } => tf,
        }
    }

    /// Absolute bounds, when the backend reported them.
    #[must_use]
    pub const fn bounds(&self) -> Option<DataRange> {
        match self {
            Self::Label(_) => None,
            Self::Bounded {
                absolute_start_ms,
                absolute_end_ms,
                ..
            } => Some(DataRange::ordered(*absolute_start_ms, *absolute_end_ms)),
        }
    }
}

/// Metadata for one asset in a campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetInfo {
    /// Instrument description.
    #[serde(default)]
    pub asset: Asset,
    /// First date covered by the backtest.
    #[serde(default)]
    pub start_date: String,
    /// Last date covered by the backtest.
    #[serde(default)]
    pub end_date: String,
    /// Timeframes available for charting.
    #[serde(default)]
    pub timeframes: Vec<TimeframeInfo>,
}

impl AssetInfo {
    /// Bounds recorded for `timeframe`, if any.
    #[must_use]
    pub fn bounds_for(&self, timeframe: &str) -> Option<DataRange> {
        self.timeframes
            .iter()
            .find(|tf| tf.timeframe() == timeframe)
            .and_then(TimeframeInfo::bounds)
    }
}

/// Response of the analytics metadata endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignMetadata {
    /// Per-asset metadata keyed by asset id.
    #[serde(default)]
    pub asset_info: BTreeMap<String, AssetInfo>,
}

impl CampaignMetadata {
    /// Every `(asset_id, timeframe, bounds)` triple the backend reported.
    pub fn bounded_series(&self) -> impl Iterator<Item = (&str, &str, DataRange)> + '_ {
        self.asset_info.iter().flat_map(|(asset_id, info)| {
            info.timeframes.iter().filter_map(move |tf| {
                tf.bounds()
                    .map(|b| (asset_id.as_str(), tf.timeframe(), b))
            })
        })
    }
}
