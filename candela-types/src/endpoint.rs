use core::fmt;
use serde::{Deserialize, Serialize};

/// Backend endpoints a chart data source serves.
///
/// Used to label errors, log fields and transport cache keys consistently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    /// Per-campaign asset and timeframe metadata.
    Metadata,
    /// Paginated round-trip (trade) listing.
    RoundTrips,
    /// Columnar OHLCV and indicator payload.
    ChartData,
}

impl Endpoint {
    /// Stable snake_case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Metadata => "metadata",
            Self::RoundTrips => "round_trips",
            Self::ChartData => "chart_data",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
