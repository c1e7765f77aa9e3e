//! Shared data transfer objects and configuration for the candela chart data layer.
#![warn(missing_docs)]

mod config;
mod endpoint;
mod error;
mod metadata;
mod range;
mod request;
mod series;
mod stats;
mod trade;

pub use config::{CacheConfig, CandelaConfig, PaddingConfig, RetryConfig, ViewportConfig};
pub use endpoint::Endpoint;
pub use error::CandelaError;
pub use metadata::{Asset, AssetInfo, CampaignMetadata, TimeframeInfo};
pub use range::DataRange;
pub use request::FetchRequest;
pub use series::SeriesKey;
pub use stats::CacheStats;
pub use trade::{
    RoundTrip, RoundTripPage, TradeResult, TradeSide, TradeWindow, parse_backend_timestamp,
};
