//! Round-trip (closed or open trade) DTOs.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::CandelaError;

/// Outcome label of a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeResult {
    /// Closed with a profit.
    #[serde(rename = "WIN")]
    Win,
    /// Closed with a loss.
    #[serde(rename = "LOSS")]
    Loss,
    /// Still open.
    #[serde(rename = "OPEN")]
    Open,
    /// Closed flat.
    #[serde(rename = "BREAK EVEN")]
    BreakEven,
}

/// Direction of a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeSide {
    /// Long position.
    Long,
    /// Short position.
    Short,
}

/// One round trip as listed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundTrip {
    /// Asset label.
    #[serde(default)]
    pub asset: String,
    /// Backend asset id.
    pub asset_id: String,
    /// Sequence number within the campaign.
    #[serde(default)]
    pub index: u64,
    /// Open timestamp, e.g. `2024-07-30 00:00:00.000000000Z`.
    pub open_datetime: String,
    /// Close timestamp; absent while the trade is open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_datetime: Option<String>,
    /// Direction.
    pub side: TradeSide,
    /// Outcome label.
    pub status: TradeResult,
    /// Position size.
    #[serde(default)]
    pub size: f64,
    /// Average entry fill.
    #[serde(default)]
    pub avg_entry_price: f64,
    /// Average exit fill.
    #[serde(default)]
    pub avg_exit_price: f64,
    /// Net return as a percentage.
    #[serde(default)]
    pub return_percent: f64,
    /// Net return in quote currency.
    #[serde(default)]
    pub return_nominal: f64,
    /// Stop loss level, if set.
    #[serde(default)]
    pub stop_loss: Option<f64>,
    /// Take profit level, if set.
    #[serde(default)]
    pub take_profit: Option<f64>,
}

impl RoundTrip {
    /// Parse the trade's open/close timestamps into a window.
    ///
    /// # Errors
    /// Returns `InvalidArg` if either timestamp cannot be parsed.
    pub fn window(&self) -> Result<TradeWindow, CandelaError> {
        let open = parse_backend_timestamp(&self.open_datetime)?;
        let close = self
            .close_datetime
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(parse_backend_timestamp)
            .transpose()?;
        Ok(TradeWindow { open, close })
    }
}

/// The time span of a trade in epoch ms. `close` is `None` while open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradeWindow {
    /// Open timestamp (ms).
    pub open: i64,
    /// Close timestamp (ms).
    pub close: Option<i64>,
}

impl TradeWindow {
    /// Build a window from raw millisecond timestamps.
    #[must_use]
    pub const fn new(open: i64, close: Option<i64>) -> Self {
        Self { open, close }
    }

    /// Close timestamp, falling back to open for trades still running.
    #[must_use]
    pub fn end(&self) -> i64 {
        self.close.unwrap_or(self.open)
    }
}

/// One page of the round-trip listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundTripPage {
    /// Trades on this page.
    #[serde(default)]
    pub items: Vec<RoundTrip>,
    /// 1-based page number.
    pub page: u32,
    /// Total number of pages.
    pub total: u32,
}

impl RoundTripPage {
    /// True when no further pages follow.
    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.page >= self.total
    }
}

/// Parse a backend timestamp into epoch milliseconds.
///
/// Accepts the backend's `YYYY-MM-DD HH:MM:SS[.fffffffff]Z` form and RFC 3339.
///
/// # Errors
/// Returns `InvalidArg` when neither format matches.
pub fn parse_backend_timestamp(raw: &str) -> Result<i64, CandelaError> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.timestamp_millis());
    }
    let naive = s.strip_suffix('Z').unwrap_or(s);
    NaiveDateTime::parse_from_str(naive, "%Y-%m-%d %H:%M:%S%.f")
        .map(|dt| dt.and_utc().timestamp_millis())
        .map_err(|e| CandelaError::InvalidArg(format!("invalid timestamp '{raw}': {e}")))
}
