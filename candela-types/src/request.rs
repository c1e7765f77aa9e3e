//! Backend chart-data request parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::range::DataRange;
use crate::series::SeriesKey;

/// Parameters for one chart-data request.
///
/// Three shapes are meaningful:
/// - explicit window: `from_ms` and `to_ms`;
/// - pivot window: `pivot` plus `pad_front`/`pad_back` bar counts;
/// - neither: the entire series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Campaign (strategy run) identifier.
    pub strategy_id: String,
    /// Asset identifier.
    pub asset_id: String,
    /// Timeframe label.
    pub timeframe: String,
    /// Inclusive window start (ms).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_ms: Option<i64>,
    /// Inclusive window end (ms).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_ms: Option<i64>,
    /// Anchor timestamp the bar paddings are measured from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot: Option<i64>,
    /// Bars requested before the pivot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pad_front: Option<u64>,
    /// Bars requested after the pivot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pad_back: Option<u64>,
}

impl FetchRequest {
    /// A request for the entire series identified by `series`.
    #[must_use]
    pub fn for_series(series: &SeriesKey) -> Self {
        Self {
            strategy_id: series.campaign_id.clone(),
            asset_id: series.asset_id.clone(),
            timeframe: series.timeframe.clone(),
            from_ms: None,
            to_ms: None,
            pivot: None,
            pad_front: None,
            pad_back: None,
        }
    }

    /// A request for an explicit window of `series`.
    #[must_use]
    pub fn for_range(series: &SeriesKey, range: DataRange) -> Self {
        Self {
            from_ms: Some(range.from),
            to_ms: Some(range.to),
            ..Self::for_series(series)
        }
    }

    /// The cache identity of this request (parameters beyond the triple are ignored).
    #[must_use]
    pub fn series_key(&self) -> SeriesKey {
        SeriesKey::new(&self.strategy_id, &self.asset_id, &self.timeframe)
    }

    /// True when no time constraint is set.
    #[must_use]
    pub const fn is_entire_series(&self) -> bool {
        self.from_ms.is_none()
            && self.to_ms.is_none()
            && self.pivot.is_none()
            && self.pad_front.is_none()
            && self.pad_back.is_none()
    }

    /// Stable identity over every field, used to collapse identical in-flight requests.
    #[must_use]
    pub fn dedup_key(&self) -> String {
        fn part<T: ToString>(v: Option<T>) -> String {
            v.map_or_else(|| "none".to_string(), |x| x.to_string())
        }
        format!(
            "{}_{}_{}_{}_{}_{}_{}_{}",
            self.strategy_id,
            self.asset_id,
            self.timeframe,
            part(self.from_ms),
            part(self.to_ms),
            part(self.pivot),
            part(self.pad_front),
            part(self.pad_back),
        )
    }

    /// Query-string pairs for the chart-data endpoint.
    ///
    /// The asset travels as `asset`; numeric fields are included only when set.
    #[must_use]
    pub fn to_query_pairs(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        out.insert("asset".to_string(), self.asset_id.clone());
        out.insert("timeframe".to_string(), self.timeframe.clone());
        let numeric = [
            ("from_ms", self.from_ms.map(|v| v.to_string())),
            ("to_ms", self.to_ms.map(|v| v.to_string())),
            ("pivot", self.pivot.map(|v| v.to_string())),
            ("pad_front", self.pad_front.map(|v| v.to_string())),
            ("pad_back", self.pad_back.map(|v| v.to_string())),
        ];
        for (name, value) in numeric {
            if let Some(v) = value {
                out.insert(name.to_string(), v);
            }
        }
        out
    }
}
