use std::collections::BTreeMap;

use candela_core::{Asset, AssetInfo, CampaignMetadata, TimeframeInfo};

use super::bars;

/// Campaign id served by the fixture data.
pub const DEMO_CAMPAIGN: &str = "demo";

const TIMEFRAMES: &[&str] = &["15m", "1h", "1D"];

fn asset(id: &str, name: &str, ticker: &str, class: &str) -> AssetInfo {
    AssetInfo {
        asset: Asset {
            id: id.to_string(),
            name: name.to_string(),
            ticker: ticker.to_string(),
            asset_class: class.to_string(),
            exchange: String::new(),
            currency: "USD".to_string(),
        },
        start_date: "2024-01-01".to_string(),
        end_date: String::new(),
        timeframes: TIMEFRAMES
            .iter()
            .map(|tf| {
                let b = bars::bounds(tf);
                TimeframeInfo::Bounded {
                    timeframe: (*tf).to_string(),
                    absolute_start_ms: b.from,
                    absolute_end_ms: b.to,
                }
            })
            .collect(),
    }
}

pub fn by_campaign(campaign_id: &str) -> Option<CampaignMetadata> {
    if campaign_id != DEMO_CAMPAIGN {
        return None;
    }
    let mut asset_info = BTreeMap::new();
    asset_info.insert(
        "AAPL-Stocks".to_string(),
        asset("AAPL-Stocks", "Apple Inc.", "AAPL", "Stocks"),
    );
    asset_info.insert(
        "BTC-Crypto".to_string(),
        asset("BTC-Crypto", "Bitcoin", "BTC", "Crypto"),
    );
    Some(CampaignMetadata { asset_info })
}
