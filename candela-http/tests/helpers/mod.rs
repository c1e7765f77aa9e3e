#![allow(dead_code)]

use serde_json::{Value, json};

pub fn metadata_body() -> Value {
    json!({
        "asset_info": {
            "AAPL-Stocks": {
                "asset": { "id": "AAPL-Stocks", "ticker": "AAPL", "asset_class": "Stocks" },
                "start_date": "2024-01-01",
                "end_date": "2024-06-30",
                "timeframes": [
                    "1D",
                    { "timeframe": "1h", "absolute_start_ms": 1000, "absolute_end_ms": 9000 }
                ]
            }
        }
    })
}

pub fn page_body(page: u32, total: u32) -> Value {
    json!({
        "items": [{
            "asset_id": "AAPL-Stocks",
            "open_datetime": "2024-07-30 00:00:00.000000000Z",
            "close_datetime": "2024-07-31 00:00:00.000000000Z",
            "side": "Long",
            "status": "WIN"
        }],
        "page": page,
        "total": total
    })
}
