#![allow(dead_code)]

use std::collections::BTreeMap;

use candela_core::{ColumnarTable, FetchRequest, SeriesKey};

pub fn req(asset: &str) -> FetchRequest {
    FetchRequest::for_series(&SeriesKey::new("camp", asset, "1h"))
}

pub fn req_in(campaign: &str, asset: &str) -> FetchRequest {
    FetchRequest::for_series(&SeriesKey::new(campaign, asset, "1h"))
}

/// A single-column (`close`) table from `(ts, value)` rows.
pub fn closes(rows: &[(i64, f64)]) -> ColumnarTable {
    let index = rows.iter().map(|(ts, _)| *ts).collect();
    let mut columns = BTreeMap::new();
    columns.insert(
        "close".to_string(),
        rows.iter().map(|(_, v)| Some(*v)).collect(),
    );
    ColumnarTable::new(index, columns).expect("well-formed table")
}

/// A table of `n` evenly spaced rows starting at `start`.
pub fn span(start: i64, n: usize) -> ColumnarTable {
    let rows: Vec<(i64, f64)> = (0..n)
        .map(|i| (start + i64::try_from(i).unwrap() * 1_000, 1.0))
        .collect();
    closes(&rows)
}
