//! MessagePack codec for the backend's columnar chart payload.
//!
//! The payload is a map from column name to array. The timestamp column is
//! named `index` (or `timestamp`) and holds epoch milliseconds; every other
//! column holds nullable numbers.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{CandelaError, ColumnarTable};

/// Name of the timestamp column on the wire.
pub const INDEX_COLUMN: &str = "index";
/// Accepted alternative name for the timestamp column.
pub const TIMESTAMP_ALIAS: &str = "timestamp";

/// Decode a columnar payload.
///
/// Rows are sorted and deduplicated (later duplicates win), so a payload
/// stitched from overlapping windows still yields a well-formed table. An
/// empty byte slice decodes to an empty table.
///
/// # Errors
/// Returns `Data` when the bytes are not a MessagePack map of arrays, the
/// timestamp column is missing or holds nulls/non-integral values, or a column
/// length differs from the index length.
pub fn decode_table(bytes: &[u8]) -> Result<ColumnarTable, CandelaError> {
    if bytes.is_empty() {
        return Ok(ColumnarTable::default());
    }
    let mut raw: BTreeMap<String, Vec<Option<f64>>> = rmp_serde::from_slice(bytes)
        .map_err(|e| CandelaError::Data(format!("malformed chart payload: {e}")))?;

    let index_col = raw
        .remove(INDEX_COLUMN)
        .or_else(|| raw.remove(TIMESTAMP_ALIAS))
        .ok_or_else(|| CandelaError::Data("chart payload has no index column".into()))?;
    raw.remove(TIMESTAMP_ALIAS);

    let index = index_col
        .into_iter()
        .enumerate()
        .map(|(i, v)| match v {
            Some(ts) if ts.fract() == 0.0 && ts.is_finite() => Ok(ts as i64),
            _ => Err(CandelaError::Data(format!(
                "index value at row {i} is not an integer timestamp"
            ))),
        })
        .collect::<Result<Vec<i64>, _>>()?;

    #[cfg(feature = "tracing")]
    let raw_rows = index.len();
    let table = ColumnarTable::new(index, raw)?;
    #[cfg(feature = "tracing")]
    if table.len() < raw_rows {
        tracing::debug!(
            raw_rows,
            rows = table.len(),
            "collapsed duplicate timestamps in chart payload"
        );
    }
    Ok(table)
}

#[derive(Serialize)]
#[serde(untagged)]
enum WireColumn<'a> {
    Index(&'a [i64]),
    Values(&'a [Option<f64>]),
}

/// Encode a table into the wire format understood by [`decode_table`].
///
/// # Errors
/// Returns `Data` if MessagePack serialization fails.
pub fn encode_table(table: &ColumnarTable) -> Result<Vec<u8>, CandelaError> {
    let mut wire: BTreeMap<&str, WireColumn<'_>> = BTreeMap::new();
    wire.insert(INDEX_COLUMN, WireColumn::Index(table.index()));
    for (name, col) in table.columns() {
        wire.insert(name.as_str(), WireColumn::Values(col));
    }
    rmp_serde::to_vec(&wire).map_err(|e| CandelaError::Data(e.to_string()))
}
