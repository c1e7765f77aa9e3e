use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{CandelaError, DataRange};

/// One nullable `f64` column.
pub type Column = Vec<Option<f64>>;

/// A columnar OHLCV/indicator table keyed by an epoch-ms index.
///
/// Well-formed tables have a strictly ascending `index` and every column the
/// same length as the index. Tables built through [`ColumnarTable::new`] or
/// returned by [`ColumnarTable::merge`] are always well-formed; tables
/// deserialized from elsewhere can be checked with
/// [`ColumnarTable::is_consistent`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnarTable {
    index: Vec<i64>,
    columns: BTreeMap<String, Column>,
}

impl ColumnarTable {
    /// Build a table, validating column lengths.
    ///
    /// Rows are sorted by timestamp; on duplicate timestamps the later row wins.
    ///
    /// # Errors
    /// Returns `Data` if any column's length differs from the index length.
    pub fn new(index: Vec<i64>, columns: BTreeMap<String, Column>) -> Result<Self, CandelaError> {
        if let Some((name, col)) = columns.iter().find(|(_, c)| c.len() != index.len()) {
            return Err(CandelaError::Data(format!(
                "column '{name}' has {} values, index has {}",
                col.len(),
                index.len()
            )));
        }
        let raw = Self { index, columns };
        if raw.is_consistent() {
            return Ok(raw);
        }
        Ok(Self::rebuild(raw.rows(), raw.columns.keys().cloned()))
    }

    /// Build a table without any validation.
    ///
    /// Used for tables received from untrusted sources that are checked later
    /// with [`ColumnarTable::is_consistent`].
    #[must_use]
    pub const fn from_parts_unchecked(index: Vec<i64>, columns: BTreeMap<String, Column>) -> Self {
        Self { index, columns }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when the table holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The timestamp index.
    #[must_use]
    pub fn index(&self) -> &[i64] {
        &self.index
    }

    /// A column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Column names in sorted order (excluding the index).
    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.keys().map(String::as_str)
    }

    /// All columns keyed by name.
    #[must_use]
    pub const fn columns(&self) -> &BTreeMap<String, Column> {
        &self.columns
    }

    /// Number of data columns (excluding the index).
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// `[first, last]` timestamp span, `None` when empty.
    #[must_use]
    pub fn span(&self) -> Option<DataRange> {
        let first = self.index.iter().copied().min()?;
        let last = self.index.iter().copied().max()?;
        Some(DataRange {
            from: first,
            to: last,
        })
    }

    /// True if the index is strictly ascending and every column matches its length.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.index.windows(2).all(|w| w[0] < w[1])
            && self.columns.values().all(|c| c.len() == self.index.len())
    }

    /// Merge `newer` on top of `self`.
    ///
    /// - Rows are keyed by timestamp; rows from `newer` replace rows of `self`
    ///   with the same timestamp, and later duplicates within `newer` win.
    /// - The output is sorted ascending with unique timestamps.
    /// - The column set is the union of both tables; cells a row never had are `None`.
    #[must_use]
    pub fn merge(&self, newer: &Self) -> Self {
        let names = self
            .columns
            .keys()
            .chain(newer.columns.keys())
            .cloned()
            .collect::<std::collections::BTreeSet<_>>();
        let rows = self.rows().chain(newer.rows());
        Self::rebuild(rows, names)
    }

    /// Rows whose timestamp falls in `range`.
    #[must_use]
    pub fn slice(&self, range: DataRange) -> Self {
        let start = self.index.partition_point(|&ts| ts < range.from);
        let end = self.index.partition_point(|&ts| ts <= range.to);
        let (start, end) = (start.min(end), end);
        Self {
            index: self.index[start..end].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|(name, col)| {
                    let hi = end.min(col.len());
                    let lo = start.min(hi);
                    (name.clone(), col[lo..hi].to_vec())
                })
                .collect(),
        }
    }

    fn rows(&self) -> impl Iterator<Item = (i64, BTreeMap<&str, Option<f64>>)> + '_ {
        self.index.iter().enumerate().map(move |(i, &ts)| {
            let row = self
                .columns
                .iter()
                .map(|(name, col)| (name.as_str(), col.get(i).copied().flatten()))
                .collect();
            (ts, row)
        })
    }

    fn rebuild<'a, R, N>(rows: R, names: N) -> Self
    where
        R: Iterator<Item = (i64, BTreeMap<&'a str, Option<f64>>)>,
        N: IntoIterator<Item = String>,
    {
        let mut by_ts: BTreeMap<i64, BTreeMap<&str, Option<f64>>> = BTreeMap::new();
        for (ts, row) in rows {
            by_ts.insert(ts, row);
        }
        let index: Vec<i64> = by_ts.keys().copied().collect();
        let columns = names
            .into_iter()
            .map(|name| {
                let col = by_ts
                    .values()
                    .map(|row| row.get(name.as_str()).copied().flatten())
                    .collect();
                (name, col)
            })
            .collect();
        Self { index, columns }
    }

    /// Convert into a polars `DataFrame` with an `index` column followed by data columns.
    ///
    /// # Errors
    /// Returns `Data` if polars rejects the column set.
    #[cfg(feature = "dataframe")]
    pub fn to_dataframe(&self) -> Result<polars::prelude::DataFrame, CandelaError> {
        use polars::prelude::{Column as PlColumn, DataFrame};

        let mut cols = Vec::with_capacity(self.columns.len() + 1);
        cols.push(PlColumn::new("index".into(), self.index.as_slice()));
        for (name, values) in &self.columns {
            cols.push(PlColumn::new(name.as_str().into(), values.as_slice()));
        }
        DataFrame::new(cols).map_err(|e| CandelaError::Data(e.to_string()))
    }
}
