//! candela-core
//!
//! Core types, traits, and utilities shared across the candela workspace.
//!
//! - `timeseries`: timeframe arithmetic, range algebra and the columnar table.
//! - `codec`: MessagePack decoding of the backend's columnar payload.
//! - `source`: the `ChartDataSource` trait implemented by backends.
//!
//! Foundational DTOs and the error type come from `candela-types` and are
//! re-exported here so downstream crates can depend on `candela-core` only.
#![warn(missing_docs)]

/// Columnar payload codec.
pub mod codec;
/// The `ChartDataSource` backend trait.
pub mod source;
/// Time-series utilities for timeframes, ranges and tables.
pub mod timeseries;

pub use candela_types::*;

pub use codec::{decode_table, encode_table};
pub use source::ChartDataSource;
pub use timeseries::ranges::{coalesce, envelope, insert as insert_range, missing as missing_ranges};
pub use timeseries::table::{Column, ColumnarTable};
pub use timeseries::timeframe::{DEFAULT_MS_PER_BAR, Timeframe, bars_between, ms_per_bar};
