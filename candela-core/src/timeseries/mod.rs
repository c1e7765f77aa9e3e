//! Time-series utilities shared by sources, the cache and the orchestrator.
//!
//! Modules include:
//! - `timeframe`: bar widths and bar counts from timeframe labels
//! - `ranges`: coalescing and gap-finding over loaded ranges
//! - `table`: the columnar table and its last-write-wins merge
/// Normalized range lists: coalesce, insert, and gap-finding.
pub mod ranges;
/// Columnar chart table with merge and slicing.
pub mod table;
/// Timeframe label parsing and bar arithmetic.
pub mod timeframe;
