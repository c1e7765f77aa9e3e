//! candela-cache
//!
//! The range cache store: per-series merged chart tables, the spans they
//! cover, and LRU eviction under byte and entry budgets.
#![warn(missing_docs)]

mod cache;

pub use crate::cache::{CacheEntry, CacheOutcome, RangeCache};
