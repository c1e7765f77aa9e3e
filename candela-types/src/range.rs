//! Inclusive millisecond time ranges.

use serde::{Deserialize, Serialize};

use crate::error::CandelaError;

/// A span of time `[from..=to]` in milliseconds since the Unix epoch.
///
/// Invariant: `from <= to`. Use [`DataRange::new`] to validate untrusted input
/// or [`DataRange::ordered`] to normalize swapped bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DataRange {
    /// Inclusive start timestamp (ms since epoch).
    pub from: i64,
    /// Inclusive end timestamp (ms since epoch).
    pub to: i64,
}

impl DataRange {
    /// Build a range, rejecting `from > to`.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the bounds are reversed.
    pub fn new(from: i64, to: i64) -> Result<Self, CandelaError> {
        if from > to {
            return Err(CandelaError::InvalidArg(format!(
                "range start {from} is after end {to}"
            )));
        }
        Ok(Self { from, to })
    }

    /// Build a range from two timestamps in either order.
    #[must_use]
    pub const fn ordered(a: i64, b: i64) -> Self {
        if a <= b {
            Self { from: a, to: b }
        } else {
            Self { from: b, to: a }
        }
    }

    /// Width of the range in milliseconds (`to - from`).
    #[must_use]
    pub const fn width(&self) -> i64 {
        self.to - self.from
    }

    /// True if `ts` falls inside the range.
    #[must_use]
    pub const fn contains(&self, ts: i64) -> bool {
        self.from <= ts && ts <= self.to
    }

    /// True if `other` lies entirely inside `self`.
    #[must_use]
    pub const fn covers(&self, other: &Self) -> bool {
        self.from <= other.from && other.to <= self.to
    }

    /// True if the ranges overlap or sit within 1 ms of each other.
    #[must_use]
    pub const fn touches(&self, other: &Self) -> bool {
        other.from <= self.to.saturating_add(1) && self.from <= other.to.saturating_add(1)
    }

    /// Intersection of two ranges, `None` when disjoint.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let from = self.from.max(other.from);
        let to = self.to.min(other.to);
        (from <= to).then_some(Self { from, to })
    }
}

impl core::fmt::Display for DataRange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{}..={}]", self.from, self.to)
    }
}
