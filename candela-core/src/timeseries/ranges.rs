//! Set algebra over loaded time ranges.
//!
//! A *normalized* range list is sorted ascending by `from`, pairwise disjoint,
//! and has a gap of more than 1 ms between consecutive ranges. Every function
//! here returns a normalized list.

use crate::DataRange;

/// Coalesce arbitrary ranges into a normalized list.
///
/// Ranges are sorted by `from` and any range whose start lies within 1 ms of
/// the previous range's end is folded into it.
#[must_use]
pub fn coalesce<I>(ranges: I) -> Vec<DataRange>
where
    I: IntoIterator<Item = DataRange>,
{
    let mut sorted: Vec<DataRange> = ranges.into_iter().collect();
    sorted.sort_unstable_by_key(|r| (r.from, r.to));

    let mut out: Vec<DataRange> = Vec::with_capacity(sorted.len());
    for r in sorted {
        match out.last_mut() {
            Some(prev) if r.from <= prev.to.saturating_add(1) => {
                prev.to = prev.to.max(r.to);
            }
            _ => out.push(r),
        }
    }
    out
}

/// Insert `range` into an already normalized list.
#[must_use]
pub fn insert(ranges: &[DataRange], range: DataRange) -> Vec<DataRange> {
    coalesce(ranges.iter().copied().chain(core::iter::once(range)))
}

/// Sub-ranges of `target` not covered by `loaded`.
///
/// `loaded` must be normalized. Returns an empty list when `target` is fully
/// covered. Returned gaps exclude the covered endpoints, so a gap between
/// `[0, 10]` and `[20, 30]` is `[11, 19]`.
#[must_use]
pub fn missing(loaded: &[DataRange], target: DataRange) -> Vec<DataRange> {
    let mut gaps = Vec::new();
    let mut cursor = target.from;
    for r in loaded {
        if r.to < cursor {
            continue;
        }
        if r.from > target.to {
            break;
        }
        if r.from > cursor {
            gaps.push(DataRange {
                from: cursor,
                to: r.from - 1,
            });
        }
        if r.to >= target.to {
            return gaps;
        }
        cursor = r.to + 1;
    }
    if cursor <= target.to {
        gaps.push(DataRange {
            from: cursor,
            to: target.to,
        });
    }
    gaps
}

/// True if `target` lies entirely within the union of `loaded`.
#[must_use]
pub fn covers(loaded: &[DataRange], target: DataRange) -> bool {
    missing(loaded, target).is_empty()
}

/// Smallest range containing every range in `ranges`.
#[must_use]
pub fn envelope(ranges: &[DataRange]) -> Option<DataRange> {
    let first = ranges.iter().map(|r| r.from).min()?;
    let last = ranges.iter().map(|r| r.to).max()?;
    Some(DataRange {
        from: first,
        to: last,
    })
}

/// True if the list is sorted, disjoint, and non-adjacent.
#[must_use]
pub fn is_normalized(ranges: &[DataRange]) -> bool {
    ranges.iter().all(|r| r.from <= r.to)
        && ranges
            .windows(2)
            .all(|w| w[1].from > w[0].to.saturating_add(1))
}
