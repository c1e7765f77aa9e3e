use core::fmt;

use serde::{Deserialize, Serialize};

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Fallback bar width when a timeframe label cannot be understood.
pub const DEFAULT_MS_PER_BAR: i64 = MINUTE_MS;

/// Approximate width of one bar of `timeframe` in milliseconds.
///
/// Accepts labels of the form `<digits?><unit>` with optional whitespace
/// between count and unit; the count defaults to 1. Units are
/// case-insensitive:
///
/// | unit | aliases |
/// |------|---------|
/// | minute | `m`, `min`, `mins`, `minute`, `minutes` |
/// | hour | `h`, `hr`, `hour`, `hours` |
/// | day | `d`, `day`, `days` |
/// | week | `w`, `wk`, `week`, `weeks` |
/// | quarter (91 days) | `q`, `quarter` |
/// | month (30 days) | `mo`, `mon`, `month`, `months`, and a bare uppercase `M` |
/// | year (365 days) | `y`, `yr`, `year`, `years` |
///
/// Anything else, including a zero count, yields one minute. This never fails.
///
/// ```
/// use candela_core::ms_per_bar;
///
/// assert_eq!(ms_per_bar("15m"), 900_000);
/// assert_eq!(ms_per_bar("1D"), 86_400_000);
/// assert_eq!(ms_per_bar("1M"), 30 * 86_400_000);
/// assert_eq!(ms_per_bar("bogus"), 60_000);
/// ```
#[must_use]
pub fn ms_per_bar(timeframe: &str) -> i64 {
    let tf = timeframe.trim();
    let digits_end = tf
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(tf.len(), |(i, _)| i);
    let (digits, rest) = tf.split_at(digits_end);
    let rest = rest.trim_start();
    let unit_end = rest
        .char_indices()
        .find(|(_, c)| !c.is_ascii_alphabetic())
        .map_or(rest.len(), |(i, _)| i);
    let unit = &rest[..unit_end];
    if unit.is_empty() {
        return DEFAULT_MS_PER_BAR;
    }
    let count: i64 = if digits.is_empty() {
        1
    } else {
        match digits.parse() {
            Ok(n) if n > 0 => n,
            _ => return DEFAULT_MS_PER_BAR,
        }
    };

    let per_unit = if unit == "M" {
        30 * DAY_MS
    } else {
        match unit.to_ascii_lowercase().as_str() {
            "m" | "min" | "mins" | "minute" | "minutes" => MINUTE_MS,
            "h" | "hr" | "hour" | "hours" => HOUR_MS,
            "d" | "day" | "days" => DAY_MS,
            "w" | "wk" | "week" | "weeks" => 7 * DAY_MS,
            "q" | "quarter" => 91 * DAY_MS,
            "mo" | "mon" | "month" | "months" => 30 * DAY_MS,
            "y" | "yr" | "year" | "years" => 365 * DAY_MS,
            _ => return DEFAULT_MS_PER_BAR,
        }
    };
    count.saturating_mul(per_unit)
}

/// Number of whole or partial bars of `timeframe` spanned by `[from, to]`.
///
/// Returns `ceil((to - from) / ms_per_bar)`, or 0 when `to <= from`.
#[must_use]
pub fn bars_between(from: i64, to: i64, timeframe: &str) -> u64 {
    let per_bar = ms_per_bar(timeframe);
    if to <= from || per_bar <= 0 {
        return 0;
    }
    let span = to.saturating_sub(from);
    let bars = span / per_bar + i64::from(span % per_bar != 0);
    u64::try_from(bars).unwrap_or(0)
}

/// A timeframe label such as `"5m"` or `"1D"`.
///
/// Construction never fails; unknown labels behave as one-minute bars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeframe(String);

impl Timeframe {
    /// Wrap a label.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The original label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Approximate bar width in milliseconds.
    #[must_use]
    pub fn ms_per_bar(&self) -> i64 {
        ms_per_bar(&self.0)
    }

    /// Bars spanned by `[from, to]` at this timeframe.
    #[must_use]
    pub fn bars_between(&self, from: i64, to: i64) -> u64 {
        bars_between(from, to, &self.0)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Timeframe {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for Timeframe {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
