//! Configuration types shared across the cache, orchestrator and sources.

use serde::{Deserialize, Serialize};

/// Bar-count padding applied around selected trades.
///
/// Padding is expressed in bars so the backend, which owns resampling, can
/// satisfy it exactly regardless of calendar gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaddingConfig {
    /// Bars to include before the earliest trade open.
    pub front_pad_units: u64,
    /// Bars to include after the latest trade close.
    pub back_pad_units: u64,
    /// Bars of baseline context when no trade is selected.
    pub baseline_units: u64,
}

impl PaddingConfig {
    /// Smallest payloads; for performance-critical views.
    pub const MINIMAL: Self = Self {
        front_pad_units: 25,
        back_pad_units: 25,
        baseline_units: 400,
    };
    /// Light context around trades.
    pub const CONSERVATIVE: Self = Self {
        front_pad_units: 50,
        back_pad_units: 50,
        baseline_units: 800,
    };
    /// Balanced default.
    pub const STANDARD: Self = Self {
        front_pad_units: 100,
        back_pad_units: 100,
        baseline_units: 1500,
    };
    /// Maximum context.
    pub const AGGRESSIVE: Self = Self {
        front_pad_units: 200,
        back_pad_units: 200,
        baseline_units: 3000,
    };

    /// Look up a named profile (case-insensitive).
    #[must_use]
    pub fn profile(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "MINIMAL" => Some(Self::MINIMAL),
            "CONSERVATIVE" => Some(Self::CONSERVATIVE),
            "STANDARD" => Some(Self::STANDARD),
            "AGGRESSIVE" => Some(Self::AGGRESSIVE),
            _ => None,
        }
    }
}

impl Default for PaddingConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl core::fmt::Display for PaddingConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Front: {} units, Back: {} units, Baseline: {} units",
            self.front_pad_units, self.back_pad_units, self.baseline_units
        )
    }
}

/// Budgets for the range cache store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Upper bound on the estimated footprint of all entries, in bytes.
    pub max_bytes: u64,
    /// Upper bound on the number of series holding data. Bounds-only
    /// placeholders do not count.
    pub max_entries: usize,
    /// Eviction never shrinks the store below this many entries.
    pub min_entries: usize,
    /// Estimated bytes per table cell used for sizing.
    pub bytes_per_cell: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_bytes: 50 * 1024 * 1024,
            max_entries: 10,
            min_entries: 1,
            bytes_per_cell: 8,
        }
    }
}

/// Retry policy for chart-data fetches.
///
/// Delay for attempt `n` (0-based) is `min_backoff_ms * factor^n`, capped at
/// `max_backoff_ms`, plus up to `jitter_percent` of random jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first failed attempt.
    pub max_retries: u32,
    /// Minimum backoff delay in milliseconds.
    pub min_backoff_ms: u64,
    /// Maximum backoff delay in milliseconds.
    pub max_backoff_ms: u64,
    /// Exponential factor to increase delay after each failure (>= 1).
    pub factor: u32,
    /// Random jitter percentage [0, 100] added to each delay.
    pub jitter_percent: u8,
}

impl RetryConfig {
    /// A policy that never retries.
    pub const NONE: Self = Self {
        max_retries: 0,
        min_backoff_ms: 0,
        max_backoff_ms: 0,
        factor: 1,
        jitter_percent: 0,
    };

    /// Base delay before retry number `attempt` (0-based), without jitter.
    #[must_use]
    pub fn base_delay_ms(&self, attempt: u32) -> u64 {
        let factor = u64::from(self.factor.max(1));
        let mut delay = self.min_backoff_ms;
        for _ in 0..attempt {
            delay = delay.saturating_mul(factor);
            if delay >= self.max_backoff_ms {
                break;
            }
        }
        delay.min(self.max_backoff_ms.max(self.min_backoff_ms))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            min_backoff_ms: 500,
            max_backoff_ms: 4_000,
            factor: 2,
            jitter_percent: 20,
        }
    }
}

/// Tunables for the viewport controller's prefetch heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Fraction of the cached span treated as the "near the edge" margin.
    pub prefetch_ratio: f64,
    /// Multiple of the viewport width requested beyond each side on expansion.
    pub expansion_factor: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            prefetch_ratio: 0.5,
            expansion_factor: 2.0,
        }
    }
}

/// Global configuration for the `Candela` orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandelaConfig {
    /// Cache budgets.
    pub cache: CacheConfig,
    /// Padding applied around selected trades.
    pub padding: PaddingConfig,
    /// Retry policy for chart-data fetches.
    pub retry: RetryConfig,
    /// Viewport prefetch tunables.
    pub viewport: ViewportConfig,
}
