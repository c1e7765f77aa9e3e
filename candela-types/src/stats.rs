use serde::{Deserialize, Serialize};

/// Point-in-time summary of the range cache store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of series held.
    pub total_entries: usize,
    /// Estimated footprint of all entries in bytes.
    pub total_bytes: u64,
    /// Configured byte budget.
    pub max_bytes: u64,
    /// Rough hit ratio: every access beyond an entry's first counts as a hit.
    pub hit_rate: f64,
}
