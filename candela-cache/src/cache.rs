use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use candela_core::timeseries::ranges;
use candela_core::{
    CacheConfig, CacheStats, ColumnarTable, DataRange, FetchRequest, SeriesKey,
};

/// One cached series: its merged table and the spans that table covers.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    data: Arc<ColumnarTable>,
    loaded_ranges: Vec<DataRange>,
    absolute_bounds: Option<DataRange>,
    size: u64,
    access_count: u64,
    last_accessed: u64,
    updated_at: Instant,
}

impl CacheEntry {
    fn placeholder(bounds: DataRange, tick: u64) -> Self {
        Self {
            data: Arc::new(ColumnarTable::default()),
            loaded_ranges: Vec::new(),
            absolute_bounds: Some(bounds),
            size: 0,
            access_count: 0,
            last_accessed: tick,
            updated_at: Instant::now(),
        }
    }

    /// Merged table for the series.
    #[must_use]
    pub fn data(&self) -> &Arc<ColumnarTable> {
        &self.data
    }

    /// Normalized list of spans merged into `data`.
    #[must_use]
    pub fn loaded_ranges(&self) -> &[DataRange] {
        &self.loaded_ranges
    }

    /// Hard extent of the series, when the backend reported one.
    #[must_use]
    pub const fn absolute_bounds(&self) -> Option<DataRange> {
        self.absolute_bounds
    }

    /// True once any span has been merged; false for bounds-only placeholders.
    #[must_use]
    pub fn has_data(&self) -> bool {
        !self.loaded_ranges.is_empty()
    }

    /// Estimated footprint in bytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Number of reads and writes that touched this entry.
    #[must_use]
    pub const fn access_count(&self) -> u64 {
        self.access_count
    }

    /// When the entry's data last changed.
    #[must_use]
    pub const fn updated_at(&self) -> Instant {
        self.updated_at
    }
}

/// Result of [`RangeCache::cache_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// The table was merged and the entry now holds `rows` rows over `ranges` spans.
    Stored {
        /// Rows in the merged table.
        rows: usize,
        /// Loaded spans after coalescing.
        ranges: usize,
        /// Entries evicted to make room.
        evicted: usize,
    },
    /// The table was empty; nothing changed.
    Ignored,
    /// The merged entry would not fit even after eviction; nothing changed
    /// for this series.
    Rejected {
        /// Estimated size of the merged entry.
        needed: u64,
        /// Configured byte budget.
        budget: u64,
    },
}

/// Range-aware store of chart tables keyed by series.
///
/// Behavior and trade-offs:
/// - Each series holds one merged table plus the normalized list of spans it
///   covers, so gaps between fetched windows are tracked exactly.
/// - Merges are last-write-wins per timestamp.
/// - Eviction is LRU by last access, bounded by a byte budget and an entry
///   budget; caching is best-effort and never fails loudly.
/// - No TTL: entries live until evicted or cleared.
#[derive(Debug)]
pub struct RangeCache {
    entries: HashMap<SeriesKey, CacheEntry>,
    cfg: CacheConfig,
    total_bytes: u64,
    clock: u64,
}

impl Default for RangeCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl RangeCache {
    /// Create an empty store with the given budgets.
    #[must_use]
    pub fn new(cfg: CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            cfg,
            total_bytes: 0,
            clock: 0,
        }
    }

    /// Configured budgets.
    #[must_use]
    pub const fn config(&self) -> &CacheConfig {
        &self.cfg
    }

    /// Number of series held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no series is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all entry sizes in bytes.
    #[must_use]
    pub const fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Borrow the entry for a series without touching its recency.
    #[must_use]
    pub fn entry(&self, key: &SeriesKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn estimate_size(&self, table: &ColumnarTable) -> u64 {
        let cells = (table.len() as u64).saturating_mul(table.width() as u64 + 1);
        cells.saturating_mul(self.cfg.bytes_per_cell)
    }

    /// Merge `table` into the entry for `request`'s series.
    ///
    /// The table's `[first, last]` span is added to the loaded ranges. If the
    /// existing table is inconsistent it is replaced and the loaded ranges
    /// restart from the new span. When the merged entry would exceed a budget,
    /// least-recently-used entries of other series are evicted until it fits.
    /// If it cannot fit without shrinking the store below the entry floor, the
    /// call is a no-op returning [`CacheOutcome::Rejected`] and nothing is
    /// evicted.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "candela::cache::cache_data",
            skip(self, request, table),
            fields(series = %request.series_key(), rows = table.len()),
        )
    )]
    pub fn cache_data(&mut self, request: &FetchRequest, table: &ColumnarTable) -> CacheOutcome {
        let Some(span) = table.span() else {
            return CacheOutcome::Ignored;
        };
        let key = request.series_key();

        let (merged, loaded, bounds) = match self.entries.get(&key) {
            Some(existing) if existing.data.is_consistent() => (
                existing.data.merge(table),
                ranges::insert(&existing.loaded_ranges, span),
                existing.absolute_bounds,
            ),
            Some(existing) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(series = %key, "existing table inconsistent; replacing");
                (
                    ColumnarTable::default().merge(table),
                    vec![span],
                    existing.absolute_bounds,
                )
            }
            None => (ColumnarTable::default().merge(table), vec![span], None),
        };

        let new_size = self.estimate_size(&merged);
        let budget = self.cfg.max_bytes;
        let victims = match self.plan_eviction(&key, new_size) {
            Some(victims) => victims,
            None => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    series = %key,
                    needed = new_size,
                    budget,
                    "cannot cache data: would exceed memory limits"
                );
                return CacheOutcome::Rejected {
                    needed: new_size,
                    budget,
                };
            }
        };
        let evicted = victims.len();
        for victim in victims {
            if let Some(e) = self.entries.remove(&victim) {
                self.total_bytes = self.total_bytes.saturating_sub(e.size);
                #[cfg(feature = "tracing")]
                tracing::debug!(evicted = %victim, bytes = e.size, "evicted LRU entry");
            }
        }

        let tick = self.tick();
        let rows = merged.len();
        let range_count = loaded.len();
        let prior = self.entries.remove(&key);
        let access_count = prior.as_ref().map_or(0, |e| e.access_count) + 1;
        if let Some(prior) = prior {
            self.total_bytes = self.total_bytes.saturating_sub(prior.size);
        }
        self.total_bytes = self.total_bytes.saturating_add(new_size);
        self.entries.insert(
            key,
            CacheEntry {
                data: Arc::new(merged),
                loaded_ranges: loaded,
                absolute_bounds: bounds,
                size: new_size,
                access_count,
                last_accessed: tick,
                updated_at: Instant::now(),
            },
        );

        #[cfg(feature = "tracing")]
        tracing::debug!(rows, ranges = range_count, evicted, "merged into cache");

        CacheOutcome::Stored {
            rows,
            ranges: range_count,
            evicted,
        }
    }

    /// Pick the entries to evict so `key` can hold `new_size` bytes.
    ///
    /// Only entries with loaded data are candidates and count toward
    /// `max_entries`; bounds-only placeholders are free and never evicted.
    /// Returns `None` when the entry cannot fit without dropping below the
    /// entry floor, in which case nothing may be evicted.
    fn plan_eviction(&self, key: &SeriesKey, new_size: u64) -> Option<Vec<SeriesKey>> {
        let budget = self.cfg.max_bytes;
        if new_size > budget {
            return None;
        }
        let mut candidates: Vec<(&SeriesKey, &CacheEntry)> = self
            .entries
            .iter()
            .filter(|(k, e)| *k != key && e.has_data())
            .collect();
        candidates.sort_by_key(|(_, e)| e.last_accessed);

        let current = self.entries.get(key).map_or(0, |e| e.size);
        let mut bytes = self
            .total_bytes
            .saturating_sub(current)
            .saturating_add(new_size);
        // the incoming entry counts once it is stored
        let mut held = candidates.len() + 1;
        let mut victims = Vec::new();
        let mut queue = candidates.into_iter();

        while held > self.cfg.max_entries.max(1) {
            let Some((k, e)) = queue.next() else { break };
            bytes = bytes.saturating_sub(e.size);
            held -= 1;
            victims.push(k.clone());
        }
        while bytes > budget && held > self.cfg.min_entries {
            let Some((k, e)) = queue.next() else { break };
            bytes = bytes.saturating_sub(e.size);
            held -= 1;
            victims.push(k.clone());
        }
        (bytes <= budget).then_some(victims)
    }

    /// The merged table for `request`'s series.
    ///
    /// Returns `None` when the series is unknown or holds no loaded range (a
    /// bounds-only placeholder). A hit refreshes the entry's recency.
    pub fn get_cached_data(&mut self, request: &FetchRequest) -> Option<Arc<ColumnarTable>> {
        let tick = self.tick();
        let entry = self.entries.get_mut(&request.series_key())?;
        if !entry.has_data() {
            return None;
        }
        entry.access_count += 1;
        entry.last_accessed = tick;
        Some(Arc::clone(&entry.data))
    }

    /// Loaded spans for `request`'s series (empty when unknown).
    #[must_use]
    pub fn get_loaded_ranges(&self, request: &FetchRequest) -> Vec<DataRange> {
        self.entries
            .get(&request.series_key())
            .map(|e| e.loaded_ranges.clone())
            .unwrap_or_default()
    }

    /// True iff the series has no entry at all.
    ///
    /// A bounds-only placeholder counts as present.
    #[must_use]
    pub fn needs_fetch(&self, request: &FetchRequest) -> bool {
        !self.entries.contains_key(&request.series_key())
    }

    /// Sub-ranges of `target` that still need fetching.
    ///
    /// `target` is first clamped to the series' absolute bounds; a target
    /// entirely outside the bounds needs nothing.
    #[must_use]
    pub fn needs_range_expansion(&self, request: &FetchRequest, target: DataRange) -> Vec<DataRange> {
        let entry = self.entries.get(&request.series_key());
        let clamped = match entry.and_then(|e| e.absolute_bounds) {
            Some(bounds) => match target.intersect(&bounds) {
                Some(r) => r,
                None => return Vec::new(),
            },
            None => target,
        };
        let loaded = entry.map_or(&[][..], |e| e.loaded_ranges.as_slice());
        ranges::missing(loaded, clamped)
    }

    /// Record the absolute extent of a series.
    ///
    /// Creates an empty placeholder when the series is unknown; otherwise
    /// updates the bounds in place. Placeholders hold no bytes and do not
    /// count toward `max_entries`, so they survive eviction.
    pub fn set_absolute_bounds(&mut self, request: &FetchRequest, bounds: DataRange) {
        let tick = self.tick();
        self.entries
            .entry(request.series_key())
            .and_modify(|e| e.absolute_bounds = Some(bounds))
            .or_insert_with(|| CacheEntry::placeholder(bounds, tick));
    }

    /// Smallest span containing every loaded range of the series.
    #[must_use]
    pub fn cached_bounds(&self, request: &FetchRequest) -> Option<DataRange> {
        self.entries
            .get(&request.series_key())
            .and_then(|e| ranges::envelope(&e.loaded_ranges))
    }

    /// Drop one series.
    pub fn remove(&mut self, key: &SeriesKey) -> bool {
        match self.entries.remove(key) {
            Some(e) => {
                self.total_bytes = self.total_bytes.saturating_sub(e.size);
                true
            }
            None => false,
        }
    }

    /// Drop everything.
    pub fn clear_cache(&mut self) {
        self.entries.clear();
        self.total_bytes = 0;
    }

    /// Drop every series belonging to `campaign_id`.
    pub fn clear_strategy_cache(&mut self, campaign_id: &str) {
        let mut freed = 0;
        self.entries.retain(|k, e| {
            let drop = k.belongs_to(campaign_id);
            if drop {
                freed += e.size;
            }
            !drop
        });
        self.total_bytes = self.total_bytes.saturating_sub(freed);
    }

    /// Summary counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let total_accesses: u64 = self.entries.values().map(|e| e.access_count).sum();
        let hits = total_accesses.saturating_sub(self.entries.len() as u64);
        let hit_rate = if total_accesses > 0 {
            hits as f64 / total_accesses as f64
        } else {
            0.0
        };
        CacheStats {
            total_entries: self.entries.len(),
            total_bytes: self.total_bytes,
            max_bytes: self.cfg.max_bytes,
            hit_rate,
        }
    }
}
