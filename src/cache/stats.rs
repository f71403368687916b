//! Cache Statistics Module
//!
//! Tracks cache activity: hits, misses, type mismatches, evictions and flushes.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache activity counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Typed reads that found a value of the requested type
    pub hits: u64,
    /// Typed reads for a key with no entry
    pub misses: u64,
    /// Typed reads that found an entry of another type
    pub type_mismatches: u64,
    /// Entries removed to satisfy the count limit
    pub evictions: u64,
    /// Full clears triggered by lifecycle signals
    pub flushes: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses + type_mismatches), or 0.0 if no reads
    /// have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.type_mismatches;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_type_mismatch(&mut self) {
        self.type_mismatches += 1;
    }

    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    pub fn record_flush(&mut self) {
        self.flushes += 1;
    }

    // == Update Entry Count ==
    /// Updates the total entries count.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.type_mismatches, 0);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.flushes, 0);
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::new();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_all_hits() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        assert_eq!(stats.hit_rate(), 1.0);
    }

    #[test]
    fn test_hit_rate_counts_type_mismatches() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        stats.record_type_mismatch();
        stats.record_type_mismatch();
        assert_eq!(stats.hit_rate(), 0.25);
    }

    #[test]
    fn test_record_evictions_and_flushes() {
        let mut stats = CacheStats::new();
        stats.record_evictions(3);
        stats.record_evictions(0);
        stats.record_flush();
        assert_eq!(stats.evictions, 3);
        assert_eq!(stats.flushes, 1);
    }

    #[test]
    fn test_serializes_to_json() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.set_total_entries(4);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["hits"], 1);
        assert_eq!(json["total_entries"], 4);
    }
}
