//! Per-batch fetch statistics.
//!
//! A fresh [`FetchStats`] is created for every batch and handed to each
//! fetch task, so counters never leak between batches or between tests.
//! The frozen [`FetchStatsSnapshot`] travels with the batch results.

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Thread-safe accumulator for one batch.
///
/// # Example
///
/// ```
/// use globemap::stats::FetchStats;
///
/// let stats = FetchStats::new();
/// stats.record_cache_hit();
/// stats.record_network_fetch("a.tile.openstreetmap.org", 1024);
/// stats.record_retry();
///
/// let snapshot = stats.snapshot();
/// assert_eq!(snapshot.cache_hits, 1);
/// assert_eq!(snapshot.mirror_usage["a.tile.openstreetmap.org"], 1);
/// ```
#[derive(Debug)]
pub struct FetchStats {
    cache_hits: AtomicU64,
    network_fetches: AtomicU64,
    bytes_downloaded: AtomicU64,
    retries: AtomicU64,
    failures: AtomicU64,
    /// Successful network fetches per mirror host
    mirror_usage: DashMap<String, u64>,
    started: Instant,
}

/// Statistics of one finished batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchStatsSnapshot {
    /// Tiles served from disk
    pub cache_hits: u64,
    /// Tiles fetched over the network
    pub network_fetches: u64,
    /// Body bytes fetched over the network
    pub bytes_downloaded: u64,
    /// Extra attempts after an unreachable host
    pub retries: u64,
    /// Tiles abandoned
    pub failures: u64,
    /// Successful fetches per mirror host
    pub mirror_usage: BTreeMap<String, u64>,
    /// Wall time from batch start to snapshot
    pub elapsed_secs: f64,
}

impl FetchStats {
    pub fn new() -> Self {
        Self {
            cache_hits: AtomicU64::new(0),
            network_fetches: AtomicU64::new(0),
            bytes_downloaded: AtomicU64::new(0),
            retries: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            mirror_usage: DashMap::new(),
            started: Instant::now(),
        }
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful network fetch from `mirror`.
    pub fn record_network_fetch(&self, mirror: &str, bytes: usize) {
        self.network_fetches.fetch_add(1, Ordering::Relaxed);
        self.bytes_downloaded
            .fetch_add(bytes as u64, Ordering::Relaxed);
        *self.mirror_usage.entry(mirror.to_string()).or_insert(0) += 1;
    }

    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> FetchStatsSnapshot {
        FetchStatsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            network_fetches: self.network_fetches.load(Ordering::Relaxed),
            bytes_downloaded: self.bytes_downloaded.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            mirror_usage: self
                .mirror_usage
                .iter()
                .map(|entry| (entry.key().clone(), *entry.value()))
                .collect(),
            elapsed_secs: self.started.elapsed().as_secs_f64(),
        }
    }
}

impl Default for FetchStats {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchStatsSnapshot {
    /// Tiles that produced an image.
    pub fn delivered(&self) -> u64 {
        self.cache_hits + self.network_fetches
    }
}

impl fmt::Display for FetchStatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cached, {} fetched ({} bytes), {} retries, {} failed in {:.2}s",
            self.cache_hits,
            self.network_fetches,
            self.bytes_downloaded,
            self.retries,
            self.failures,
            self.elapsed_secs
        )
    }
}
