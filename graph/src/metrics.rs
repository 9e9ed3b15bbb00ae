//! Counters for rate graph activity.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Rate graph metrics.
#[derive(Debug, Default)]
pub struct Metrics {
    /// Quotes that changed the rate store.
    pub quotes_applied: AtomicU64,
    /// Quotes rejected by validation.
    pub quotes_rejected: AtomicU64,
    /// Quotes discarded as older than the stored observation.
    pub quotes_discarded: AtomicU64,
    /// Vertices registered.
    pub vertices_registered: AtomicU64,
    /// Path table rebuilds.
    pub rebuilds: AtomicU64,
    /// Best-rate queries answered.
    pub queries: AtomicU64,
    /// Queries naming an unregistered vertex.
    pub queries_not_found: AtomicU64,
    /// Queries whose route reaches a gaining cycle.
    pub queries_arbitrage: AtomicU64,
}

impl Metrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a quote that mutated the store.
    pub fn quote_applied(&self) {
        self.quotes_applied.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejected quote.
    pub fn quote_rejected(&self) {
        self.quotes_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a discarded out-of-order quote.
    pub fn quote_discarded(&self) {
        self.quotes_discarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record newly registered vertices.
    pub fn vertices_registered(&self, count: u64) {
        self.vertices_registered.fetch_add(count, Ordering::Relaxed);
    }

    /// Record a path table rebuild.
    pub fn rebuild(&self) {
        self.rebuilds.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an answered query.
    pub fn query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a query for an unknown vertex.
    pub fn query_not_found(&self) {
        self.queries_not_found.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a query refused because of a gaining cycle.
    pub fn query_arbitrage(&self) {
        self.queries_arbitrage.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            quotes_applied: self.quotes_applied.load(Ordering::Relaxed),
            quotes_rejected: self.quotes_rejected.load(Ordering::Relaxed),
            quotes_discarded: self.quotes_discarded.load(Ordering::Relaxed),
            vertices_registered: self.vertices_registered.load(Ordering::Relaxed),
            rebuilds: self.rebuilds.load(Ordering::Relaxed),
            queries: self.queries.load(Ordering::Relaxed),
            queries_not_found: self.queries_not_found.load(Ordering::Relaxed),
            queries_arbitrage: self.queries_arbitrage.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`Metrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub quotes_applied: u64,
    pub quotes_rejected: u64,
    pub quotes_discarded: u64,
    pub vertices_registered: u64,
    pub rebuilds: u64,
    pub queries: u64,
    pub queries_not_found: u64,
    pub queries_arbitrage: u64,
}

impl MetricsSnapshot {
    /// Serialize as a JSON object.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_counts() {
        let metrics = Metrics::new();
        metrics.quote_applied();
        metrics.quote_applied();
        metrics.quote_discarded();
        metrics.vertices_registered(2);
        metrics.rebuild();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.quotes_applied, 2);
        assert_eq!(snapshot.quotes_discarded, 1);
        assert_eq!(snapshot.vertices_registered, 2);
        assert_eq!(snapshot.rebuilds, 1);
        assert_eq!(snapshot.queries, 0);
    }

    #[test]
    fn test_snapshot_json() {
        let json = Metrics::new().snapshot().to_json();
        assert!(json.contains("\"rebuilds\":0"));
    }
}
