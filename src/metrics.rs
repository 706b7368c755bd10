//! Observability metrics: search latency and throughput counters.

use std::time::Duration;

/// Collects runtime metrics for the serving process.
///
/// Held behind the server's lock; the engine itself stays lock-free.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    search_latencies_us: Vec<f64>,
    total_searches: u64,
    total_errors: u64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed search with its duration.
    pub fn record_search(&mut self, duration: Duration) {
        self.total_searches += 1;
        self.search_latencies_us.push(duration.as_micros() as f64);
    }

    /// Record a failed request.
    pub fn record_error(&mut self) {
        self.total_errors += 1;
    }

    pub fn total_searches(&self) -> u64 {
        self.total_searches
    }

    pub fn total_errors(&self) -> u64 {
        self.total_errors
    }

    /// Average search latency in microseconds.
    pub fn avg_search_latency_us(&self) -> f64 {
        if self.search_latencies_us.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.search_latencies_us.iter().sum();
        sum / self.search_latencies_us.len() as f64
    }

    /// A percentile of search latency (e.g. 50.0, 95.0, 99.0).
    pub fn percentile_search_latency_us(&self, percentile: f64) -> f64 {
        if self.search_latencies_us.is_empty() {
            return 0.0;
        }

        let mut sorted = self.search_latencies_us.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let index = ((percentile / 100.0) * (sorted.len() - 1) as f64).round() as usize;
        sorted[index.min(sorted.len() - 1)]
    }
}
