//! Session counters and latency tracking for the scoring service.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

use crate::types::verdict::{Label, Verdict};

/// Metrics collector for the scoring session
pub struct SessionMetrics {
    /// Total requests scored
    pub requests_scored: AtomicU64,
    /// Requests flagged as fraud
    pub frauds_flagged: AtomicU64,
    /// Requests rejected because artifacts were unavailable
    pub requests_rejected: AtomicU64,
    /// Scoring times (in microseconds)
    scoring_times: RwLock<Vec<u64>>,
    /// Probability distribution buckets
    probability_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl SessionMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            requests_scored: AtomicU64::new(0),
            frauds_flagged: AtomicU64::new(0),
            requests_rejected: AtomicU64::new(0),
            scoring_times: RwLock::new(Vec::with_capacity(1000)),
            probability_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a scored request
    pub fn record_verdict(&self, scoring_time: Duration, verdict: &Verdict) {
        self.requests_scored.fetch_add(1, Ordering::Relaxed);
        if verdict.label == Label::Fraud {
            self.frauds_flagged.fetch_add(1, Ordering::Relaxed);
        }

        if let Ok(mut times) = self.scoring_times.write() {
            times.push(scoring_time.as_micros() as u64);
            // Keep only the most recent window for memory efficiency
            if times.len() > 10_000 {
                times.drain(0..5_000);
            }
        }

        let bucket = (verdict.probability * 10.0).min(9.0) as usize;
        if let Ok(mut buckets) = self.probability_buckets.write() {
            buckets[bucket] += 1;
        }
    }

    /// Record a rejected request
    pub fn record_rejection(&self) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Get scoring time statistics
    pub fn get_scoring_stats(&self) -> ScoringStats {
        let times = self.scoring_times.read().unwrap();
        if times.is_empty() {
            return ScoringStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ScoringStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Get current throughput (requests per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.requests_scored.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get the probability distribution buckets
    pub fn get_probability_distribution(&self) -> [u64; 10] {
        *self.probability_buckets.read().unwrap()
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let scored = self.requests_scored.load(Ordering::Relaxed);
        let flagged = self.frauds_flagged.load(Ordering::Relaxed);
        let rejected = self.requests_rejected.load(Ordering::Relaxed);
        let flag_rate = if scored > 0 {
            flagged as f64 / scored as f64 * 100.0
        } else {
            0.0
        };

        let stats = self.get_scoring_stats();
        let throughput = self.get_throughput();
        let distribution = self.get_probability_distribution();

        info!("══════════ SCORING SESSION SUMMARY ══════════");
        info!(
            "Requests scored: {} | Throughput: {:.1} req/s | Rejected: {}",
            scored, throughput, rejected
        );
        info!("Frauds flagged: {} ({:.1}%)", flagged, flag_rate);
        info!(
            "Scoring time (μs): mean={} p50={} p95={} p99={}",
            stats.mean_us, stats.p50_us, stats.p95_us, stats.p99_us
        );
        info!("Probability distribution:");
        let total: u64 = distribution.iter().sum();
        for (i, &count) in distribution.iter().enumerate() {
            let pct = if total > 0 {
                count as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            let bar: String = "█".repeat(((pct / 2.0) as usize).min(20));
            info!(
                "  {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                bar
            );
        }
        info!("═════════════════════════════════════════════");
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoring time statistics
#[derive(Debug, Default)]
pub struct ScoringStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Periodic reporter that prints session summaries
pub struct MetricsReporter {
    metrics: std::sync::Arc<SessionMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: std::sync::Arc<SessionMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = SessionMetrics::new();

        let safe = Verdict::new("req_1", Label::Safe, 0.07);
        let fraud = Verdict::new("req_2", Label::Fraud, 0.91);

        metrics.record_verdict(Duration::from_micros(120), &safe);
        metrics.record_verdict(Duration::from_micros(250), &fraud);
        metrics.record_rejection();

        assert_eq!(metrics.requests_scored.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.frauds_flagged.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.requests_rejected.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_probability_buckets() {
        let metrics = SessionMetrics::new();

        metrics.record_verdict(
            Duration::from_micros(100),
            &Verdict::new("req_1", Label::Safe, 0.07),
        );
        metrics.record_verdict(
            Duration::from_micros(100),
            &Verdict::new("req_2", Label::Fraud, 0.95),
        );

        let distribution = metrics.get_probability_distribution();
        assert_eq!(distribution[0], 1);
        assert_eq!(distribution[9], 1);
    }

    #[test]
    fn test_scoring_stats() {
        let metrics = SessionMetrics::new();
        for us in [100, 200, 300] {
            metrics.record_verdict(
                Duration::from_micros(us),
                &Verdict::new("req", Label::Safe, 0.1),
            );
        }

        let stats = metrics.get_scoring_stats();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.mean_us, 200);
        assert_eq!(stats.max_us, 300);
    }
}
