//! Engine metrics and statistics tracking.

use crate::error::EngineError;
use crate::types::assessment::{AgreementTier, EnsembleReport};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for ensemble evaluations
pub struct EngineMetrics {
    /// Reports successfully produced
    pub reports_produced: AtomicU64,
    /// Evaluations that failed (malformed input or engine error)
    pub failures: AtomicU64,
    /// Reports whose upstream top entry disagreed with the local one
    pub upstream_mismatches: AtomicU64,
    /// Failures by error kind
    failures_by_kind: RwLock<HashMap<String, u64>>,
    /// Reports by agreement tier
    tiers: RwLock<HashMap<AgreementTier, u64>>,
    /// Evaluation times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Agreement percentages of recent reports
    agreements: RwLock<Vec<f64>>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl EngineMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            reports_produced: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            upstream_mismatches: AtomicU64::new(0),
            failures_by_kind: RwLock::new(HashMap::new()),
            tiers: RwLock::new(HashMap::new()),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            agreements: RwLock::new(Vec::with_capacity(1000)),
            start_time: Instant::now(),
        }
    }

    /// Record a produced report
    pub fn record_report(&self, report: &EnsembleReport, processing_time: Duration) {
        self.reports_produced.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only the most recent samples
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        if let Ok(mut tiers) = self.tiers.write() {
            *tiers.entry(report.agreement.tier).or_insert(0) += 1;
        }

        if let Ok(mut agreements) = self.agreements.write() {
            agreements.push(report.agreement.agreement_percentage);
            if agreements.len() > 1000 {
                agreements.drain(0..500);
            }
        }

        if matches!(&report.upstream_check, Some(check) if !check.agrees) {
            self.upstream_mismatches.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a failed evaluation
    pub fn record_failure(&self, kind: &str) {
        self.failures.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut by_kind) = self.failures_by_kind.write() {
            *by_kind.entry(kind.to_string()).or_insert(0) += 1;
        }
    }

    /// Record an engine error
    pub fn record_error(&self, error: &EngineError) {
        if matches!(error, EngineError::UpstreamMismatch { .. }) {
            self.upstream_mismatches.fetch_add(1, Ordering::Relaxed);
        }
        self.record_failure(error.kind());
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let times = match self.processing_times.read() {
            Ok(times) => times,
            Err(_) => return ProcessingStats::default(),
        };
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[((count as f64 * 0.95) as usize).min(count - 1)],
            p99_us: sorted[((count as f64 * 0.99) as usize).min(count - 1)],
            max_us: sorted[count - 1],
        }
    }

    /// Get average agreement percentage
    pub fn get_avg_agreement(&self) -> f64 {
        match self.agreements.read() {
            Ok(agreements) if !agreements.is_empty() => {
                agreements.iter().sum::<f64>() / agreements.len() as f64
            }
            _ => 0.0,
        }
    }

    /// Get reports by agreement tier
    pub fn get_tier_counts(&self) -> HashMap<AgreementTier, u64> {
        self.tiers.read().map(|t| t.clone()).unwrap_or_default()
    }

    /// Get failures by error kind
    pub fn get_failures_by_kind(&self) -> HashMap<String, u64> {
        self.failures_by_kind
            .read()
            .map(|f| f.clone())
            .unwrap_or_default()
    }

    /// Get current throughput (reports per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.reports_produced.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let reports = self.reports_produced.load(Ordering::Relaxed);
        let failures = self.failures.load(Ordering::Relaxed);
        let mismatches = self.upstream_mismatches.load(Ordering::Relaxed);
        let processing = self.get_processing_stats();
        let tiers = self.get_tier_counts();

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║            BREED CONSENSUS ENGINE - METRICS SUMMARY          ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Reports Produced: {:>8}  │  Throughput: {:>8.1} rep/s    ║",
            reports,
            self.get_throughput()
        );
        info!(
            "║ Failures:         {:>8}  │  Upstream Mismatches: {:>6}  ║",
            failures, mismatches
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Evaluation Time (μs): mean={:>5} p50={:>5} p95={:>5} p99={:>5} ║",
            processing.mean_us, processing.p50_us, processing.p95_us, processing.p99_us
        );
        info!(
            "║ Average Agreement: {:>5.1}%                                    ║",
            self.get_avg_agreement()
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Reports by Agreement Tier:                                   ║");
        for tier in [AgreementTier::High, AgreementTier::Moderate, AgreementTier::Low] {
            let count = tiers.get(&tier).copied().unwrap_or(0);
            let pct = if reports > 0 {
                (count as f64 / reports as f64) * 100.0
            } else {
                0.0
            };
            info!("║   {:10}: {:>6} ({:>5.1}%)                                ║", tier.as_str(), count, pct);
        }
        info!("╚══════════════════════════════════════════════════════════════╝");

        let by_kind = self.get_failures_by_kind();
        if !by_kind.is_empty() {
            info!("Failures by kind:");
            for (kind, count) in &by_kind {
                info!("  {}: {}", kind, count);
            }
        }
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Periodic metrics reporter
pub struct MetricsReporter {
    metrics: Arc<EngineMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<EngineMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}
