//! Prometheus metrics for the vote pipeline.
//!
//! All metrics follow the naming convention: `vp_<stage>_<metric>_<unit>`
//!
//! Metrics live in a crate-local `REGISTRY`; they can be updated before
//! `register_metrics` runs but only appear in `encode_metrics` output after.

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge,
    Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Metrics registry for the vote pipeline
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // SUBMISSION
    // =========================================================================

    /// Submissions by outcome
    pub static ref SUBMISSIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("vp_submissions_total", "Vote submissions by outcome"),
        &["outcome"]  // accepted/duplicate/ineligible/unavailable/session_invalid
    ).expect("metric creation failed");

    // =========================================================================
    // SESSION STATE CACHE
    // =========================================================================

    /// Snapshot lookups by result
    pub static ref SESSION_CACHE_LOOKUPS: IntCounterVec = IntCounterVec::new(
        Opts::new("vp_session_cache_lookups_total", "Session snapshot lookups"),
        &["result"]  // hit/miss/cache_error
    ).expect("metric creation failed");

    /// Snapshot write-backs that failed and were swallowed
    pub static ref SESSION_CACHE_WRITE_FAILURES: IntCounter = IntCounter::new(
        "vp_session_cache_write_failures_total",
        "Snapshot cache writes that failed"
    ).expect("metric creation failed");

    // =========================================================================
    // DUPLICATE VOTE GUARD
    // =========================================================================

    /// Reservation attempts by path and result
    pub static ref GUARD_RESERVATIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("vp_guard_reservations_total", "Vote reservation attempts"),
        &["path", "result"]  // path: cache/degraded, result: reserved/duplicate/failed
    ).expect("metric creation failed");

    /// Reservations released after a failed publish
    pub static ref GUARD_RELEASES: IntCounter = IntCounter::new(
        "vp_guard_releases_total",
        "Vote reservations released"
    ).expect("metric creation failed");

    // =========================================================================
    // DISPATCHER
    // =========================================================================

    /// Messages published by destination
    pub static ref MESSAGES_PUBLISHED: IntCounterVec = IntCounterVec::new(
        Opts::new("vp_dispatcher_messages_published_total", "Vote messages published"),
        &["destination"]  // votes.create/votes.create.retry/votes.create.dlq
    ).expect("metric creation failed");

    /// Messages that could not be routed anywhere after a failure
    pub static ref ROUTING_FAILURES: IntCounter = IntCounter::new(
        "vp_dispatcher_routing_failures_total",
        "Failed messages that could not be republished"
    ).expect("metric creation failed");

    // =========================================================================
    // INGESTION
    // =========================================================================

    /// Batches processed by result
    pub static ref BATCHES_PROCESSED: IntCounterVec = IntCounterVec::new(
        Opts::new("vp_ingestion_batches_total", "Vote batches processed"),
        &["result"]  // persisted/failed
    ).expect("metric creation failed");

    /// New vote records written
    pub static ref VOTES_PERSISTED: IntCounter = IntCounter::new(
        "vp_ingestion_votes_persisted_total",
        "Vote records inserted"
    ).expect("metric creation failed");

    /// Records skipped by the uniqueness constraint
    pub static ref DUPLICATES_SKIPPED: IntCounter = IntCounter::new(
        "vp_ingestion_duplicates_skipped_total",
        "Vote records ignored as already persisted"
    ).expect("metric creation failed");

    /// Batch insert duration
    pub static ref BATCH_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "vp_ingestion_batch_duration_seconds",
            "Time spent persisting one batch"
        ).buckets(exponential_buckets(0.0005, 2.0, 12).expect("bucket layout"))
    ).expect("metric creation failed");

    /// Running ingestion workers
    pub static ref ACTIVE_WORKERS: IntGauge = IntGauge::new(
        "vp_ingestion_active_workers",
        "Number of running ingestion workers"
    ).expect("metric creation failed");
}

/// Register all metrics with `REGISTRY`. Safe to call more than once.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(SUBMISSIONS.clone()),
        Box::new(SESSION_CACHE_LOOKUPS.clone()),
        Box::new(SESSION_CACHE_WRITE_FAILURES.clone()),
        Box::new(GUARD_RESERVATIONS.clone()),
        Box::new(GUARD_RELEASES.clone()),
        Box::new(MESSAGES_PUBLISHED.clone()),
        Box::new(ROUTING_FAILURES.clone()),
        Box::new(BATCHES_PROCESSED.clone()),
        Box::new(VOTES_PERSISTED.clone()),
        Box::new(DUPLICATES_SKIPPED.clone()),
        Box::new(BATCH_DURATION.clone()),
        Box::new(ACTIVE_WORKERS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all registered metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_idempotent() {
        register_metrics().unwrap();
        register_metrics().unwrap();
    }

    #[test]
    fn test_counter_increment() {
        SUBMISSIONS.with_label_values(&["accepted"]).inc();
        assert!(SUBMISSIONS.with_label_values(&["accepted"]).get() >= 1);
    }

    #[test]
    fn test_encoded_output_names_metrics() {
        register_metrics().unwrap();
        MESSAGES_PUBLISHED.with_label_values(&["votes.create"]).inc();

        let text = encode_metrics().unwrap();
        assert!(text.contains("vp_dispatcher_messages_published_total"));
    }

    #[test]
    fn test_histogram_timer_observes_on_drop() {
        let before = BATCH_DURATION.get_sample_count();
        {
            let _timer = HistogramTimer::new(&BATCH_DURATION);
        }
        assert!(BATCH_DURATION.get_sample_count() > before);
    }
}
