//! # Vote Telemetry
//!
//! Logging and metrics shared by every vote-pipeline crate.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vote_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_telemetry(&TelemetryConfig::from_env())?;
//!     // Logs now flow through tracing; counters are exported by encode_metrics()
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `VP_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `VP_JSON_LOGS` | `false` | JSON formatted logs |
//! | `VP_SERVICE_NAME` | `vote-pipeline` | Service name in the startup log |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, ACTIVE_WORKERS, BATCHES_PROCESSED,
    BATCH_DURATION, DUPLICATES_SKIPPED, GUARD_RELEASES, GUARD_RESERVATIONS, MESSAGES_PUBLISHED,
    ROUTING_FAILURES, SESSION_CACHE_LOOKUPS, SESSION_CACHE_WRITE_FAILURES, SUBMISSIONS,
    VOTES_PERSISTED,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Register metrics, then install the logging subscriber.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)
}

/// Increment a counter, optionally selecting label values.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
