//! Ingestion configuration.

use crate::error::IngestionError;
use std::time::Duration;

/// Consumer and worker pool configuration
#[derive(Clone, Debug)]
pub struct IngestionConfig {
    /// Messages per batch
    pub batch_size: usize,
    /// Max wait while a batch fills
    pub receive_timeout: Duration,
    /// Workers that always run
    pub min_workers: usize,
    /// Upper bound under backlog
    pub max_workers: usize,
    /// How often the pool re-evaluates its size
    pub scale_interval: Duration,
    /// Consecutive empty polls after which an extra worker exits
    pub idle_polls_before_retire: u32,
    /// Pause after a broker or acknowledgment failure
    pub error_backoff: Duration,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            receive_timeout: Duration::from_millis(500),
            min_workers: 2,
            max_workers: 4,
            scale_interval: Duration::from_secs(1),
            idle_polls_before_retire: 10,
            error_backoff: Duration::from_secs(1),
        }
    }
}

impl IngestionConfig {
    pub fn validate(&self) -> Result<(), IngestionError> {
        if self.batch_size == 0 {
            return Err(IngestionError::InvalidConfig(
                "batch_size must be positive".into(),
            ));
        }
        if self.max_workers == 0 {
            return Err(IngestionError::InvalidConfig(
                "max_workers must be positive".into(),
            ));
        }
        if self.min_workers > self.max_workers {
            return Err(IngestionError::InvalidConfig(format!(
                "min_workers ({}) exceeds max_workers ({})",
                self.min_workers, self.max_workers
            )));
        }
        Ok(())
    }
}
