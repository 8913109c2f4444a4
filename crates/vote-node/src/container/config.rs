//! # Node Configuration
//!
//! Unified configuration for the pipeline subsystems, overridable from the
//! environment at startup.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `VP_REDIS_URL` | unset (in-memory cache) |
//! | `VP_BATCH_SIZE` | 50 |
//! | `VP_RECEIVE_TIMEOUT_MS` | 500 |
//! | `VP_MIN_WORKERS` / `VP_MAX_WORKERS` | 2 / 4 |
//! | `VP_MAX_RETRIES` | 3 |
//! | `VP_RETRY_DELAY_MS` | 60000 |
//! | `VP_DATA_DIR` | `./data` |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use vp_03_vote_dispatcher::DispatcherConfig;
use vp_04_vote_ingestion::IngestionConfig;

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Cache / reservation store.
    pub cache: CacheConfig,
    /// Broker topology.
    pub broker: BrokerConfig,
    /// Retry routing.
    pub dispatcher: DispatcherConfig,
    /// Consumer batches and worker pool.
    pub ingestion: IngestionConfig,
    /// Durable storage.
    pub storage: StorageConfig,
}

impl NodeConfig {
    /// Defaults overridden by `VP_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.cache.redis_url = lookup("VP_REDIS_URL").filter(|url| !url.is_empty());

        if let Some(size) = parse(&lookup, "VP_BATCH_SIZE")? {
            config.ingestion.batch_size = size;
        }
        if let Some(millis) = parse(&lookup, "VP_RECEIVE_TIMEOUT_MS")? {
            config.ingestion.receive_timeout = Duration::from_millis(millis);
        }
        if let Some(min) = parse(&lookup, "VP_MIN_WORKERS")? {
            config.ingestion.min_workers = min;
        }
        if let Some(max) = parse(&lookup, "VP_MAX_WORKERS")? {
            config.ingestion.max_workers = max;
        }
        if let Some(retries) = parse(&lookup, "VP_MAX_RETRIES")? {
            config.dispatcher.max_retries = retries;
        }
        if let Some(millis) = parse(&lookup, "VP_RETRY_DELAY_MS")? {
            config.broker.retry_delay = Duration::from_millis(millis);
        }
        if let Some(dir) = lookup("VP_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ingestion
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.broker.retry_delay.is_zero() {
            return Err(ConfigError::Invalid(
                "retry delay must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn parse<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value }),
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has invalid value {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// `VP_REDIS_URL` is set but the binary was built without Redis support.
    #[error("Redis cache requested but the `redis` feature is disabled")]
    RedisUnsupported,

    #[error("Cache backend: {0}")]
    Cache(String),
}

/// Cache configuration.
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// Redis URL; the in-process cache is used when unset.
    pub redis_url: Option<String>,
}

/// Broker configuration.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Time a failed message waits in the retry holding area.
    pub retry_delay: Duration,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            retry_delay: shared_bus::DEFAULT_RETRY_DELAY,
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Data directory for the durable store.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}
