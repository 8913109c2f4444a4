//! # Node Container
//!
//! Configuration shared by every subsystem the node wires together.

pub mod config;

pub use config::{BrokerConfig, CacheConfig, ConfigError, NodeConfig, StorageConfig};
