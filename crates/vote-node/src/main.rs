//! # Vote Node
//!
//! Entry point: loads configuration, wires the pipeline and runs the
//! ingestion worker pool until Ctrl+C.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (logging + metrics)
//! 2. Load and validate configuration from `VP_*` variables
//! 3. Open the session and vote stores
//! 4. Wire the pipeline and start the worker pool
//! 5. Wait for Ctrl+C, then drain the workers

use std::sync::Arc;

use anyhow::{Context, Result};
use shared_types::{SystemTimeSource, TimeSource};
use tracing::info;
use vote_node::adapters::ReferenceEligibilityOracle;
use vote_node::{NodeConfig, VoteNode};
use vote_telemetry::{init_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    init_telemetry(&telemetry).context("Failed to initialize telemetry")?;

    let config = NodeConfig::from_env().context("Failed to load configuration")?;
    let clock: Arc<dyn TimeSource> = Arc::new(SystemTimeSource);

    info!("===========================================");
    info!("  {} v{}", telemetry.service_name, env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    #[cfg(feature = "rocksdb")]
    let (sessions, votes) = {
        use vote_node::adapters::storage::RocksDbVoteStore;

        let store = Arc::new(
            RocksDbVoteStore::open_default(&config.storage.data_dir)
                .context("Failed to open vote store")?,
        );
        info!("Data Dir: {:?}", config.storage.data_dir);
        (Arc::clone(&store), store)
    };

    #[cfg(not(feature = "rocksdb"))]
    let (sessions, votes) = (
        Arc::new(vote_node::adapters::InMemorySessionStore::new(Arc::clone(&clock))),
        Arc::new(vote_node::adapters::InMemoryVoteStore::new()),
    );

    let node = VoteNode::new(
        config,
        sessions,
        votes,
        Arc::new(ReferenceEligibilityOracle::default()),
        clock,
    )
    .context("Failed to wire vote pipeline")?;

    let workers = node
        .start_ingestion()
        .context("Failed to start ingestion workers")?;

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    node.shutdown();
    workers
        .join()
        .await
        .context("Ingestion worker pool failed")?;
    info!("Shutdown complete");

    Ok(())
}
