//! # Wiring
//!
//! Builds the pipeline from its collaborators.
//!
//! ```text
//! VoteSubmissionService ──► SessionStateCache ──► CacheBackend / SessionStore
//!          │            ──► DuplicateVoteGuard ──► CacheBackend / vote store
//!          └──────────────► VoteDispatcher ──► InMemoryVoteBroker
//!                                                     │
//! IngestionWorkerPool ──► VoteIngestionConsumer ◄─────┘
//!                              └──► vote store, VoteDispatcher (failures)
//! ```

use std::sync::Arc;

use shared_bus::InMemoryVoteBroker;
use shared_types::{SessionId, TimeSource, VoteChoice};
use tokio::sync::watch;
use tracing::{error, info};
use vp_01_session_cache::{SessionStateCache, SessionStore};
use vp_02_vote_guard::{DuplicateVoteGuard, PersistedVoteLookup};
use vp_03_vote_dispatcher::VoteDispatcher;
use vp_04_vote_ingestion::{
    IngestionError, IngestionWorkerPool, VoteIngestionConsumer, VoteRepository, WorkerPoolHandle,
};

use crate::adapters::CacheBackend;
use crate::container::{ConfigError, NodeConfig};
use crate::submission::{EligibilityOracle, SubmissionOutcome, VoteSubmissionService};

pub type NodeSessionCache<S> = SessionStateCache<CacheBackend, S>;
pub type NodeGuard<V> = DuplicateVoteGuard<CacheBackend, V>;
pub type NodeDispatcher = VoteDispatcher<InMemoryVoteBroker>;
pub type NodeConsumer<V> = VoteIngestionConsumer<V, NodeDispatcher>;
pub type NodeSubmission<S, V, O> =
    VoteSubmissionService<NodeSessionCache<S>, NodeGuard<V>, NodeDispatcher, O>;

/// A fully wired vote pipeline.
///
/// `S` is the authoritative session store, `V` the durable vote store and
/// `O` the eligibility oracle.
pub struct VoteNode<S, V, O>
where
    S: SessionStore + 'static,
    V: PersistedVoteLookup + VoteRepository + 'static,
    O: EligibilityOracle + 'static,
{
    config: NodeConfig,
    cache: Arc<CacheBackend>,
    broker: InMemoryVoteBroker,
    submission: NodeSubmission<S, V, O>,
    consumer: Arc<NodeConsumer<V>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl<S, V, O> VoteNode<S, V, O>
where
    S: SessionStore + 'static,
    V: PersistedVoteLookup + VoteRepository + 'static,
    O: EligibilityOracle + 'static,
{
    pub fn new(
        config: NodeConfig,
        sessions: Arc<S>,
        votes: Arc<V>,
        oracle: Arc<O>,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let cache = Arc::new(CacheBackend::from_config(&config.cache)?);
        let broker = InMemoryVoteBroker::with_retry_delay(config.broker.retry_delay);
        let dispatcher = Arc::new(VoteDispatcher::new(
            Arc::new(broker.clone()),
            config.dispatcher.clone(),
        ));

        let session_cache = Arc::new(SessionStateCache::new(
            Arc::clone(&cache),
            sessions,
            Arc::clone(&clock),
        ));
        let guard = Arc::new(DuplicateVoteGuard::new(Arc::clone(&cache), Arc::clone(&votes)));
        let submission = VoteSubmissionService::new(
            session_cache,
            guard,
            Arc::clone(&dispatcher),
            oracle,
            Arc::clone(&clock),
        );
        let consumer = Arc::new(VoteIngestionConsumer::new(votes, dispatcher, clock));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        info!(
            max_retries = config.dispatcher.max_retries,
            retry_delay_ms = config.broker.retry_delay.as_millis() as u64,
            "Vote pipeline wired"
        );

        Ok(Self {
            config,
            cache,
            broker,
            submission,
            consumer,
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// `submitVote`: one of accepted, duplicate, ineligible,
    /// unavailable-temporarily or session-invalid.
    pub async fn submit_vote(
        &self,
        session_id: SessionId,
        raw_voter_key: &str,
        choice: VoteChoice,
    ) -> SubmissionOutcome {
        self.submission.submit(session_id, raw_voter_key, choice).await
    }

    /// Start the ingestion worker pool. It runs until `shutdown`.
    pub fn start_ingestion(&self) -> Result<WorkerPoolHandle, IngestionError> {
        let pool = IngestionWorkerPool::new(
            Arc::new(self.broker.clone()),
            Arc::clone(&self.consumer),
            self.config.ingestion.clone(),
        )?;
        Ok(pool.spawn(self.shutdown_rx.clone()))
    }

    /// Signal every worker to stop after its current batch.
    pub fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn cache(&self) -> &CacheBackend {
        &self.cache
    }

    pub fn broker(&self) -> &InMemoryVoteBroker {
        &self.broker
    }

    pub fn consumer(&self) -> &Arc<NodeConsumer<V>> {
        &self.consumer
    }
}
