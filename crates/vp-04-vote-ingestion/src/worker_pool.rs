//! Elastic pool of ingestion workers.
//!
//! A supervisor keeps `min_workers` core workers alive and adds extra
//! workers, up to `max_workers`, while the main queue has a backlog. Extra
//! workers retire on their own after `idle_polls_before_retire` empty polls.

use crate::config::IngestionConfig;
use crate::domain::desired_workers;
use crate::error::IngestionError;
use crate::ports::inbound::VoteIngestionApi;
use shared_bus::{ConsumerChannel, VoteSource};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use vote_telemetry::ACTIVE_WORKERS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkerRole {
    /// Runs until shutdown.
    Core,
    /// Retires when idle.
    Extra,
}

/// Decrements the worker counters when a worker ends, panics included.
struct ActiveGuard {
    active: Arc<AtomicUsize>,
    core: Option<Arc<AtomicUsize>>,
}

impl ActiveGuard {
    fn enter(active: &Arc<AtomicUsize>, core: Option<&Arc<AtomicUsize>>) -> Self {
        active.fetch_add(1, Ordering::SeqCst);
        if let Some(core) = core {
            core.fetch_add(1, Ordering::SeqCst);
        }
        ACTIVE_WORKERS.inc();
        Self {
            active: Arc::clone(active),
            core: core.map(Arc::clone),
        }
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
        if let Some(core) = &self.core {
            core.fetch_sub(1, Ordering::SeqCst);
        }
        ACTIVE_WORKERS.dec();
    }
}

fn stopping(shutdown: &watch::Receiver<bool>) -> bool {
    // A dropped sender counts as shutdown.
    *shutdown.borrow() || shutdown.has_changed().is_err()
}

/// Worker pool over a vote source and an ingestion consumer.
pub struct IngestionWorkerPool<S, A>
where
    S: VoteSource + 'static,
    A: VoteIngestionApi + 'static,
{
    source: Arc<S>,
    consumer: Arc<A>,
    config: IngestionConfig,
}

impl<S, A> IngestionWorkerPool<S, A>
where
    S: VoteSource + 'static,
    A: VoteIngestionApi + 'static,
{
    pub fn new(
        source: Arc<S>,
        consumer: Arc<A>,
        config: IngestionConfig,
    ) -> Result<Self, IngestionError> {
        config.validate()?;
        Ok(Self {
            source,
            consumer,
            config,
        })
    }

    /// Start the supervisor. Workers stop once `shutdown` turns `true`.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> WorkerPoolHandle {
        let active = Arc::new(AtomicUsize::new(0));
        let supervisor = tokio::spawn(self.supervise(Arc::clone(&active), shutdown));
        WorkerPoolHandle { active, supervisor }
    }

    async fn supervise(self, active: Arc<AtomicUsize>, mut shutdown: watch::Receiver<bool>) {
        let core = Arc::new(AtomicUsize::new(0));
        let mut workers = JoinSet::new();
        let mut next_id = 0usize;
        let mut ticker = interval(self.config.scale_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            min_workers = self.config.min_workers,
            max_workers = self.config.max_workers,
            batch_size = self.config.batch_size,
            "Ingestion worker pool started"
        );

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                Some(joined) = workers.join_next(), if !workers.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "Ingestion worker aborted");
                    }
                }
                _ = ticker.tick() => {
                    // Replace lost core workers first.
                    while core.load(Ordering::SeqCst) < self.config.min_workers {
                        let guard = ActiveGuard::enter(&active, Some(&core));
                        self.start_worker(&mut workers, next_id, WorkerRole::Core, &shutdown, guard);
                        next_id += 1;
                    }

                    let backlog = self.source.backlog();
                    let desired = desired_workers(
                        backlog,
                        self.config.batch_size,
                        self.config.min_workers,
                        self.config.max_workers,
                    );
                    while active.load(Ordering::SeqCst) < desired {
                        let guard = ActiveGuard::enter(&active, None);
                        self.start_worker(&mut workers, next_id, WorkerRole::Extra, &shutdown, guard);
                        next_id += 1;
                    }
                    debug!(backlog, desired, active = active.load(Ordering::SeqCst), "Pool scaled");
                }
            }
        }

        info!(workers = workers.len(), "Ingestion worker pool draining");
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Ingestion worker aborted");
            }
        }
        info!("Ingestion worker pool stopped");
    }

    fn start_worker(
        &self,
        workers: &mut JoinSet<()>,
        id: usize,
        role: WorkerRole,
        shutdown: &watch::Receiver<bool>,
        guard: ActiveGuard,
    ) {
        workers.spawn(run_worker(
            id,
            role,
            Arc::clone(&self.source),
            Arc::clone(&self.consumer),
            self.config.clone(),
            shutdown.clone(),
            guard,
        ));
    }
}

async fn run_worker<S, A>(
    id: usize,
    role: WorkerRole,
    source: Arc<S>,
    consumer: Arc<A>,
    config: IngestionConfig,
    shutdown: watch::Receiver<bool>,
    _guard: ActiveGuard,
) where
    S: VoteSource,
    A: VoteIngestionApi,
{
    debug!(worker = id, ?role, "Ingestion worker started");
    let mut channel = source.open_channel();
    let mut idle_polls = 0u32;

    while !stopping(&shutdown) {
        let batch = match channel
            .receive_batch(config.batch_size, config.receive_timeout)
            .await
        {
            Ok(batch) => batch,
            Err(e) => {
                warn!(worker = id, error = %e, "Receive failed, reopening channel");
                channel = source.open_channel();
                sleep(config.error_backoff).await;
                continue;
            }
        };

        if batch.is_empty() {
            idle_polls += 1;
            if role == WorkerRole::Extra && idle_polls >= config.idle_polls_before_retire {
                info!(worker = id, idle_polls, "Idle ingestion worker retiring");
                break;
            }
            continue;
        }
        idle_polls = 0;

        if let Err(e) = consumer.process_batch(&mut channel, batch).await {
            // Dropping the old channel hands its unacknowledged batch back
            // to the queue.
            warn!(worker = id, error = %e, "Batch not acknowledged, reopening channel");
            channel = source.open_channel();
            sleep(config.error_backoff).await;
        }
    }

    debug!(worker = id, ?role, "Ingestion worker stopped");
}

/// Handle to a running worker pool.
pub struct WorkerPoolHandle {
    active: Arc<AtomicUsize>,
    supervisor: JoinHandle<()>,
}

impl WorkerPoolHandle {
    /// Workers currently running.
    pub fn active_workers(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Wait for the supervisor and every worker to finish.
    pub async fn join(self) -> Result<(), tokio::task::JoinError> {
        self.supervisor.await
    }
}
