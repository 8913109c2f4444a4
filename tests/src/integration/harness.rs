//! # Pipeline Test Harness
//!
//! A `VoteNode` wired over in-memory collaborators, with handles for fault
//! injection on every dependency: cache, broker, session store, vote store.

use std::sync::Arc;
use std::time::Duration;

use shared_bus::{Destination, InMemoryVoteBroker, VoteEnvelope, VotePublisher};
use shared_cache::InMemoryCache;
use shared_types::{MockTimeSource, SessionId, Timestamp, VoteChoice, VoteMessage, VoterKey, VotingSession};
use vote_node::adapters::{InMemorySessionStore, InMemoryVoteStore, ReferenceEligibilityOracle};
use vote_node::{NodeConfig, VoteNode};

/// Fixed start of the mock clock.
pub const START: Timestamp = 1_700_000_000_000;

pub type TestNode = VoteNode<InMemorySessionStore, InMemoryVoteStore, ReferenceEligibilityOracle>;

pub struct PipelineHarness {
    pub node: TestNode,
    pub clock: Arc<MockTimeSource>,
    pub sessions: Arc<InMemorySessionStore>,
    pub votes: Arc<InMemoryVoteStore>,
}

impl PipelineHarness {
    pub fn new() -> Self {
        Self::with_config(NodeConfig::default())
    }

    pub fn with_config(config: NodeConfig) -> Self {
        let clock = Arc::new(MockTimeSource::new(START));
        let sessions = Arc::new(InMemorySessionStore::new(clock.clone()));
        let votes = Arc::new(InMemoryVoteStore::new());
        let node = VoteNode::new(
            config,
            Arc::clone(&sessions),
            Arc::clone(&votes),
            Arc::new(ReferenceEligibilityOracle::with_deny_list([DENIED_VOTER])),
            clock.clone(),
        )
        .expect("default configuration is valid");

        Self {
            node,
            clock,
            sessions,
            votes,
        }
    }

    pub fn cache(&self) -> &InMemoryCache {
        self.node
            .cache()
            .as_memory()
            .expect("harness runs on the in-memory cache")
    }

    pub fn broker(&self) -> &InMemoryVoteBroker {
        self.node.broker()
    }

    pub fn open_session(&self, minutes: u32) -> VotingSession {
        self.sessions.create("Harness session", Some(minutes))
    }

    /// Publish `envelope` straight to the main destination, as a broker
    /// redelivery would.
    pub async fn redeliver(&self, envelope: &VoteEnvelope) {
        self.broker()
            .publish(Destination::Main, envelope)
            .await
            .expect("broker reachable");
    }

    /// Poll `condition` every 50 ms until it holds or `max_wait` passes.
    pub async fn wait_until<F>(&self, condition: F, max_wait: Duration) -> bool
    where
        F: Fn() -> bool,
    {
        let step = Duration::from_millis(50);
        let mut waited = Duration::ZERO;
        while !condition() {
            if waited >= max_wait {
                return false;
            }
            tokio::time::sleep(step).await;
            waited += step;
        }
        true
    }
}

impl Default for PipelineHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Well-formed voter on the harness oracle's deny-list.
pub const DENIED_VOTER: &str = "529.982.247-25";

/// Distinct, well-formed voter keys.
pub fn voter(i: usize) -> String {
    format!("{:011}", 30_000_000_000u64 + i as u64)
}

pub fn envelope(session_id: SessionId, raw_voter: &str, choice: VoteChoice) -> VoteEnvelope {
    VoteEnvelope::new(VoteMessage::new(
        session_id,
        VoterKey::normalize(raw_voter),
        choice,
    ))
}
