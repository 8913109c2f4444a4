//! # Pipeline Invariants
//!
//! - At most one reservation wins per `(session, voter)` under contention.
//! - Cache TTLs follow the session's expiry.
//! - However many times a vote is delivered, at most one record persists.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    use futures::future::join_all;
    use proptest::prelude::*;
    use shared_bus::{ConsumerChannel, VoteEnvelope};
    use shared_cache::InMemoryCache;
    use shared_types::{VoteChoice, VoteMessage, VoterKey};
    use vote_node::adapters::InMemoryVoteStore;
    use vote_node::SubmissionOutcome;
    use vp_01_session_cache::snapshot_key;
    use vp_02_vote_guard::{reservation_key, DuplicateVoteGuard, VoteGuardApi};
    use vp_04_vote_ingestion::VoteIngestionApi;

    use crate::integration::harness::{envelope, voter, PipelineHarness};

    const VOTER: &str = "111.444.777-35";

    // =========================================================================
    // RESERVATION UNDER CONTENTION
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reserve_single_winner() {
        let guard = Arc::new(DuplicateVoteGuard::new(
            Arc::new(InMemoryCache::new()),
            Arc::new(InMemoryVoteStore::new()),
        ));
        let key = VoterKey::normalize(VOTER);

        let tasks: Vec<_> = (0..64)
            .map(|_| {
                let guard = Arc::clone(&guard);
                let key = key.clone();
                tokio::spawn(async move {
                    guard.reserve(9, &key, Duration::from_secs(3600)).await
                })
            })
            .collect();

        let mut winners = 0;
        for task in join_all(tasks).await {
            if task.unwrap().unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submissions_single_accept() {
        let harness = Arc::new(PipelineHarness::new());
        let session = harness.open_session(10);

        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let harness = Arc::clone(&harness);
                let choice = if i % 2 == 0 { VoteChoice::Yes } else { VoteChoice::No };
                tokio::spawn(async move {
                    harness.node.submit_vote(session.id, VOTER, choice).await
                })
            })
            .collect();

        let outcomes: Vec<SubmissionOutcome> = join_all(tasks)
            .await
            .into_iter()
            .map(|task| task.unwrap())
            .collect();

        let accepted = outcomes.iter().filter(|o| o.is_accepted()).count();
        let duplicates = outcomes
            .iter()
            .filter(|o| **o == SubmissionOutcome::Duplicate)
            .count();
        assert_eq!(accepted, 1);
        assert_eq!(duplicates, 31);
        assert_eq!(harness.broker().ready_count(), 1);
    }

    // =========================================================================
    // TTL CORRECTNESS
    // =========================================================================

    #[tokio::test]
    async fn test_ttls_follow_session_expiry() {
        let harness = PipelineHarness::new();
        let session = harness.open_session(5);

        let outcome = harness
            .node
            .submit_vote(session.id, VOTER, VoteChoice::Yes)
            .await;
        assert_eq!(outcome, SubmissionOutcome::Accepted);

        assert_eq!(
            harness.cache().ttl_of(&snapshot_key(session.id)),
            Some(Duration::from_secs(5 * 60 + 60))
        );
        assert_eq!(
            harness
                .cache()
                .ttl_of(&reservation_key(session.id, &VoterKey::normalize(VOTER))),
            Some(Duration::from_secs(5 * 60 + 3600))
        );
    }

    #[tokio::test]
    async fn test_expired_session_snapshot_ttl_floored() {
        let harness = PipelineHarness::new();
        let session = harness.open_session(1);
        harness.clock.advance(Duration::from_secs(120));

        let outcome = harness
            .node
            .submit_vote(session.id, VOTER, VoteChoice::Yes)
            .await;
        assert_eq!(outcome, SubmissionOutcome::SessionInvalid);

        assert_eq!(
            harness.cache().ttl_of(&snapshot_key(session.id)),
            Some(Duration::from_secs(60))
        );
    }

    // =========================================================================
    // PERSISTENCE UNIQUENESS
    // =========================================================================

    /// Publish every envelope, then drain the queue through the consumer.
    async fn ingest_all(harness: &PipelineHarness, envelopes: &[VoteEnvelope]) {
        for message in envelopes {
            harness.redeliver(message).await;
        }

        let mut channel = harness.broker().channel();
        loop {
            let batch = channel
                .receive_batch(50, Duration::from_millis(500))
                .await
                .unwrap();
            if batch.is_empty() {
                break;
            }
            let outcome = harness
                .node
                .consumer()
                .process_batch(&mut channel, batch)
                .await
                .unwrap();
            assert!(outcome.is_persisted());
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_at_most_one_record_per_voter(
            deliveries in prop::collection::vec((0usize..20, any::<bool>()), 1..150)
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .start_paused(true)
                .build()
                .unwrap();

            let (stored, distinct) = runtime.block_on(async {
                let harness = PipelineHarness::new();
                let session = harness.open_session(10);

                let envelopes: Vec<_> = deliveries
                    .iter()
                    .map(|(i, yes)| {
                        let choice = if *yes { VoteChoice::Yes } else { VoteChoice::No };
                        envelope(session.id, &voter(*i), choice)
                    })
                    .collect();
                ingest_all(&harness, &envelopes).await;

                let distinct: HashSet<_> = deliveries.iter().map(|(i, _)| *i).collect();
                (harness.votes.records_for(session.id).len(), distinct.len())
            });

            prop_assert_eq!(stored, distinct);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_persisted_choice_wins() {
        let harness = PipelineHarness::new();
        let session = harness.open_session(10);
        let key = VoterKey::normalize(VOTER);

        let first = VoteEnvelope::new(VoteMessage::new(session.id, key.clone(), VoteChoice::No));
        ingest_all(&harness, &[first]).await;

        let later = VoteEnvelope::new(VoteMessage::new(session.id, key, VoteChoice::Yes));
        ingest_all(&harness, &[later.clone(), later]).await;

        let records = harness.votes.records_for(session.id);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].choice, VoteChoice::No);
    }
}
