//! # Ingestion Flows
//!
//! Batches through the consumer, redelivery, and the retry / dead-letter
//! loop driven by the broker's delay holding area.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use shared_bus::{ConsumerChannel, Destination};
    use shared_types::{VoteChoice, VoteMessage, VoterKey};
    use vote_node::{NodeConfig, SubmissionOutcome};
    use vp_04_vote_ingestion::{BatchOutcome, VoteIngestionApi, VoteRepository};

    use crate::integration::harness::{envelope, voter, PipelineHarness, START};

    const VOTER: &str = "111.444.777-35";
    const LONG: Duration = Duration::from_secs(600);

    // =========================================================================
    // BATCH WITH ALREADY PERSISTED VOTES
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_batch_with_already_persisted_votes() {
        let harness = PipelineHarness::new();
        let session = harness.open_session(10);
        let voters: Vec<String> = (0..50).map(voter).collect();

        let existing: Vec<_> = voters[..3]
            .iter()
            .map(|v| {
                VoteMessage::new(session.id, VoterKey::normalize(v), VoteChoice::No)
                    .into_record(START)
            })
            .collect();
        harness
            .votes
            .insert_votes_ignoring_duplicates(&existing)
            .await
            .unwrap();

        for v in &voters {
            harness.redeliver(&envelope(session.id, v, VoteChoice::Yes)).await;
        }

        let mut channel = harness.broker().channel();
        let batch = channel
            .receive_batch(50, Duration::from_millis(500))
            .await
            .unwrap();
        assert_eq!(batch.len(), 50);

        let outcome = harness
            .node
            .consumer()
            .process_batch(&mut channel, batch)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            BatchOutcome::Persisted {
                received: 50,
                inserted: 47,
                skipped: 3
            }
        );
        assert_eq!(channel.unacked_count(), 0);
        assert_eq!(harness.votes.len(), 50);
        assert_eq!(harness.broker().published_count(Destination::Retry), 0);
        // Existing records keep their original choice.
        assert_eq!(harness.votes.tally(session.id).no, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submitted_votes_reach_the_store() {
        let harness = PipelineHarness::new();
        let session = harness.open_session(10);
        let workers = harness.node.start_ingestion().unwrap();

        for i in 0..120 {
            let choice = if i % 3 == 0 { VoteChoice::No } else { VoteChoice::Yes };
            let outcome = harness.node.submit_vote(session.id, &voter(i), choice).await;
            assert_eq!(outcome, SubmissionOutcome::Accepted);
        }

        assert!(harness.wait_until(|| harness.votes.len() == 120, LONG).await);
        let tally = harness.votes.tally(session.id);
        assert_eq!((tally.yes, tally.no, tally.total), (80, 40, 120));

        harness.node.shutdown();
        workers.join().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_redelivery_never_duplicates() {
        let harness = PipelineHarness::new();
        let session = harness.open_session(10);
        let workers = harness.node.start_ingestion().unwrap();

        let message = envelope(session.id, VOTER, VoteChoice::Yes);
        harness.redeliver(&message).await;
        assert!(harness.wait_until(|| harness.votes.len() == 1, LONG).await);

        for _ in 0..5 {
            harness.redeliver(&message).await;
        }
        assert!(
            harness
                .wait_until(|| harness.broker().ready_count() == 0, LONG)
                .await
        );
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(harness.votes.len(), 1);
        assert!(harness.broker().dead_letters().is_empty());

        harness.node.shutdown();
        workers.join().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_recovers_through_retry() {
        let harness = PipelineHarness::new();
        let session = harness.open_session(30);
        harness.votes.fail_next_inserts(2);
        let workers = harness.node.start_ingestion().unwrap();

        let outcome = harness.node.submit_vote(session.id, VOTER, VoteChoice::No).await;
        assert_eq!(outcome, SubmissionOutcome::Accepted);

        assert!(harness.wait_until(|| harness.votes.len() == 1, LONG).await);
        assert_eq!(harness.broker().published_count(Destination::Retry), 2);
        assert!(harness.broker().dead_letters().is_empty());

        harness.node.shutdown();
        workers.join().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_waits_for_holding_delay() {
        let mut config = NodeConfig::default();
        config.broker.retry_delay = Duration::from_secs(30);
        let harness = PipelineHarness::with_config(config);
        let session = harness.open_session(30);
        harness.votes.fail_next_inserts(1);
        let workers = harness.node.start_ingestion().unwrap();

        harness.node.submit_vote(session.id, VOTER, VoteChoice::Yes).await;
        assert!(
            harness
                .wait_until(|| harness.broker().held_count() == 1, LONG)
                .await
        );

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(harness.votes.is_empty());

        assert!(harness.wait_until(|| harness.votes.len() == 1, LONG).await);

        harness.node.shutdown();
        workers.join().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_bound_then_dead_letter() {
        let harness = PipelineHarness::new();
        let session = harness.open_session(30);
        harness.votes.fail_next_inserts(4);
        let workers = harness.node.start_ingestion().unwrap();

        harness.node.submit_vote(session.id, VOTER, VoteChoice::Yes).await;
        assert!(
            harness
                .wait_until(|| harness.broker().dead_letters().len() == 1, LONG)
                .await
        );

        let dead = harness.broker().dead_letters();
        assert_eq!(dead[0].retry_count(), 3);
        assert_eq!(
            dead[0].headers.last_error_kind.as_deref(),
            Some("storage_unavailable")
        );
        assert_eq!(harness.broker().published_count(Destination::Retry), 3);
        assert!(harness.votes.is_empty());

        // The reservation stays held while the vote sits in the DLQ.
        let again = harness.node.submit_vote(session.id, VOTER, VoteChoice::Yes).await;
        assert_eq!(again, SubmissionOutcome::Duplicate);

        harness.node.shutdown();
        workers.join().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_degraded_race_absorbed_by_uniqueness() {
        let harness = PipelineHarness::new();
        let session = harness.open_session(10);
        harness.cache().set_reachable(false);

        let first = harness.node.submit_vote(session.id, VOTER, VoteChoice::Yes).await;
        let second = harness.node.submit_vote(session.id, VOTER, VoteChoice::No).await;
        assert_eq!(first, SubmissionOutcome::Accepted);
        assert_eq!(second, SubmissionOutcome::Accepted);
        assert_eq!(harness.broker().published_count(Destination::Main), 2);

        let workers = harness.node.start_ingestion().unwrap();
        assert!(
            harness
                .wait_until(|| harness.broker().ready_count() == 0 && !harness.votes.is_empty(), LONG)
                .await
        );
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(harness.votes.len(), 1);

        // Once persisted, the degraded check sees the vote.
        let third = harness.node.submit_vote(session.id, VOTER, VoteChoice::Yes).await;
        assert_eq!(third, SubmissionOutcome::Duplicate);

        harness.node.shutdown();
        workers.join().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_unacked_batch_requeued_on_channel_close() {
        let harness = PipelineHarness::new();
        let session = harness.open_session(10);
        for i in 0..5 {
            harness.redeliver(&envelope(session.id, &voter(i), VoteChoice::Yes)).await;
        }

        {
            let mut channel = harness.broker().channel();
            let batch = channel
                .receive_batch(50, Duration::from_millis(500))
                .await
                .unwrap();
            assert_eq!(batch.len(), 5);
            assert_eq!(harness.broker().ready_count(), 0);
        }

        assert_eq!(harness.broker().ready_count(), 5);
    }
}
