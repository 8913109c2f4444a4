//! # Vote Submission Flows
//!
//! `submitVote` end to end through the session gate, the eligibility
//! oracle, the duplicate guard and the dispatcher.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::future::join_all;
    use shared_bus::Destination;
    use shared_cache::InMemoryCache;
    use shared_types::{SessionStatus, VoteChoice, VoterKey};
    use vp_01_session_cache::{SessionSnapshot, SessionStateApi, SessionStateCache};
    use vp_02_vote_guard::reservation_key;
    use vote_node::SubmissionOutcome;

    use crate::integration::harness::{voter, PipelineHarness, DENIED_VOTER};

    const VOTER: &str = "111.444.777-35";

    fn reservation_of(session_id: i64, raw: &str) -> String {
        reservation_key(session_id, &VoterKey::normalize(raw))
    }

    // =========================================================================
    // FIRST VOTE ACCEPTED, REPEAT REJECTED
    // =========================================================================

    #[tokio::test]
    async fn test_accept_then_duplicate() {
        let harness = PipelineHarness::new();
        let session = harness.open_session(10);

        let first = harness
            .node
            .submit_vote(session.id, VOTER, VoteChoice::Yes)
            .await;
        let second = harness
            .node
            .submit_vote(session.id, VOTER, VoteChoice::Yes)
            .await;

        assert_eq!(first, SubmissionOutcome::Accepted);
        assert_eq!(second, SubmissionOutcome::Duplicate);
        assert_eq!(harness.broker().published_count(Destination::Main), 1);
    }

    #[tokio::test]
    async fn test_formatting_variants_are_the_same_voter() {
        let harness = PipelineHarness::new();
        let session = harness.open_session(10);

        let first = harness
            .node
            .submit_vote(session.id, "111.444.777-35", VoteChoice::No)
            .await;
        let second = harness
            .node
            .submit_vote(session.id, "111 444 777 35", VoteChoice::Yes)
            .await;

        assert_eq!(first, SubmissionOutcome::Accepted);
        assert_eq!(second, SubmissionOutcome::Duplicate);
    }

    #[tokio::test]
    async fn test_same_voter_in_other_session_accepted() {
        let harness = PipelineHarness::new();
        let a = harness.open_session(10);
        let b = harness.open_session(10);

        assert!(harness.node.submit_vote(a.id, VOTER, VoteChoice::Yes).await.is_accepted());
        assert!(harness.node.submit_vote(b.id, VOTER, VoteChoice::Yes).await.is_accepted());
    }

    // =========================================================================
    // CLOSED SESSION, NO SIDE EFFECTS
    // =========================================================================

    #[tokio::test]
    async fn test_closed_session_has_no_side_effects() {
        let harness = PipelineHarness::new();
        let session = harness.open_session(10);
        harness.sessions.close(session.id);

        let outcome = harness
            .node
            .submit_vote(session.id, VOTER, VoteChoice::Yes)
            .await;

        assert_eq!(outcome, SubmissionOutcome::SessionInvalid);
        assert_eq!(harness.cache().ttl_of(&reservation_of(session.id, VOTER)), None);
        assert_eq!(harness.broker().published_count(Destination::Main), 0);
    }

    #[tokio::test]
    async fn test_expired_session_judged_by_caller_clock() {
        let harness = PipelineHarness::new();
        let session = harness.open_session(1);
        harness.clock.advance(std::time::Duration::from_secs(120));

        let outcome = harness
            .node
            .submit_vote(session.id, VOTER, VoteChoice::Yes)
            .await;
        assert_eq!(outcome, SubmissionOutcome::SessionInvalid);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let harness = PipelineHarness::new();
        let outcome = harness.node.submit_vote(9_999, VOTER, VoteChoice::No).await;
        assert_eq!(outcome, SubmissionOutcome::SessionInvalid);
    }

    #[tokio::test]
    async fn test_ineligible_voters_leave_no_reservation() {
        let harness = PipelineHarness::new();
        let session = harness.open_session(10);

        for raw in [DENIED_VOTER, "123", "000.000.000-00"] {
            let outcome = harness.node.submit_vote(session.id, raw, VoteChoice::Yes).await;
            assert_eq!(outcome, SubmissionOutcome::Ineligible, "voter {raw}");
            assert_eq!(harness.cache().ttl_of(&reservation_of(session.id, raw)), None);
        }
        assert_eq!(harness.broker().published_count(Destination::Main), 0);
    }

    // =========================================================================
    // CACHE UNREACHABLE
    // =========================================================================

    #[tokio::test]
    async fn test_cache_unreachable_falls_back_to_store() {
        let harness = PipelineHarness::new();
        let session = harness.open_session(5);
        let unreachable = Arc::new(InMemoryCache::new());
        unreachable.set_reachable(false);

        let cache = SessionStateCache::new(
            unreachable,
            Arc::clone(&harness.sessions),
            harness.clock.clone(),
        );
        let snapshot = cache.get(session.id).await.unwrap();

        assert_eq!(snapshot, SessionSnapshot::from_session(&session));
        assert_eq!(snapshot.status, SessionStatus::Open);
    }

    #[tokio::test]
    async fn test_submission_survives_cache_outage() {
        let harness = PipelineHarness::new();
        let session = harness.open_session(5);
        harness.cache().set_reachable(false);

        let outcome = harness
            .node
            .submit_vote(session.id, VOTER, VoteChoice::No)
            .await;
        assert_eq!(outcome, SubmissionOutcome::Accepted);
    }

    #[tokio::test]
    async fn test_cache_and_vote_store_down_reports_unavailable() {
        let harness = PipelineHarness::new();
        let session = harness.open_session(5);
        harness.cache().set_reachable(false);
        harness.votes.set_available(false);

        let outcome = harness
            .node
            .submit_vote(session.id, VOTER, VoteChoice::No)
            .await;
        assert_eq!(outcome, SubmissionOutcome::UnavailableTemporarily);
        assert_eq!(harness.broker().published_count(Destination::Main), 0);
    }

    // =========================================================================
    // PUBLISH FAILURE RELEASES THE RESERVATION
    // =========================================================================

    #[tokio::test]
    async fn test_publish_failure_releases_reservation() {
        let harness = PipelineHarness::new();
        let session = harness.open_session(10);
        harness.broker().set_reachable(false);

        let outcome = harness
            .node
            .submit_vote(session.id, VOTER, VoteChoice::Yes)
            .await;

        assert_eq!(outcome, SubmissionOutcome::UnavailableTemporarily);
        assert_eq!(harness.cache().ttl_of(&reservation_of(session.id, VOTER)), None);

        harness.broker().set_reachable(true);
        let retry = harness
            .node
            .submit_vote(session.id, VOTER, VoteChoice::Yes)
            .await;
        assert_eq!(retry, SubmissionOutcome::Accepted);
    }

    #[tokio::test]
    async fn test_many_voters_one_repeat() {
        let harness = PipelineHarness::new();
        let session = harness.open_session(10);
        let mut voters: Vec<String> = (0..20).map(voter).collect();
        voters.push(voter(7));

        let outcomes = join_all(
            voters
                .iter()
                .map(|v| harness.node.submit_vote(session.id, v, VoteChoice::Yes)),
        )
        .await;

        let accepted = outcomes.iter().filter(|o| o.is_accepted()).count();
        let duplicates = outcomes
            .iter()
            .filter(|o| **o == SubmissionOutcome::Duplicate)
            .count();
        assert_eq!(accepted, 20);
        assert_eq!(duplicates, 1);
    }
}
