//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Sessions**: `VotingSession`, `SessionStatus`
//! - **Voters**: `VoterKey`
//! - **Votes**: `VoteChoice`, `VoteMessage`, `VoteRecord`

use crate::errors::CodeError;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a voting session.
pub type SessionId = i64;

// =============================================================================
// CLUSTER A: SESSIONS
// =============================================================================

/// Lifecycle status of a voting session.
///
/// Wire codes: OPEN = 1, CLOSED = 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum SessionStatus {
    Open,
    Closed,
}

impl SessionStatus {
    pub const fn code(self) -> u8 {
        match self {
            Self::Open => 1,
            Self::Closed => 2,
        }
    }
}

impl From<SessionStatus> for u8 {
    fn from(status: SessionStatus) -> Self {
        status.code()
    }
}

impl TryFrom<u8> for SessionStatus {
    type Error = CodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Open),
            2 => Ok(Self::Closed),
            other => Err(CodeError::UnknownStatus(other)),
        }
    }
}

/// Authoritative voting session as owned by the session store.
///
/// Mutated only by creation and by the external closure job; immutable
/// once `Closed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingSession {
    pub id: SessionId,
    pub description: String,
    pub status: SessionStatus,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl VotingSession {
    /// True once `expires_at` lies strictly before `now`.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at < now
    }
}

// =============================================================================
// CLUSTER B: VOTERS
// =============================================================================

/// Normalized voter identifier: digits only.
///
/// Decoding normalizes too, so a key read back from the wire or from storage
/// always matches the one built by `normalize`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct VoterKey(String);

impl VoterKey {
    /// Normalize a raw identifier by dropping every non-digit character.
    ///
    /// `"123.456.789-09"` becomes `"12345678909"`. An input without digits
    /// yields an empty key, which the eligibility check reports as malformed.
    pub fn normalize(raw: &str) -> Self {
        Self(raw.chars().filter(char::is_ascii_digit).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for VoterKey {
    fn from(raw: String) -> Self {
        if raw.chars().all(|c| c.is_ascii_digit()) {
            Self(raw)
        } else {
            Self::normalize(&raw)
        }
    }
}

impl From<VoterKey> for String {
    fn from(key: VoterKey) -> Self {
        key.0
    }
}

impl fmt::Display for VoterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// CLUSTER C: VOTES
// =============================================================================

/// A voter's choice.
///
/// Wire codes: YES = 0, NO = 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum VoteChoice {
    Yes,
    No,
}

impl VoteChoice {
    pub const fn code(self) -> u8 {
        match self {
            Self::Yes => 0,
            Self::No => 1,
        }
    }
}

impl From<VoteChoice> for u8 {
    fn from(choice: VoteChoice) -> Self {
        choice.code()
    }
}

impl TryFrom<u8> for VoteChoice {
    type Error = CodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Yes),
            1 => Ok(Self::No),
            other => Err(CodeError::UnknownChoice(other)),
        }
    }
}

/// Payload of an accepted vote travelling through the broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteMessage {
    pub session_id: SessionId,
    pub voter_key: VoterKey,
    pub choice: VoteChoice,
}

impl VoteMessage {
    pub fn new(session_id: SessionId, voter_key: VoterKey, choice: VoteChoice) -> Self {
        Self {
            session_id,
            voter_key,
            choice,
        }
    }

    /// Convert into the durable record, stamped with the batch timestamp.
    pub fn into_record(self, created_at: Timestamp) -> VoteRecord {
        VoteRecord {
            session_id: self.session_id,
            voter_key: self.voter_key,
            choice: self.choice,
            created_at,
        }
    }
}

/// Durable vote.
///
/// At most one record exists per `(session_id, voter_key)`; the storage
/// layer enforces this independently of any reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub session_id: SessionId,
    pub voter_key: VoterKey,
    pub choice: VoteChoice,
    pub created_at: Timestamp,
}

impl VoteRecord {
    /// Uniqueness key of the record.
    pub fn identity(&self) -> (SessionId, &VoterKey) {
        (self.session_id, &self.voter_key)
    }
}

/// Per-session vote counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub yes: u64,
    pub no: u64,
    pub total: u64,
}

impl VoteTally {
    pub fn record(&mut self, choice: VoteChoice) {
        match choice {
            VoteChoice::Yes => self.yes += 1,
            VoteChoice::No => self.no += 1,
        }
        self.total += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voter_key_strips_formatting() {
        let key = VoterKey::normalize("123.456.789-09");
        assert_eq!(key.as_str(), "12345678909");
    }

    #[test]
    fn test_voter_key_without_digits_is_empty() {
        assert!(VoterKey::normalize("abc-.").is_empty());
    }

    #[test]
    fn test_voter_key_decode_normalizes() {
        let key: VoterKey = serde_json::from_str(r#""529.982.247-25""#).unwrap();
        assert_eq!(key.as_str(), "52998224725");
        assert_eq!(serde_json::to_string(&key).unwrap(), r#""52998224725""#);
    }

    #[test]
    fn test_choice_serializes_as_code() {
        let json = serde_json::to_string(&VoteChoice::No).unwrap();
        assert_eq!(json, "1");

        let parsed: VoteChoice = serde_json::from_str("0").unwrap();
        assert_eq!(parsed, VoteChoice::Yes);
    }

    #[test]
    fn test_unknown_choice_code_rejected() {
        let result: Result<VoteChoice, _> = serde_json::from_str("7");
        assert!(result.is_err());
        assert_eq!(VoteChoice::try_from(7), Err(CodeError::UnknownChoice(7)));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(SessionStatus::Open.code(), 1);
        assert_eq!(SessionStatus::Closed.code(), 2);
        assert_eq!(SessionStatus::try_from(2), Ok(SessionStatus::Closed));
    }

    #[test]
    fn test_vote_message_wire_fields() {
        let message = VoteMessage::new(7, VoterKey::normalize("52998224725"), VoteChoice::Yes);
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["sessionId"], 7);
        assert_eq!(json["voterKey"], "52998224725");
        assert_eq!(json["choice"], 0);
    }

    #[test]
    fn test_session_expiry_is_strict() {
        let session = VotingSession {
            id: 1,
            description: "budget".into(),
            status: SessionStatus::Open,
            created_at: 0,
            expires_at: 1_000,
        };

        assert!(!session.is_expired_at(1_000));
        assert!(session.is_expired_at(1_001));
    }

    #[test]
    fn test_tally_counts() {
        let mut tally = VoteTally::default();
        tally.record(VoteChoice::Yes);
        tally.record(VoteChoice::No);
        tally.record(VoteChoice::Yes);

        assert_eq!(tally, VoteTally { yes: 2, no: 1, total: 3 });
    }
}
