//! # Adapters
//!
//! Implementations of the subsystems' outbound ports.
//!
//! | Adapter | Ports |
//! |---------|-------|
//! | `CacheBackend` | `KeyValueCache` |
//! | `InMemorySessionStore` | `SessionStore` |
//! | `InMemoryVoteStore` | `PersistedVoteLookup`, `VoteRepository` |
//! | `ReferenceEligibilityOracle` | `EligibilityOracle` |
//! | `RocksDbVoteStore` (`rocksdb`) | `SessionStore`, `PersistedVoteLookup`, `VoteRepository` |

pub mod cache;
pub mod eligibility;
pub mod session_store;
pub mod storage;
pub mod vote_store;

pub use cache::CacheBackend;
pub use eligibility::{ReferenceEligibilityOracle, VOTER_KEY_LEN};
pub use session_store::{InMemorySessionStore, DEFAULT_VOTING_MINUTES};
pub use vote_store::InMemoryVoteStore;
