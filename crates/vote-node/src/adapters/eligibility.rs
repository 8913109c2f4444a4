//! Reference eligibility oracle.

use crate::submission::{Eligibility, EligibilityOracle};
use shared_types::VoterKey;
use std::collections::HashSet;

/// Digits in a well-formed voter key.
pub const VOTER_KEY_LEN: usize = 11;

/// Structural check plus an explicit deny-list.
///
/// A key is malformed unless it has exactly `VOTER_KEY_LEN` digits that are
/// not all the same digit. Well-formed keys on the deny-list are ineligible.
#[derive(Debug, Clone, Default)]
pub struct ReferenceEligibilityOracle {
    deny_list: HashSet<VoterKey>,
}

impl ReferenceEligibilityOracle {
    pub fn with_deny_list<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            deny_list: keys
                .into_iter()
                .map(|raw| VoterKey::normalize(raw.as_ref()))
                .collect(),
        }
    }

    fn is_well_formed(voter_key: &VoterKey) -> bool {
        let digits = voter_key.as_str().as_bytes();
        digits.len() == VOTER_KEY_LEN && digits.iter().any(|d| *d != digits[0])
    }
}

impl EligibilityOracle for ReferenceEligibilityOracle {
    fn check(&self, voter_key: &VoterKey) -> Eligibility {
        if !Self::is_well_formed(voter_key) {
            Eligibility::Malformed
        } else if self.deny_list.contains(voter_key) {
            Eligibility::Ineligible
        } else {
            Eligibility::Eligible
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(oracle: &ReferenceEligibilityOracle, raw: &str) -> Eligibility {
        oracle.check(&VoterKey::normalize(raw))
    }

    #[test]
    fn test_well_formed_key_is_eligible() {
        let oracle = ReferenceEligibilityOracle::default();
        assert_eq!(check(&oracle, "529.982.247-25"), Eligibility::Eligible);
    }

    #[test]
    fn test_wrong_length_is_malformed() {
        let oracle = ReferenceEligibilityOracle::default();
        assert_eq!(check(&oracle, "1234567890"), Eligibility::Malformed);
        assert_eq!(check(&oracle, "123456789012"), Eligibility::Malformed);
        assert_eq!(check(&oracle, "abc"), Eligibility::Malformed);
    }

    #[test]
    fn test_repeated_digit_is_malformed() {
        let oracle = ReferenceEligibilityOracle::default();
        assert_eq!(check(&oracle, "111.111.111-11"), Eligibility::Malformed);
    }

    #[test]
    fn test_deny_list_is_ineligible() {
        let oracle = ReferenceEligibilityOracle::with_deny_list(["529.982.247-25"]);
        assert_eq!(check(&oracle, "52998224725"), Eligibility::Ineligible);
        assert_eq!(check(&oracle, "11144477735"), Eligibility::Eligible);
    }
}
