//! Key Collection State Machine
//!
//! ```text
//!   KEY_COLLECTION ──(remaining hits 0)──▶ KEYS_COLLECTED
//!        │  ▲
//!        └──┘ submit: slot[i] = pk, remaining -= 1
//! ```
//!
//! A submission either applies completely (slot, counter and phase together)
//! or not at all. Callers that share a `KeyCollection` across threads must
//! hold one lock around every call.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CommitteeError;

/// Protocol phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Phase {
    /// Members are registering public keys
    KeyCollection = 0,
    /// Every member has registered; share distribution may start
    KeysCollected = 1,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::KeyCollection => write!(f, "KEY_COLLECTION"),
            Phase::KeysCollected => write!(f, "KEYS_COLLECTED"),
        }
    }
}

/// One member's registration slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionSlot {
    /// Zero until the member submits
    pub public_key: BigUint,
    pub submitted: bool,
}

/// Result of an accepted submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Key stored, still waiting on `remaining` members
    Recorded { remaining: usize },
    /// Key stored and it was the last one; phase is now `KeysCollected`
    Completed,
}

/// Reconstruction threshold for a committee of `size`: floor(n/2) + 1
pub fn threshold_for(size: usize) -> usize {
    size / 2 + 1
}

/// Per-member slots plus protocol state
#[derive(Debug, Clone)]
pub struct KeyCollection {
    slots: Vec<SubmissionSlot>,
    remaining: usize,
    threshold: usize,
    phase: Phase,
}

impl KeyCollection {
    /// Create the state for a committee of `size` members
    pub fn new(size: usize) -> Result<Self, CommitteeError> {
        if size == 0 {
            return Err(CommitteeError::InvalidCommittee(
                "committee must have at least one member".into(),
            ));
        }

        Ok(Self {
            slots: vec![SubmissionSlot::default(); size],
            remaining: size,
            threshold: threshold_for(size),
            phase: Phase::KeyCollection,
        })
    }

    /// Record `value` as the public key of member `index`
    ///
    /// Checks, in order: phase is still `KeyCollection`, slot is unset.
    /// Membership is resolved by the caller before this point.
    pub fn submit(&mut self, index: usize, value: BigUint) -> Result<Submission, CommitteeError> {
        self.check_index(index)?;

        if self.phase != Phase::KeyCollection {
            return Err(CommitteeError::PhaseClosed);
        }
        if self.slots[index].submitted {
            return Err(CommitteeError::AlreadySubmitted { index });
        }

        // All checks passed; nothing below can fail
        self.slots[index] = SubmissionSlot {
            public_key: value,
            submitted: true,
        };
        self.remaining -= 1;

        if self.remaining == 0 {
            self.phase = Phase::KeysCollected;
            Ok(Submission::Completed)
        } else {
            Ok(Submission::Recorded {
                remaining: self.remaining,
            })
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Members that have not submitted yet
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Public key stored for `index` (zero if unset)
    pub fn public_key(&self, index: usize) -> Result<&BigUint, CommitteeError> {
        self.check_index(index)?;
        Ok(&self.slots[index].public_key)
    }

    pub fn has_submitted(&self, index: usize) -> Result<bool, CommitteeError> {
        self.check_index(index)?;
        Ok(self.slots[index].submitted)
    }

    /// All public keys in index order, once every member has submitted
    pub fn collected_keys(&self) -> Option<Vec<BigUint>> {
        if self.phase != Phase::KeysCollected {
            return None;
        }
        Some(self.slots.iter().map(|s| s.public_key.clone()).collect())
    }

    fn check_index(&self, index: usize) -> Result<(), CommitteeError> {
        if index >= self.slots.len() {
            return Err(CommitteeError::IndexOutOfRange {
                index,
                size: self.slots.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use num_traits::Zero;

    use super::*;

    fn big(v: u64) -> BigUint {
        BigUint::from(v)
    }

    #[test]
    fn test_threshold() {
        for n in 1..=64 {
            let collection = KeyCollection::new(n).unwrap();
            assert_eq!(collection.threshold(), n / 2 + 1);
        }
        assert_eq!(threshold_for(1), 1);
        assert_eq!(threshold_for(10), 6);
        assert_eq!(threshold_for(11), 6);
    }

    #[test]
    fn test_initial_state() {
        let collection = KeyCollection::new(4).unwrap();
        assert_eq!(collection.phase(), Phase::KeyCollection);
        assert_eq!(collection.remaining(), 4);
        for i in 0..4 {
            assert!(collection.public_key(i).unwrap().is_zero());
            assert!(!collection.has_submitted(i).unwrap());
        }
        assert!(collection.collected_keys().is_none());
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(
            KeyCollection::new(0),
            Err(CommitteeError::InvalidCommittee(_))
        ));
    }

    #[test]
    fn test_one_shot_submission() {
        let mut collection = KeyCollection::new(3).unwrap();

        assert_eq!(
            collection.submit(1, big(99)).unwrap(),
            Submission::Recorded { remaining: 2 }
        );
        assert_eq!(collection.public_key(1).unwrap(), &big(99));
        assert!(collection.has_submitted(1).unwrap());

        // Second attempt is rejected and changes nothing
        assert_eq!(
            collection.submit(1, big(7)),
            Err(CommitteeError::AlreadySubmitted { index: 1 })
        );
        assert_eq!(collection.public_key(1).unwrap(), &big(99));
        assert_eq!(collection.remaining(), 2);
    }

    #[test]
    fn test_zero_value_still_counts_as_submitted() {
        let mut collection = KeyCollection::new(2).unwrap();
        collection.submit(0, BigUint::zero()).unwrap();

        assert!(collection.has_submitted(0).unwrap());
        assert_eq!(collection.remaining(), 1);
        assert_eq!(
            collection.submit(0, big(5)),
            Err(CommitteeError::AlreadySubmitted { index: 0 })
        );
    }

    #[test]
    fn test_phase_flips_exactly_at_zero() {
        let mut collection = KeyCollection::new(10).unwrap();
        let order = [3usize, 7, 0, 9, 1, 5, 2, 8, 4];

        for (n, &i) in order.iter().enumerate() {
            collection.submit(i, big(100 + i as u64)).unwrap();
            assert_eq!(collection.phase(), Phase::KeyCollection);
            assert_eq!(collection.remaining(), 10 - n - 1);
        }
        assert_eq!(collection.remaining(), 1);

        assert_eq!(collection.submit(6, big(106)).unwrap(), Submission::Completed);
        assert_eq!(collection.phase(), Phase::KeysCollected);
        assert_eq!(collection.remaining(), 0);

        let keys = collection.collected_keys().unwrap();
        assert_eq!(keys, (0..10).map(|i| big(100 + i)).collect::<Vec<_>>());
    }

    #[test]
    fn test_phase_closed_takes_precedence() {
        let mut collection = KeyCollection::new(2).unwrap();
        collection.submit(0, big(1)).unwrap();
        collection.submit(1, big(2)).unwrap();

        // Both members already submitted, but the closed phase is reported
        assert_eq!(collection.submit(0, big(3)), Err(CommitteeError::PhaseClosed));
        assert_eq!(collection.submit(1, big(3)), Err(CommitteeError::PhaseClosed));
        assert_eq!(collection.remaining(), 0);
        assert_eq!(collection.public_key(0).unwrap(), &big(1));
    }

    #[test]
    fn test_out_of_range() {
        let mut collection = KeyCollection::new(2).unwrap();
        let err = CommitteeError::IndexOutOfRange { index: 2, size: 2 };

        assert_eq!(collection.public_key(2), Err(err.clone()));
        assert_eq!(collection.has_submitted(2), Err(err.clone()));
        assert_eq!(collection.submit(2, big(1)), Err(err));
        assert_eq!(collection.remaining(), 2);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::KeyCollection.to_string(), "KEY_COLLECTION");
        assert_eq!(Phase::KeysCollected.to_string(), "KEYS_COLLECTED");
        assert_eq!(Phase::KeysCollected as u8, 1);
    }
}
