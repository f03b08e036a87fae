//! Access Gate
//!
//! Single authorization checkpoint: every mutating call is resolved against the
//! committee registry before it reaches the key collection state.

use std::sync::Arc;

use num_bigint::BigUint;

use crate::collection::{KeyCollection, Phase, Submission};
use crate::error::CommitteeError;
use crate::registry::{Committee, MemberId};

/// Committee registry composed with its key collection state
#[derive(Debug, Clone)]
pub struct AccessGate {
    committee: Arc<Committee>,
    collection: KeyCollection,
}

impl AccessGate {
    /// Open key collection for `committee`
    pub fn new(committee: Arc<Committee>) -> Result<Self, CommitteeError> {
        let collection = KeyCollection::new(committee.size())?;
        Ok(Self {
            committee,
            collection,
        })
    }

    /// Resolve `caller` to its committee index
    pub fn authorize(&self, caller: &MemberId) -> Result<usize, CommitteeError> {
        self.committee.index_of(caller)
    }

    /// Register `caller`'s public key
    ///
    /// Errors, first match wins: `NotAMember`, `PhaseClosed`, `AlreadySubmitted`.
    /// The value itself is stored as given; group membership is not checked here.
    pub fn submit_public_key(
        &mut self,
        caller: &MemberId,
        value: BigUint,
    ) -> Result<Submission, CommitteeError> {
        let index = self.authorize(caller)?;
        self.collection.submit(index, value)
    }

    pub fn committee(&self) -> &Arc<Committee> {
        &self.committee
    }

    pub fn current_phase(&self) -> Phase {
        self.collection.phase()
    }

    pub fn remaining(&self) -> usize {
        self.collection.remaining()
    }

    pub fn threshold(&self) -> usize {
        self.collection.threshold()
    }

    pub fn public_key_of(&self, index: usize) -> Result<BigUint, CommitteeError> {
        self.collection.public_key(index).cloned()
    }

    pub fn has_submitted(&self, id: &MemberId) -> Result<bool, CommitteeError> {
        let index = self.committee.index_of(id)?;
        self.collection.has_submitted(index)
    }

    pub fn member_at(&self, index: usize) -> Result<MemberId, CommitteeError> {
        self.committee.member_at(index)
    }

    pub fn is_member(&self, id: &MemberId) -> bool {
        self.committee.is_member(id)
    }

    pub fn collected_keys(&self) -> Option<Vec<BigUint>> {
        self.collection.collected_keys()
    }
}

#[cfg(test)]
mod tests {
    use num_traits::Zero;
    use pvss_group::{GroupParams, KeyPair};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    const COMMITTEE_SIZE: usize = 10;

    fn setup(n: usize) -> (AccessGate, Vec<MemberId>) {
        let committee = Committee::from_labels((0..n).map(|i| format!("signer-{}", i))).unwrap();
        let ids = committee.ids();
        (AccessGate::new(Arc::new(committee)).unwrap(), ids)
    }

    fn public_keys(n: usize) -> Vec<BigUint> {
        let params = GroupParams::modp_1536();
        let mut rng = StdRng::seed_from_u64(1);
        (0..n)
            .map(|_| KeyPair::generate(&params, &mut rng).unwrap().public.into_biguint())
            .collect()
    }

    #[test]
    fn test_initial_state() {
        let (gate, ids) = setup(COMMITTEE_SIZE);

        assert_eq!(gate.threshold(), COMMITTEE_SIZE / 2 + 1);
        assert_eq!(gate.current_phase(), Phase::KeyCollection);
        assert_eq!(gate.remaining(), COMMITTEE_SIZE);

        for (i, id) in ids.iter().enumerate() {
            assert_eq!(gate.member_at(i).unwrap(), *id);
            assert_eq!(gate.authorize(id).unwrap(), i);
            assert!(gate.public_key_of(i).unwrap().is_zero());
            assert!(gate.is_member(id));
            assert!(!gate.has_submitted(id).unwrap());
        }
    }

    #[test]
    fn test_rejects_outsiders() {
        let (mut gate, ids) = setup(3);
        let outsider = MemberId::derive(b"outsider");

        assert_eq!(
            gate.submit_public_key(&outsider, BigUint::from(5u32)),
            Err(CommitteeError::NotAMember(outsider))
        );
        assert_eq!(gate.has_submitted(&outsider), Err(CommitteeError::NotAMember(outsider)));
        assert_eq!(gate.remaining(), 3);

        // Still NotAMember once the phase is closed
        for id in &ids {
            gate.submit_public_key(id, BigUint::from(1u32)).unwrap();
        }
        assert_eq!(
            gate.submit_public_key(&outsider, BigUint::from(5u32)),
            Err(CommitteeError::NotAMember(outsider))
        );
    }

    #[test]
    fn test_members_submit_once_and_phase_changes_at_the_end() {
        let (mut gate, ids) = setup(COMMITTEE_SIZE);
        let pks = public_keys(COMMITTEE_SIZE);

        for (i, id) in ids.iter().enumerate() {
            assert!(!gate.has_submitted(id).unwrap());
            gate.submit_public_key(id, pks[i].clone()).unwrap();

            assert_eq!(gate.public_key_of(i).unwrap(), pks[i]);
            assert!(gate.has_submitted(id).unwrap());
            assert_eq!(gate.remaining(), COMMITTEE_SIZE - i - 1);

            let expected = if i == COMMITTEE_SIZE - 1 {
                CommitteeError::PhaseClosed
            } else {
                CommitteeError::AlreadySubmitted { index: i }
            };
            assert_eq!(
                gate.submit_public_key(id, BigUint::from(42u32)),
                Err(expected)
            );
            assert_eq!(gate.public_key_of(i).unwrap(), pks[i]);
        }

        assert_eq!(gate.current_phase(), Phase::KeysCollected);
        assert_eq!(gate.collected_keys().unwrap(), pks);
    }

    #[test]
    fn test_unvalidated_values_are_stored() {
        let (mut gate, ids) = setup(2);
        // Wider than any group element; stored as given
        let bogus = BigUint::from(1u32) << 4096u32;

        gate.submit_public_key(&ids[0], bogus.clone()).unwrap();
        assert_eq!(gate.public_key_of(0).unwrap(), bogus);
    }

    #[test]
    fn test_single_member_committee() {
        let (mut gate, ids) = setup(1);
        assert_eq!(gate.threshold(), 1);

        assert_eq!(
            gate.submit_public_key(&ids[0], BigUint::from(9u32)).unwrap(),
            Submission::Completed
        );
        assert_eq!(gate.current_phase(), Phase::KeysCollected);
        assert_eq!(gate.remaining(), 0);
    }
}
