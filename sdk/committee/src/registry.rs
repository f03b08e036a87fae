//! Committee Registry
//!
//! The fixed, ordered set of identities allowed to register a public key.
//! Position in the constructor input is the member's index for the lifetime
//! of the registry.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::CommitteeError;

/// A committee identity (32 bytes)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId(pub [u8; 32]);

impl MemberId {
    /// Deterministically derive an identity from a label.
    /// Formula: SHA256("pvss-member-v1" || label)
    pub fn derive(label: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"pvss-member-v1");
        hasher.update(label);
        Self(hasher.finalize().into())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl AsRef<[u8]> for MemberId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemberId({})", self)
    }
}

impl FromStr for MemberId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes)?;
        Ok(Self(bytes))
    }
}

/// A committee member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitteeMember {
    /// Member identity
    pub id: MemberId,
    /// Member index (0-indexed, position in the committee list)
    pub index: usize,
}

/// The committee registry
#[derive(Debug, Clone)]
pub struct Committee {
    /// Members in index order
    members: Vec<CommitteeMember>,
    /// Identity -> index
    by_id: HashMap<MemberId, usize>,
}

impl Committee {
    /// Create a committee from an ordered, non-empty list of unique identities
    pub fn new(ids: Vec<MemberId>) -> Result<Self, CommitteeError> {
        if ids.is_empty() {
            return Err(CommitteeError::InvalidCommittee(
                "committee must have at least one member".into(),
            ));
        }

        let mut by_id = HashMap::with_capacity(ids.len());
        let mut members = Vec::with_capacity(ids.len());

        for (index, id) in ids.into_iter().enumerate() {
            if let Some(first) = by_id.insert(id, index) {
                return Err(CommitteeError::InvalidCommittee(format!(
                    "duplicate identity {} at positions {} and {}",
                    id, first, index
                )));
            }
            members.push(CommitteeMember { id, index });
        }

        Ok(Self { members, by_id })
    }

    /// Create a committee whose identities are derived from labels
    pub fn from_labels<I, L>(labels: I) -> Result<Self, CommitteeError>
    where
        I: IntoIterator<Item = L>,
        L: AsRef<[u8]>,
    {
        Self::new(
            labels
                .into_iter()
                .map(|label| MemberId::derive(label.as_ref()))
                .collect(),
        )
    }

    /// Number of members n
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// Get a member's index
    pub fn index_of(&self, id: &MemberId) -> Result<usize, CommitteeError> {
        self.by_id
            .get(id)
            .copied()
            .ok_or(CommitteeError::NotAMember(*id))
    }

    pub fn is_member(&self, id: &MemberId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Get the identity at `index`
    pub fn member_at(&self, index: usize) -> Result<MemberId, CommitteeError> {
        self.members
            .get(index)
            .map(|m| m.id)
            .ok_or(CommitteeError::IndexOutOfRange {
                index,
                size: self.size(),
            })
    }

    /// All members in index order
    pub fn members(&self) -> &[CommitteeMember] {
        &self.members
    }

    /// All identities in index order
    pub fn ids(&self) -> Vec<MemberId> {
        self.members.iter().map(|m| m.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<MemberId> {
        (0..n)
            .map(|i| MemberId::derive(format!("member-{}", i).as_bytes()))
            .collect()
    }

    #[test]
    fn test_committee_creation() {
        let members = ids(5);
        let committee = Committee::new(members.clone()).unwrap();

        assert_eq!(committee.size(), 5);
        for (i, id) in members.iter().enumerate() {
            assert_eq!(committee.index_of(id).unwrap(), i);
            assert_eq!(committee.member_at(i).unwrap(), *id);
            assert!(committee.is_member(id));
            assert_eq!(committee.members()[i], CommitteeMember { id: *id, index: i });
        }
        assert_eq!(committee.ids(), members);
    }

    #[test]
    fn test_rejects_empty_and_duplicates() {
        assert!(matches!(
            Committee::new(vec![]),
            Err(CommitteeError::InvalidCommittee(_))
        ));

        let mut members = ids(3);
        members.push(members[1]);
        assert!(matches!(
            Committee::new(members),
            Err(CommitteeError::InvalidCommittee(_))
        ));
    }

    #[test]
    fn test_unknown_lookups() {
        let committee = Committee::new(ids(3)).unwrap();
        let outsider = MemberId::derive(b"outsider");

        assert!(!committee.is_member(&outsider));
        assert_eq!(
            committee.index_of(&outsider),
            Err(CommitteeError::NotAMember(outsider))
        );
        assert_eq!(
            committee.member_at(3),
            Err(CommitteeError::IndexOutOfRange { index: 3, size: 3 })
        );
    }

    #[test]
    fn test_member_id_hex_roundtrip() {
        let id = MemberId::derive(b"alice");
        let shown = id.to_string();
        assert!(shown.starts_with("0x"));
        assert_eq!(shown.parse::<MemberId>().unwrap(), id);
        assert_eq!(id.to_hex().parse::<MemberId>().unwrap(), id);
        assert!("0x1234".parse::<MemberId>().is_err());
    }

    #[test]
    fn test_from_labels_matches_derive() {
        let committee = Committee::from_labels(["a", "b"]).unwrap();
        assert_eq!(committee.member_at(1).unwrap(), MemberId::derive(b"b"));
        assert!(Committee::from_labels(["a", "a"]).is_err());
    }
}
