//! PVSS Committee Key Collection
//!
//! Gates the start of share distribution on every committee member having
//! registered exactly one public key.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  caller ──▶ AccessGate ──▶ Committee (index_of)                 │
//! │                 │                                               │
//! │                 ▼                                               │
//! │           KeyCollection                                         │
//! │     slots[i] = pk, remaining -= 1                               │
//! │     remaining == 0  ⇒  KEY_COLLECTION → KEYS_COLLECTED          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Submitted values are not checked for group membership at this layer.

pub mod collection;
pub mod error;
pub mod gate;
pub mod registry;

pub use collection::{KeyCollection, Phase, Submission, SubmissionSlot, threshold_for};
pub use error::CommitteeError;
pub use gate::AccessGate;
pub use registry::{Committee, CommitteeMember, MemberId};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_shapes() {
        let id = MemberId::derive(b"m");
        let member = CommitteeMember { id, index: 3 };

        let json = serde_json::to_string(&member).unwrap();
        let back: CommitteeMember = serde_json::from_str(&json).unwrap();
        assert_eq!(back, member);

        let phase: Phase = serde_json::from_str(&serde_json::to_string(&Phase::KeysCollected).unwrap()).unwrap();
        assert_eq!(phase, Phase::KeysCollected);
    }
}
