use thiserror::Error;

use crate::registry::MemberId;

/// Key collection errors
///
/// Every failure leaves committee state exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitteeError {
    #[error("{0} not in committee")]
    NotAMember(MemberId),

    #[error("phase is not KEY_COLLECTION")]
    PhaseClosed,

    #[error("already set public key for member {index}")]
    AlreadySubmitted { index: usize },

    #[error("index {index} out of range for committee of {size}")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("invalid committee: {0}")]
    InvalidCommittee(String),
}
