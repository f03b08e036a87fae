use thiserror::Error;

/// Group arithmetic errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupError {
    #[error("invalid arithmetic input: {0}")]
    InvalidArithmeticInput(String),

    #[error("invalid group parameters: {0}")]
    InvalidGroupParams(String),

    #[error("invalid integer literal: {0:?}")]
    InvalidInteger(String),
}
