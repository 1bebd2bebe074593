use thiserror::Error;

/// Errors that can occur while parsing or encoding ABI values.
#[derive(Debug, Error, PartialEq)]
pub enum AbiError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid uint256: {0}")]
    InvalidUint256(String),

    #[error("invalid bytes32: {0}")]
    InvalidBytes32(String),

    #[error("unknown type tag: {0}")]
    UnknownTypeTag(String),

    #[error("ragged leaf rows: expected {expected} values, got {got}")]
    RaggedRow { expected: usize, got: usize },

    #[error("no values to encode")]
    Empty,
}
