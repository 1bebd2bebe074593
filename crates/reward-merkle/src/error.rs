use thiserror::Error;

/// Errors that can occur while building, loading, or verifying a tree.
#[derive(Debug, Error, PartialEq)]
pub enum MerkleError {
    #[error("no leaves to build a tree from")]
    Empty,

    #[error("leaf row {index} has {got} values, leaf encoding expects {expected}")]
    RaggedRow { index: usize, expected: usize, got: usize },

    #[error("unknown leaf encoding type tag: {0}")]
    UnknownTypeTag(String),

    #[error(transparent)]
    Abi(#[from] reward_abi::AbiError),

    #[error("malformed value for type {type_tag}: {value}")]
    BadValue { type_tag: String, value: String },

    #[error("leaf index {0} out of range")]
    IndexOutOfRange(usize),

    #[error("tree payload is internally inconsistent: {0}")]
    Corrupt(String),

    #[error("unsupported dump format: {0}")]
    UnsupportedFormat(String),
}
